//! Per-channel cache of downsampled display windows for large datasets.
//!
//! Each [`ChannelKey`] holds the last successfully fetched buffer, a loading
//! flag and the epoch of the most recently issued request. A completion is
//! only applied when its epoch matches the latest issued one, so the last
//! request issued wins regardless of the order responses arrive in.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::data::series::{ChannelKey, Series};
use crate::error::AlignError;

/// Inputs that determine which window is fetched for a channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowParams {
    /// Active cut range in time units.
    pub cut: Option<(f64, f64)>,
    /// Per-channel visible time window.
    pub window: Option<(f64, f64)>,
}

impl WindowParams {
    /// Time span to request, or `None` for the whole channel.
    ///
    /// When both are set the intersection is requested; disjoint inputs
    /// collapse to an empty span.
    pub fn span(&self) -> Option<(f64, f64)> {
        match (self.cut, self.window) {
            (None, None) => None,
            (Some(span), None) | (None, Some(span)) => Some(non_inverted(span)),
            (Some((c0, c1)), Some((w0, w1))) => Some(non_inverted((c0.max(w0), c1.min(w1)))),
        }
    }
}

/// Inverted spans select nothing.
fn non_inverted((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi < lo {
        (lo, lo)
    } else {
        (lo, hi)
    }
}

/// One issued window fetch. Hand it back to [`WindowCache::complete`].
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRequest {
    pub key: ChannelKey,
    pub epoch: u64,
    /// `Some` selects the by-time endpoint, `None` the whole-channel endpoint.
    pub span: Option<(f64, f64)>,
    pub target_points: usize,
}

/// Result of handing a completion to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOutcome {
    Applied,
    Failed,
    /// A newer request was issued for this key; the response was dropped.
    Stale,
}

#[derive(Debug, Clone)]
struct Entry {
    buffer: Option<Series>,
    loading: bool,
    epoch: u64,
    params: WindowParams,
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WindowCache {
    entries: HashMap<ChannelKey, Entry>,
    target_points: usize,
    // Shared across keys so an evicted and re-created key never reuses an epoch.
    next_epoch: u64,
}

impl WindowCache {
    pub fn new(target_points: usize) -> Self {
        Self {
            entries: HashMap::new(),
            target_points,
            next_epoch: 1,
        }
    }

    pub fn target_points(&self) -> usize {
        self.target_points
    }

    /// Whether `params` would trigger a fetch for `key`.
    pub fn needs_fetch(&self, key: &ChannelKey, params: &WindowParams) -> bool {
        match self.entries.get(key) {
            None => true,
            Some(entry) => entry.params != *params,
        }
    }

    /// Issue a request when `key` has no entry yet or its parameters changed.
    pub fn request(&mut self, key: &ChannelKey, params: WindowParams) -> Option<WindowRequest> {
        if !self.needs_fetch(key, &params) {
            return None;
        }
        Some(self.force_request(key, params))
    }

    /// Issue a request unconditionally, superseding anything in flight for `key`.
    pub fn force_request(&mut self, key: &ChannelKey, params: WindowParams) -> WindowRequest {
        let epoch = self.next_epoch;
        self.next_epoch += 1;
        let entry = self.entries.entry(key.clone()).or_insert_with(|| Entry {
            buffer: None,
            loading: false,
            epoch: 0,
            params,
            error: None,
        });
        entry.epoch = epoch;
        entry.loading = true;
        entry.params = params;
        debug!(channel = %key, epoch = entry.epoch, span = ?params.span(), "window fetch issued");
        WindowRequest {
            key: key.clone(),
            epoch: entry.epoch,
            span: params.span(),
            target_points: self.target_points,
        }
    }

    /// Apply a completed fetch. Only the latest issued epoch for a key is
    /// accepted; a failure empties that key's buffer and nothing else.
    pub fn complete(
        &mut self,
        request: &WindowRequest,
        result: Result<Series, AlignError>,
    ) -> WindowOutcome {
        let Some(entry) = self.entries.get_mut(&request.key) else {
            debug!(channel = %request.key, "window completion for evicted key dropped");
            return WindowOutcome::Stale;
        };
        if entry.epoch != request.epoch {
            debug!(
                channel = %request.key,
                epoch = request.epoch,
                latest = entry.epoch,
                "stale window completion dropped"
            );
            return WindowOutcome::Stale;
        }
        entry.loading = false;
        match result {
            Ok(series) => {
                entry.buffer = Some(series.thinned(self.target_points));
                entry.error = None;
                WindowOutcome::Applied
            }
            Err(e) => {
                warn!(channel = %request.key, error = %e, "window fetch failed");
                entry.buffer = Some(Series::empty(request.key.channel.clone()));
                entry.error = Some(e.to_string());
                WindowOutcome::Failed
            }
        }
    }

    /// The cached display buffer, if a fetch has completed for `key`.
    pub fn display(&self, key: &ChannelKey) -> Option<&Series> {
        self.entries.get(key).and_then(|e| e.buffer.as_ref())
    }

    pub fn is_loading(&self, key: &ChannelKey) -> bool {
        self.entries.get(key).is_some_and(|e| e.loading)
    }

    pub fn error(&self, key: &ChannelKey) -> Option<&str> {
        self.entries.get(key).and_then(|e| e.error.as_deref())
    }

    pub fn latest_epoch(&self, key: &ChannelKey) -> Option<u64> {
        self.entries.get(key).map(|e| e.epoch)
    }

    pub fn evict_dataset(&mut self, dataset: &str) {
        self.entries.retain(|k, _| k.dataset != dataset);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
