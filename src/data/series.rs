//! Raw sample buffers and the store that owns them.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AlignError, Result};

/// Identifier of a single-channel series, e.g. `"run_01:pressure"`.
pub type SeriesId = String;
/// Identifier of an uploaded multi-channel dataset.
pub type DatasetId = String;

/// Address of one channel inside a multi-channel dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelKey {
    pub dataset: DatasetId,
    pub channel: String,
}

impl ChannelKey {
    pub fn new(dataset: impl Into<DatasetId>, channel: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            channel: channel.into(),
        }
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.dataset, self.channel)
    }
}

/// Whether x values are sample positions or real time stamps.
///
/// Files without a time column get `x = 0, 1, .., n-1` from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Domain {
    #[default]
    Index,
    Time,
}

impl Domain {
    pub fn detect(x: &[f64]) -> Domain {
        let is_index = x.iter().enumerate().all(|(i, &v)| v == i as f64);
        if is_index {
            Domain::Index
        } else {
            Domain::Time
        }
    }
}

/// One immutable (x, y) sample sequence stored as two flat columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    id: String,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Series {
    /// Validate and wrap the columns. `x` must be non-decreasing and as long as `y`.
    pub fn new(id: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        let id = id.into();
        if x.len() != y.len() {
            return Err(AlignError::InvalidSeries {
                reason: format!("x has {} samples but y has {}", x.len(), y.len()),
                id,
            });
        }
        if let Some(i) = x.windows(2).position(|w| !(w[0] <= w[1])) {
            return Err(AlignError::InvalidSeries {
                reason: format!("x is not sorted at sample {}", i + 1),
                id,
            });
        }
        Ok(Self { id, x, y })
    }

    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x: Vec::new(),
            y: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Min and max of x by full scan.
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        x_extent(&self.x)
    }

    pub fn domain(&self) -> Domain {
        Domain::detect(&self.x)
    }

    /// Keep every n-th sample so that at most `budget` samples remain.
    pub fn thinned(self, budget: usize) -> Series {
        if self.len() <= budget {
            return self;
        }
        if budget == 0 {
            return Series::empty(self.id);
        }
        let stride = self.len().div_ceil(budget);
        let x = self.x.iter().step_by(stride).copied().collect();
        let y = self.y.iter().step_by(stride).copied().collect();
        Series { id: self.id, x, y }
    }
}

/// Min and max of an unsorted buffer, ignoring NaN.
pub fn x_extent(x: &[f64]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in x {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    (min <= max).then_some((min, max))
}

/// Ids that appeared or vanished in [`SeriesStore::replace_series`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesChanges {
    pub added: Vec<SeriesId>,
    pub removed: Vec<SeriesId>,
}

/// Owner of every raw buffer loaded in the session.
///
/// Single-channel series are keyed by id and keep their first-seen order;
/// multi-channel data is keyed by [`ChannelKey`]. Buffers are only ever
/// replaced as a whole.
#[derive(Debug, Default)]
pub struct SeriesStore {
    series: HashMap<SeriesId, Series>,
    order: Vec<SeriesId>,
    channels: HashMap<ChannelKey, Series>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a series. Returns `true` when the id was not known yet.
    pub fn insert(&mut self, series: Series) -> bool {
        let id = series.id().to_string();
        let is_new = self.series.insert(id.clone(), series).is_none();
        if is_new {
            self.order.push(id);
        }
        is_new
    }

    /// Replace the whole single-channel set.
    ///
    /// Ids seen before keep their position; new ids are appended in sorted
    /// order; ids missing from `incoming` are dropped.
    pub fn replace_series(&mut self, incoming: Vec<Series>) -> SeriesChanges {
        let next: HashMap<SeriesId, Series> = incoming
            .into_iter()
            .map(|s| (s.id().to_string(), s))
            .collect();
        let (kept, removed): (Vec<SeriesId>, Vec<SeriesId>) = std::mem::take(&mut self.order)
            .into_iter()
            .partition(|id| next.contains_key(id));
        let known: HashSet<&SeriesId> = kept.iter().collect();
        let mut added: Vec<SeriesId> = next
            .keys()
            .filter(|id| !known.contains(id))
            .cloned()
            .collect();
        added.sort();
        self.order = kept;
        self.order.extend(added.iter().cloned());
        self.series = next;
        SeriesChanges { added, removed }
    }

    pub fn get(&self, id: &str) -> Option<&Series> {
        self.series.get(id)
    }

    /// Series ids in first-seen order.
    pub fn ids(&self) -> &[SeriesId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty() && self.channels.is_empty()
    }

    pub fn insert_channel(&mut self, key: ChannelKey, series: Series) {
        self.channels.insert(key, series);
    }

    pub fn channel(&self, key: &ChannelKey) -> Option<&Series> {
        self.channels.get(key)
    }

    pub fn has_dataset(&self, dataset: &str) -> bool {
        self.channels.keys().any(|k| k.dataset == dataset)
    }

    pub fn remove_dataset(&mut self, dataset: &str) {
        self.channels.retain(|k, _| k.dataset != dataset);
    }

    pub fn clear(&mut self) {
        self.series.clear();
        self.order.clear();
        self.channels.clear();
    }
}
