//! The session-wide application state.
//!
//! [`AlignState`] owns every piece of mutable session state (raw buffers,
//! datasets, groups, offsets, viewport, window cache) and exposes one named
//! entry point per user action or backend completion. It is single-writer:
//! the UI thread is the only caller, network results are handed in as plain
//! values.
//!
//! Entry points that apply backend completions record failures in the
//! [`Notifications`] log themselves. Synchronous user actions return their
//! `Result` and the caller routes errors through [`AlignState::report`].

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::{DateTime, Local};
use egui::Color32;
use serde_json::Value;
use tracing::{info, warn};

use crate::backend::api::{
    AlignResponse, DatasetAlignRequest, GroupAlignRequest, RawSeries, SeriesMap, UploadResponse,
};
use crate::config::AlignerConfig;
use crate::data::alignment::AlignmentCoordinator;
use crate::data::datasets::{Dataset, DatasetRegistry};
use crate::data::grouping::{palette_color, GroupingModel};
use crate::data::offsets::{resolve, AutoOffsets, ManualOffsets, OffsetResolver, ShiftMode, ShiftTarget};
use crate::data::series::{ChannelKey, DatasetId, Domain, Series, SeriesId, SeriesStore};
use crate::data::slicer::{CutMode, CutRange};
use crate::data::viewport::{RelayoutEvent, ShiftBounds, ViewportController};
use crate::data::window_cache::{WindowCache, WindowOutcome, WindowParams, WindowRequest};
use crate::error::{AlignError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Notifications
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Local>,
}

/// Bounded log of user-visible messages, newest last.
#[derive(Debug, Clone)]
pub struct Notifications {
    notices: VecDeque<Notice>,
    capacity: usize,
}

impl Notifications {
    pub fn new(capacity: usize) -> Self {
        Self {
            notices: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn push(&mut self, level: NoticeLevel, message: String) {
        if self.notices.len() == self.capacity {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice {
            level,
            message,
            at: Local::now(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.push(NoticeLevel::Info, message);
    }

    pub fn error(&mut self, error: &AlignError) {
        warn!(kind = error.kind(), "{error}");
        self.push(NoticeLevel::Error, error.to_string());
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.notices.back()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// View types
// ─────────────────────────────────────────────────────────────────────────────

/// Single-channel series, or one channel across multi-channel datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Series,
    Datasets,
}

/// The trace whose extent drives autorange and shift bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Series(SeriesId),
    Channel(ChannelKey),
}

/// Coordinates ready to hand to the plot.
#[derive(Debug, Clone)]
pub struct RenderedTrace<'a> {
    pub label: String,
    pub color: Color32,
    /// Cut and shifted x; borrowed from the store when the shift is 0.
    pub x: Cow<'a, [f64]>,
    pub y: &'a [f64],
    pub shift: f64,
    pub loading: bool,
    pub error: Option<&'a str>,
}

impl RenderedTrace<'_> {
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.x.iter().zip(self.y).map(|(&x, &y)| [x, y]).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AlignState
// ─────────────────────────────────────────────────────────────────────────────

pub struct AlignState {
    store: SeriesStore,
    datasets: DatasetRegistry,
    grouping: GroupingModel,
    auto: AutoOffsets,
    manual: ManualOffsets,
    viewport: ViewportController,
    windows: WindowCache,
    alignment: AlignmentCoordinator,
    cut: CutRange,
    cut_mode: CutMode,
    channel_cut: CutRange,
    channel_windows: HashMap<ChannelKey, (f64, f64)>,
    view: ViewMode,
    active_channel: Option<String>,
    reference_dataset: Option<DatasetId>,
    selection: Option<Selection>,
    target_points: usize,
    notifications: Notifications,
}

impl AlignState {
    pub fn new(config: &AlignerConfig) -> Self {
        let groups: Vec<&str> = config.initial_groups.iter().map(String::as_str).collect();
        Self {
            store: SeriesStore::new(),
            datasets: DatasetRegistry::default(),
            grouping: GroupingModel::new(&groups),
            auto: AutoOffsets::default(),
            manual: ManualOffsets::new(config.shift_mode_policy),
            viewport: ViewportController::new(config.shift_bounds.clone()),
            windows: WindowCache::new(config.target_points),
            alignment: AlignmentCoordinator::default(),
            cut: CutRange::default(),
            cut_mode: CutMode::Index,
            channel_cut: CutRange::default(),
            channel_windows: HashMap::new(),
            view: ViewMode::Series,
            active_channel: None,
            reference_dataset: None,
            selection: None,
            target_points: config.target_points,
            notifications: Notifications::new(config.notification_capacity),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    pub fn datasets(&self) -> &DatasetRegistry {
        &self.datasets
    }

    pub fn grouping(&self) -> &GroupingModel {
        &self.grouping
    }

    pub fn auto_offsets(&self) -> &AutoOffsets {
        &self.auto
    }

    pub fn manual_offsets(&self) -> &ManualOffsets {
        &self.manual
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn windows(&self) -> &WindowCache {
        &self.windows
    }

    pub fn alignment(&self) -> &AlignmentCoordinator {
        &self.alignment
    }

    pub fn cut(&self) -> CutRange {
        self.cut
    }

    pub fn cut_mode(&self) -> CutMode {
        self.cut_mode
    }

    pub fn channel_cut(&self) -> CutRange {
        self.channel_cut
    }

    pub fn channel_window(&self, key: &ChannelKey) -> Option<(f64, f64)> {
        self.channel_windows.get(key).copied()
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn active_channel(&self) -> Option<&str> {
        self.active_channel.as_deref()
    }

    pub fn reference_dataset(&self) -> Option<&str> {
        self.reference_dataset.as_deref()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn target_points(&self) -> usize {
        self.target_points
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn resolver(&self) -> OffsetResolver<'_> {
        OffsetResolver::new(&self.auto, &self.manual)
    }

    pub fn shift_bounds(&self) -> ShiftBounds {
        self.viewport.shift_bounds()
    }

    /// Record `result`'s error (if any) as a notice and pass the value on.
    pub fn report<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.notifications.error(&e);
                None
            }
        }
    }

    // ── Series ───────────────────────────────────────────────────────────

    /// Replace the single-channel series with a fresh fetch.
    ///
    /// Post: every valid series is stored and assigned to a group (new ids
    /// get the upload group); invalid series are skipped and reported. Ids
    /// missing from the fetch lose their assignment and manual shift. The
    /// first series is selected when nothing is. While no cut is active the
    /// cut mode follows the selected series' domain.
    pub fn load_series(&mut self, incoming: SeriesMap) -> usize {
        let mut valid = Vec::with_capacity(incoming.len());
        for (id, raw) in incoming {
            match raw.into_series(id) {
                Ok(series) => valid.push(series),
                Err(e) => self.notifications.error(&e),
            }
        }
        let changes = self.store.replace_series(valid);
        for id in &changes.added {
            self.grouping.assign_default(id);
        }
        for id in &changes.removed {
            self.grouping.unassign(id);
            self.manual.forget_series(id);
        }
        let selection_gone = matches!(
            &self.selection,
            Some(Selection::Series(id)) if self.store.get(id).is_none()
        );
        if self.selection.is_none() || selection_gone {
            self.selection = self.store.ids().first().cloned().map(Selection::Series);
        }
        self.refresh_viewport();
        if !self.cut.enabled {
            self.cut_mode = match self.viewport.domain() {
                Domain::Index => CutMode::Index,
                Domain::Time => CutMode::Time,
            };
        }
        info!(
            total = self.store.len(),
            new = changes.added.len(),
            removed = changes.removed.len(),
            "series loaded"
        );
        self.store.len()
    }

    /// Select the trace driving autorange and shift bounds. Rescans its extent.
    pub fn select(&mut self, selection: Option<Selection>) {
        if self.selection != selection {
            self.selection = selection;
            self.refresh_viewport();
        }
    }

    fn refresh_viewport(&mut self) {
        // a large channel's buffer is whatever window was fetched last
        if let Some(Selection::Channel(key)) = &self.selection {
            if let Some(dataset) = self.datasets.get(&key.dataset).filter(|d| d.is_large_file) {
                let [lo, hi] = dataset.time_range;
                self.viewport.select_extent(Some((lo, hi)), Domain::Time);
                return;
            }
        }
        let series = match &self.selection {
            Some(Selection::Series(id)) => self.store.get(id),
            Some(Selection::Channel(key)) => {
                channel_source(&self.store, &self.datasets, &self.windows, key)
            }
            None => None,
        };
        self.viewport.select(series.map(Series::x));
    }

    // ── Cuts ─────────────────────────────────────────────────────────────

    pub fn set_cut(&mut self, cut: CutRange) {
        self.cut = cut;
    }

    pub fn set_cut_mode(&mut self, mode: CutMode) {
        self.cut_mode = mode;
    }

    /// Time-domain cut shared by all dataset channels. Large channels are
    /// refetched on the next [`pending_window_requests`](Self::pending_window_requests).
    pub fn set_channel_cut(&mut self, cut: CutRange) {
        self.channel_cut = cut;
    }

    pub fn set_channel_window(&mut self, key: ChannelKey, window: Option<(f64, f64)>) {
        match window {
            Some(w) => self.channel_windows.insert(key, w),
            None => self.channel_windows.remove(&key),
        };
    }

    // ── Offsets ──────────────────────────────────────────────────────────

    /// Set a manual shift in the active scope table.
    ///
    /// `key` is a series id (or `dataset/channel`), a group name or a dataset
    /// id depending on the active [`ShiftMode`].
    pub fn set_manual_offset(&mut self, key: &str, value: f64) {
        self.manual.set(key, value);
    }

    /// Switch the manual-shift scope. See [`ManualOffsets::set_mode`].
    pub fn set_shift_mode(&mut self, mode: ShiftMode) -> bool {
        let changed = self.manual.set_mode(mode);
        if changed {
            info!(mode = mode.label(), policy = ?self.manual.policy(), "shift mode changed");
        }
        changed
    }

    /// Drop all manual shifts and return to autorange.
    pub fn reset_view(&mut self) {
        self.manual.clear();
        self.viewport.set_visible_range(None);
        self.channel_windows.clear();
    }

    /// Drop all auto offsets.
    pub fn clear_alignment(&mut self) {
        self.auto.clear();
        self.notifications.info("alignment cleared");
    }

    // ── Viewport ─────────────────────────────────────────────────────────

    /// Apply a relayout event. In the dataset view a range change also sets
    /// the visible window (in raw, unshifted time) of every large channel.
    pub fn apply_relayout(&mut self, event: RelayoutEvent) -> bool {
        let changed = self.viewport.apply(event);
        if self.view == ViewMode::Datasets {
            for key in self.large_channel_keys() {
                match event {
                    RelayoutEvent::RangeChanged { lo, hi } => {
                        let shift = self.resolver().total_shift(ShiftTarget::Channel(&key));
                        self.channel_windows.insert(key, (lo - shift, hi - shift));
                    }
                    RelayoutEvent::AutoRangeReset => {
                        self.channel_windows.remove(&key);
                    }
                    RelayoutEvent::ShapeMoved { .. } => {}
                }
            }
        }
        changed
    }

    /// Parse and apply a raw relayout payload; unknown shapes are ignored.
    pub fn handle_relayout_payload(&mut self, payload: &Value) -> bool {
        match RelayoutEvent::parse(payload) {
            Some(event) => self.apply_relayout(event),
            None => false,
        }
    }

    /// Add a reference line, by default in the middle of the visible range.
    pub fn add_reference_line(&mut self, x: Option<f64>) -> u32 {
        let x = x
            .or_else(|| self.viewport.effective_range().map(|(lo, hi)| (lo + hi) / 2.0))
            .unwrap_or(0.0);
        self.viewport.reference_lines_mut().add(x)
    }

    pub fn remove_reference_line(&mut self, id: u32) -> bool {
        self.viewport.reference_lines_mut().remove(id)
    }

    // ── Groups ───────────────────────────────────────────────────────────

    pub fn add_group(&mut self, name: &str) -> Result<()> {
        self.grouping.add_group(name).map(|_| ())
    }

    /// Delete a group; members and references move to the fallback group and
    /// the group's manual shift is dropped.
    pub fn delete_group(&mut self, name: &str) -> Result<String> {
        let fallback = self.grouping.delete_group(name)?;
        self.manual.forget_group(name);
        info!(group = name, fallback = %fallback, "group deleted");
        Ok(fallback)
    }

    pub fn move_series(&mut self, id: &str, group: &str) -> Result<()> {
        self.grouping.move_series(id, group)
    }

    pub fn set_upload_group(&mut self, name: &str) -> Result<()> {
        self.grouping.set_upload_group(name)
    }

    pub fn set_reference_group(&mut self, name: &str) -> Result<()> {
        self.grouping.set_reference_group(name)
    }

    // ── Alignment ────────────────────────────────────────────────────────

    /// Build the single-channel alignment request and mark a run in progress.
    pub fn begin_group_alignment(&mut self) -> Result<GroupAlignRequest> {
        self.alignment
            .begin_groups(&self.grouping, &self.store, Some((self.cut, self.cut_mode)))
    }

    /// Build the multi-channel request for the active channel over every
    /// dataset that has it.
    pub fn begin_dataset_alignment(&mut self) -> Result<DatasetAlignRequest> {
        let channel = self
            .active_channel
            .clone()
            .ok_or(AlignError::NotEnoughScopes {
                scope: "datasets",
                found: 0,
            })?;
        let datasets: Vec<DatasetId> = self
            .datasets
            .iter()
            .filter(|d| d.has_channel(&channel))
            .map(|d| d.id.clone())
            .collect();
        let reference = self
            .reference_dataset
            .clone()
            .filter(|r| datasets.contains(r))
            .or_else(|| datasets.first().cloned())
            .unwrap_or_default();
        self.alignment.begin_datasets(
            datasets,
            &channel,
            &reference,
            Some(self.channel_cut),
            self.target_points,
        )
    }

    /// Apply an alignment response. Errors keep the previous offsets.
    pub fn finish_alignment(&mut self, outcome: Result<AlignResponse>) -> Result<usize> {
        let result = self.alignment.finish(&mut self.auto, outcome);
        match &result {
            Ok(count) => self
                .notifications
                .info(format!("alignment applied ({count} offsets)")),
            Err(e) => self.notifications.error(e),
        }
        result
    }

    // ── Datasets ─────────────────────────────────────────────────────────

    pub fn set_view(&mut self, view: ViewMode) {
        if self.view == view {
            return;
        }
        self.view = view;
        // keep the shift mode meaningful for the view
        match (view, self.manual.mode()) {
            (ViewMode::Series, ShiftMode::Dataset) | (ViewMode::Datasets, ShiftMode::Group) => {
                self.set_shift_mode(ShiftMode::SingleSeries);
            }
            _ => {}
        }
        self.viewport.set_visible_range(None);
        let selection = match view {
            ViewMode::Series => self.store.ids().first().cloned().map(Selection::Series),
            ViewMode::Datasets => self.first_channel_selection(),
        };
        self.selection = selection;
        self.refresh_viewport();
    }

    fn first_channel_selection(&self) -> Option<Selection> {
        let channel = self.active_channel.as_deref()?;
        self.datasets
            .iter()
            .find(|d| d.has_channel(channel))
            .map(|d| Selection::Channel(d.channel_key(channel)))
    }

    pub fn set_active_channel(&mut self, channel: &str) {
        if self.active_channel.as_deref() == Some(channel) {
            return;
        }
        self.active_channel = Some(channel.to_string());
        self.channel_windows.clear();
        if self.view == ViewMode::Datasets {
            self.selection = self.first_channel_selection();
            self.refresh_viewport();
        }
    }

    pub fn set_reference_dataset(&mut self, id: &str) -> Result<()> {
        if self.datasets.get(id).is_none() {
            return Err(AlignError::UnknownDataset(id.to_string()));
        }
        self.reference_dataset = Some(id.to_string());
        Ok(())
    }

    /// Apply an upload response.
    ///
    /// A rejected upload (including a schema mismatch) registers nothing and
    /// returns the error. A multi-channel upload registers its dataset; a
    /// single-channel upload returns `Ok(None)` and the caller refetches series.
    pub fn register_upload(&mut self, response: UploadResponse) -> Result<Option<Dataset>> {
        match response {
            UploadResponse::Failed(failure) => {
                let error = failure.into_error();
                self.notifications.error(&error);
                Err(error)
            }
            UploadResponse::Dataset(dataset) => {
                self.notifications.info(format!(
                    "dataset '{}' registered ({} channels, {} rows{})",
                    dataset.name,
                    dataset.channels.len(),
                    dataset.total_rows,
                    if dataset.is_large_file { ", large" } else { "" }
                ));
                self.register_dataset(dataset.clone());
                Ok(Some(dataset))
            }
            UploadResponse::Loaded { message } => {
                self.notifications.info(message);
                Ok(None)
            }
        }
    }

    fn register_dataset(&mut self, dataset: Dataset) {
        let id = dataset.id.clone();
        if self.active_channel.is_none() {
            self.active_channel = dataset.channels.first().cloned();
        }
        if self.reference_dataset.is_none() {
            self.reference_dataset = Some(id.clone());
        }
        if !self.datasets.register(dataset) {
            // same id re-uploaded: its buffers are outdated
            self.store.remove_dataset(&id);
            self.windows.evict_dataset(&id);
        }
        if self.view == ViewMode::Datasets && self.selection.is_none() {
            self.selection = self.first_channel_selection();
            self.refresh_viewport();
        }
    }

    /// Replace the dataset list; data of vanished datasets is dropped.
    pub fn replace_datasets(&mut self, datasets: Vec<Dataset>) {
        let vanished: Vec<DatasetId> = self
            .datasets
            .ids()
            .into_iter()
            .filter(|id| !datasets.iter().any(|d| &d.id == id))
            .collect();
        for id in &vanished {
            self.store.remove_dataset(id);
            self.windows.evict_dataset(id);
            self.manual.forget_dataset(id);
            self.channel_windows.retain(|k, _| &k.dataset != id);
        }
        self.datasets.replace_all(datasets);
        if self
            .reference_dataset
            .as_deref()
            .is_some_and(|r| self.datasets.get(r).is_none())
        {
            self.reference_dataset = self.datasets.ids().into_iter().next();
        }
        let channels = self.datasets.channel_names();
        if self
            .active_channel
            .as_ref()
            .is_none_or(|c| !channels.contains(c))
        {
            self.active_channel = channels.into_iter().next();
        }
        if let Some(Selection::Channel(key)) = &self.selection {
            if self.datasets.get(&key.dataset).is_none() {
                self.selection = self.first_channel_selection();
            }
        }
        self.refresh_viewport();
    }

    /// Small datasets whose channels have not been fetched yet.
    pub fn datasets_needing_data(&self) -> Vec<DatasetId> {
        self.datasets
            .iter()
            .filter(|d| !d.is_large_file && !self.store.has_dataset(&d.id))
            .map(|d| d.id.clone())
            .collect()
    }

    /// Store the full-resolution channels of a small dataset.
    pub fn load_dataset_data(
        &mut self,
        id: &str,
        data: BTreeMap<String, RawSeries>,
    ) -> Result<usize> {
        if self.datasets.get(id).is_none() {
            return Err(AlignError::UnknownDataset(id.to_string()));
        }
        let mut loaded = 0;
        for (channel, raw) in data {
            let key = ChannelKey::new(id, channel);
            match raw.into_series(key.to_string()) {
                Ok(series) => {
                    self.store.insert_channel(key, series);
                    loaded += 1;
                }
                Err(e) => self.notifications.error(&e),
            }
        }
        if matches!(&self.selection, Some(Selection::Channel(k)) if k.dataset == id) {
            self.refresh_viewport();
        }
        Ok(loaded)
    }

    fn large_channel_keys(&self) -> Vec<ChannelKey> {
        let Some(channel) = self.active_channel.as_deref() else {
            return Vec::new();
        };
        self.datasets
            .iter()
            .filter(|d| d.is_large_file && d.has_channel(channel))
            .map(|d| d.channel_key(channel))
            .collect()
    }

    /// Window fetches to issue now for the active channel of large datasets.
    ///
    /// A request is issued for a key without a cached entry, or whose cut
    /// range or visible window changed since its last request.
    pub fn pending_window_requests(&mut self) -> Vec<WindowRequest> {
        if self.view != ViewMode::Datasets {
            return Vec::new();
        }
        let cut = self.channel_cut.span();
        let mut requests = Vec::new();
        for key in self.large_channel_keys() {
            let params = WindowParams {
                cut,
                window: self.channel_windows.get(&key).copied(),
            };
            if let Some(request) = self.windows.request(&key, params) {
                requests.push(request);
            }
        }
        requests
    }

    /// Hand a window completion to the cache. Stale completions are dropped;
    /// a failure affects only its own channel.
    pub fn complete_window(
        &mut self,
        request: &WindowRequest,
        result: Result<RawSeries>,
    ) -> WindowOutcome {
        let series = result.and_then(|raw| raw.into_series(request.key.to_string()));
        let error = series.as_ref().err().cloned();
        let outcome = self.windows.complete(request, series);
        match outcome {
            WindowOutcome::Failed => {
                let reason = error.map(|e| e.to_string()).unwrap_or_default();
                self.notifications.error(&AlignError::PartialChannelLoad {
                    key: request.key.clone(),
                    reason,
                });
            }
            WindowOutcome::Applied | WindowOutcome::Stale => {}
        }
        outcome
    }

    /// Rename optimistically; returns the previous name for [`finish_rename`](Self::finish_rename).
    pub fn rename_dataset(&mut self, id: &str, name: &str) -> Result<String> {
        self.datasets.rename(id, name)
    }

    /// Revert an optimistic rename if the backend rejected it.
    pub fn finish_rename(&mut self, id: &str, previous: &str, result: Result<()>) {
        if let Err(e) = result {
            self.notifications.error(&e);
            if let Err(revert) = self.datasets.rename(id, previous) {
                warn!(dataset = id, error = %revert, "could not revert rename");
            }
        }
    }

    /// Forget all loaded data. Groups survive; assignments, offsets, caches
    /// and the viewport are reset.
    pub fn clear_all(&mut self, files_deleted: usize) {
        self.store.clear();
        self.datasets.clear();
        self.windows.clear();
        self.grouping.clear_assignments();
        self.auto.clear();
        self.manual.clear();
        self.viewport.reset();
        self.channel_windows.clear();
        self.active_channel = None;
        self.reference_dataset = None;
        self.selection = None;
        self.notifications
            .info(format!("all data cleared ({files_deleted} files deleted)"));
    }

    // ── Rendering ────────────────────────────────────────────────────────

    /// Traces of the current view, in display order.
    pub fn rendered_traces(&self) -> Vec<RenderedTrace<'_>> {
        match self.view {
            ViewMode::Series => self
                .store
                .ids()
                .iter()
                .filter_map(|id| self.render_series(id))
                .collect(),
            ViewMode::Datasets => {
                let Some(channel) = self.active_channel.as_deref() else {
                    return Vec::new();
                };
                self.datasets
                    .iter()
                    .filter(|d| d.has_channel(channel))
                    .filter_map(|d| self.render_channel(&d.channel_key(channel)))
                    .collect()
            }
        }
    }

    /// Cut, then shift one single-channel series.
    pub fn render_series(&self, id: &str) -> Option<RenderedTrace<'_>> {
        let series = self.store.get(id)?;
        let group = self
            .grouping
            .group_of(id)
            .unwrap_or(self.grouping.upload_group());
        let range = self.cut.resolve(series.x(), self.cut_mode);
        let shift = self
            .resolver()
            .total_shift(ShiftTarget::Series { id, group });
        Some(RenderedTrace {
            label: id.to_string(),
            color: self.grouping.color_of(group),
            x: resolve(&series.x()[range.clone()], shift),
            y: &series.y()[range],
            shift,
            loading: false,
            error: None,
        })
    }

    /// Cut, then shift one dataset channel. Large datasets read the window
    /// cache; a channel still loading or failed renders empty.
    pub fn render_channel(&self, key: &ChannelKey) -> Option<RenderedTrace<'_>> {
        let index = self.datasets.iter().position(|d| d.id == key.dataset)?;
        let dataset = self.datasets.get(&key.dataset)?;
        let (loading, error) = if dataset.is_large_file {
            (self.windows.is_loading(key), self.windows.error(key))
        } else {
            (false, None)
        };
        let shift = self.resolver().total_shift(ShiftTarget::Channel(key));
        let (x, y): (&[f64], &[f64]) =
            match channel_source(&self.store, &self.datasets, &self.windows, key) {
                Some(series) => {
                    let range = self.channel_cut.resolve(series.x(), CutMode::Time);
                    (&series.x()[range.clone()], &series.y()[range])
                }
                None => (&[] as &[f64], &[] as &[f64]),
            };
        Some(RenderedTrace {
            label: format!("{} · {}", dataset.name, key.channel),
            color: palette_color(index),
            x: resolve(x, shift),
            y,
            shift,
            loading,
            error,
        })
    }
}

/// The buffer a channel is displayed from: the window cache for large
/// datasets, the store otherwise.
fn channel_source<'a>(
    store: &'a SeriesStore,
    datasets: &DatasetRegistry,
    windows: &'a WindowCache,
    key: &ChannelKey,
) -> Option<&'a Series> {
    let dataset = datasets.get(&key.dataset)?;
    if dataset.is_large_file {
        windows.display(key)
    } else {
        store.channel(key)
    }
}
