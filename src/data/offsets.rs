//! Auto and manual time offsets, and their composition into one shift.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::series::{ChannelKey, DatasetId, SeriesId};

/// Add `shift` to every sample of `x`.
///
/// A zero shift hands back the input slice; a new buffer is only allocated
/// when there is something to add.
pub fn resolve(x: &[f64], shift: f64) -> Cow<'_, [f64]> {
    if shift == 0.0 {
        Cow::Borrowed(x)
    } else {
        Cow::Owned(x.iter().map(|v| v + shift).collect())
    }
}

/// Offsets computed by the correlation service.
///
/// Each alignment run replaces its whole table; tables are never merged.
#[derive(Debug, Clone, Default)]
pub struct AutoOffsets {
    series: HashMap<SeriesId, f64>,
    datasets: HashMap<DatasetId, f64>,
}

impl AutoOffsets {
    pub fn replace_series(&mut self, offsets: HashMap<SeriesId, f64>) {
        self.series = offsets;
    }

    pub fn replace_datasets(&mut self, offsets: HashMap<DatasetId, f64>) {
        self.datasets = offsets;
    }

    pub fn series(&self, id: &str) -> f64 {
        self.series.get(id).copied().unwrap_or(0.0)
    }

    pub fn dataset(&self, id: &str) -> f64 {
        self.datasets.get(id).copied().unwrap_or(0.0)
    }

    pub fn series_table(&self) -> &HashMap<SeriesId, f64> {
        &self.series
    }

    pub fn dataset_table(&self) -> &HashMap<DatasetId, f64> {
        &self.datasets
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty() && self.datasets.is_empty()
    }

    pub fn clear(&mut self) {
        self.series.clear();
        self.datasets.clear();
    }
}

/// Which manual-offset table is currently read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShiftMode {
    #[default]
    SingleSeries,
    Group,
    Dataset,
}

impl ShiftMode {
    pub fn label(&self) -> &'static str {
        match self {
            ShiftMode::SingleSeries => "Per series",
            ShiftMode::Group => "Per group",
            ShiftMode::Dataset => "Per dataset",
        }
    }
}

/// What happens to the table of the mode being left on a mode switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShiftModePolicy {
    /// Clear the table of the mode being deactivated.
    #[default]
    ClearOnSwitch,
    /// Keep every table; only the active one is read.
    KeepTables,
}

/// User-set shifts, one table per scope, exactly one table active.
#[derive(Debug, Clone, Default)]
pub struct ManualOffsets {
    mode: ShiftMode,
    policy: ShiftModePolicy,
    series: HashMap<String, f64>,
    groups: HashMap<String, f64>,
    datasets: HashMap<DatasetId, f64>,
}

impl ManualOffsets {
    pub fn new(policy: ShiftModePolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> ShiftMode {
        self.mode
    }

    pub fn policy(&self) -> ShiftModePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ShiftModePolicy) {
        self.policy = policy;
    }

    /// Switch the active scope.
    ///
    /// Under [`ShiftModePolicy::ClearOnSwitch`] the table of the mode being
    /// left is emptied; the newly active table is never touched. Returns
    /// `false` when `mode` is already active.
    pub fn set_mode(&mut self, mode: ShiftMode) -> bool {
        if mode == self.mode {
            return false;
        }
        if self.policy == ShiftModePolicy::ClearOnSwitch {
            self.table_mut(self.mode).clear();
        }
        self.mode = mode;
        true
    }

    /// Set the shift of `key` in the active table.
    pub fn set(&mut self, key: &str, value: f64) {
        let mode = self.mode;
        self.table_mut(mode).insert(key.to_string(), value);
    }

    /// Shift of `key` in the active table (0 when absent).
    pub fn get(&self, key: &str) -> f64 {
        self.table(self.mode).get(key).copied().unwrap_or(0.0)
    }

    pub fn table(&self, mode: ShiftMode) -> &HashMap<String, f64> {
        match mode {
            ShiftMode::SingleSeries => &self.series,
            ShiftMode::Group => &self.groups,
            ShiftMode::Dataset => &self.datasets,
        }
    }

    fn table_mut(&mut self, mode: ShiftMode) -> &mut HashMap<String, f64> {
        match mode {
            ShiftMode::SingleSeries => &mut self.series,
            ShiftMode::Group => &mut self.groups,
            ShiftMode::Dataset => &mut self.datasets,
        }
    }

    pub fn forget_group(&mut self, name: &str) {
        self.groups.remove(name);
    }

    /// Drop the single-series shift of `id`.
    pub fn forget_series(&mut self, id: &str) {
        self.series.remove(id);
    }

    pub fn forget_dataset(&mut self, id: &str) {
        self.datasets.remove(id);
        let prefix = format!("{id}/");
        self.series.retain(|k, _| !k.starts_with(&prefix));
    }

    /// Empty every table; the mode is kept.
    pub fn clear(&mut self) {
        self.series.clear();
        self.groups.clear();
        self.datasets.clear();
    }
}

/// The identity an offset is looked up for.
#[derive(Debug, Clone, Copy)]
pub enum ShiftTarget<'a> {
    /// Single-channel series and the group it belongs to.
    Series { id: &'a str, group: &'a str },
    /// One channel of a multi-channel dataset.
    Channel(&'a ChannelKey),
}

/// Read-only view composing both offset sources.
#[derive(Debug, Clone, Copy)]
pub struct OffsetResolver<'a> {
    pub auto: &'a AutoOffsets,
    pub manual: &'a ManualOffsets,
}

impl<'a> OffsetResolver<'a> {
    pub fn new(auto: &'a AutoOffsets, manual: &'a ManualOffsets) -> Self {
        Self { auto, manual }
    }

    pub fn auto_shift(&self, target: ShiftTarget<'_>) -> f64 {
        match target {
            ShiftTarget::Series { id, .. } => self.auto.series(id),
            ShiftTarget::Channel(key) => self.auto.dataset(&key.dataset),
        }
    }

    /// Shift from the active manual scope. Scopes that do not apply to the
    /// target (e.g. group mode for a dataset channel) contribute 0.
    pub fn manual_shift(&self, target: ShiftTarget<'_>) -> f64 {
        let table = self.manual.table(self.manual.mode());
        let key = match (self.manual.mode(), target) {
            (ShiftMode::SingleSeries, ShiftTarget::Series { id, .. }) => id.to_string(),
            (ShiftMode::SingleSeries, ShiftTarget::Channel(key)) => key.to_string(),
            (ShiftMode::Group, ShiftTarget::Series { group, .. }) => group.to_string(),
            (ShiftMode::Dataset, ShiftTarget::Channel(key)) => key.dataset.clone(),
            _ => return 0.0,
        };
        table.get(&key).copied().unwrap_or(0.0)
    }

    pub fn total_shift(&self, target: ShiftTarget<'_>) -> f64 {
        self.auto_shift(target) + self.manual_shift(target)
    }

    /// Shifted copy of `x` for `target`, borrowed when the total shift is 0.
    pub fn apply<'x>(&self, x: &'x [f64], target: ShiftTarget<'_>) -> Cow<'x, [f64]> {
        resolve(x, self.total_shift(target))
    }
}
