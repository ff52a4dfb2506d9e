//! Building alignment requests and applying their results.

use std::collections::{BTreeMap, HashMap};

use tracing::{info, warn};

use crate::backend::api::{AlignResponse, DatasetAlignRequest, GroupAlignRequest};
use crate::data::grouping::GroupingModel;
use crate::data::offsets::AutoOffsets;
use crate::data::series::{DatasetId, SeriesStore};
use crate::data::slicer::{CutMode, CutRange};
use crate::error::{AlignError, Result};

/// Which auto-offset table an outstanding request will replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentKind {
    Groups,
    Datasets,
}

/// Guards against concurrent runs and owns the replace-on-success rule.
#[derive(Debug, Clone, Default)]
pub struct AlignmentCoordinator {
    pending: Option<AlignmentKind>,
}

impl AlignmentCoordinator {
    pub fn is_in_progress(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<AlignmentKind> {
        self.pending
    }

    /// Build a single-channel request from every non-empty group.
    ///
    /// Fails without side effects when a run is outstanding or fewer than two
    /// groups have members. On success the coordinator is marked busy. An
    /// enabled cut is sent for every member together with its mode.
    pub fn begin_groups(
        &mut self,
        grouping: &GroupingModel,
        store: &SeriesStore,
        cut: Option<(CutRange, CutMode)>,
    ) -> Result<GroupAlignRequest> {
        if self.is_in_progress() {
            return Err(AlignError::AlignmentInProgress);
        }
        let groups: BTreeMap<String, Vec<String>> = grouping
            .groups()
            .iter()
            .filter_map(|g| {
                let members: Vec<String> = grouping
                    .members(&g.name, store.ids())
                    .into_iter()
                    .cloned()
                    .collect();
                (!members.is_empty()).then(|| (g.name.clone(), members))
            })
            .collect();
        if groups.len() < 2 {
            return Err(AlignError::NotEnoughScopes {
                scope: "groups",
                found: groups.len(),
            });
        }
        let reference_group = if groups.contains_key(grouping.reference_group()) {
            grouping.reference_group().to_string()
        } else {
            // reference group has no members; fall back to the first populated one
            groups.keys().next().cloned().unwrap_or_default()
        };
        let cut = cut.filter(|(c, _)| c.enabled);
        let cut_mode = cut.map(|(_, mode)| mode);
        let cut_ranges = cut.map(|(c, _)| {
            groups
                .values()
                .flatten()
                .map(|id| (id.clone(), c))
                .collect()
        });
        self.pending = Some(AlignmentKind::Groups);
        info!(groups = groups.len(), reference = %reference_group, "group alignment requested");
        Ok(GroupAlignRequest {
            groups,
            cut_ranges,
            cut_mode,
            reference_group,
        })
    }

    /// Build a multi-channel request over `datasets` for one channel.
    pub fn begin_datasets(
        &mut self,
        datasets: Vec<DatasetId>,
        channel: &str,
        reference: &str,
        cut: Option<CutRange>,
        target_points: usize,
    ) -> Result<DatasetAlignRequest> {
        if self.is_in_progress() {
            return Err(AlignError::AlignmentInProgress);
        }
        if datasets.len() < 2 {
            return Err(AlignError::NotEnoughScopes {
                scope: "datasets",
                found: datasets.len(),
            });
        }
        if !datasets.iter().any(|d| d == reference) {
            return Err(AlignError::UnknownDataset(reference.to_string()));
        }
        self.pending = Some(AlignmentKind::Datasets);
        info!(datasets = datasets.len(), channel, reference, "dataset alignment requested");
        Ok(DatasetAlignRequest {
            dataset_ids: datasets,
            channel_id: channel.to_string(),
            reference_dataset_id: reference.to_string(),
            cut_range: cut.filter(|c| c.enabled),
            target_points,
        })
    }

    /// Apply the outcome of the outstanding request.
    ///
    /// Success replaces the matching auto-offset table wholesale and returns
    /// the number of offsets received. Any error leaves `auto` untouched.
    pub fn finish(
        &mut self,
        auto: &mut AutoOffsets,
        outcome: Result<AlignResponse>,
    ) -> Result<usize> {
        let Some(kind) = self.pending.take() else {
            warn!("alignment result arrived with no request outstanding");
            return Ok(0);
        };
        let offsets: HashMap<String, f64> = match outcome? {
            AlignResponse::Offsets { offsets } => offsets,
            AlignResponse::Failed { error } => return Err(AlignError::Alignment(error)),
        };
        let count = offsets.len();
        match kind {
            AlignmentKind::Groups => auto.replace_series(offsets),
            AlignmentKind::Datasets => auto.replace_datasets(offsets),
        }
        info!(?kind, count, "auto offsets replaced");
        Ok(count)
    }
}
