//! Multi-channel dataset descriptors and their registry.

use serde::{Deserialize, Serialize};

use crate::data::series::{ChannelKey, DatasetId};
use crate::error::{AlignError, Result};

/// Descriptor of one uploaded multi-channel file, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: DatasetId,
    pub name: String,
    pub filename: String,
    #[serde(default)]
    pub is_large_file: bool,
    #[serde(default)]
    pub total_rows: u64,
    pub time_range: [f64; 2],
    pub channels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size_mb: Option<f64>,
}

impl Dataset {
    pub fn channel_key(&self, channel: &str) -> ChannelKey {
        ChannelKey::new(self.id.clone(), channel)
    }

    pub fn has_channel(&self, channel: &str) -> bool {
        self.channels.iter().any(|c| c == channel)
    }
}

/// Datasets known to the session, in registration order.
#[derive(Debug, Clone, Default)]
pub struct DatasetRegistry {
    datasets: Vec<Dataset>,
}

impl DatasetRegistry {
    /// Add a dataset, replacing any existing one with the same id in place.
    /// Returns `true` when the id was new.
    pub fn register(&mut self, dataset: Dataset) -> bool {
        match self.datasets.iter_mut().find(|d| d.id == dataset.id) {
            Some(existing) => {
                *existing = dataset;
                false
            }
            None => {
                self.datasets.push(dataset);
                true
            }
        }
    }

    pub fn replace_all(&mut self, datasets: Vec<Dataset>) {
        self.datasets = datasets;
    }

    pub fn get(&self, id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.id == id)
    }

    /// Rename a dataset and return its previous name.
    pub fn rename(&mut self, id: &str, name: &str) -> Result<String> {
        let dataset = self
            .datasets
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| AlignError::UnknownDataset(id.to_string()))?;
        Ok(std::mem::replace(&mut dataset.name, name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dataset> {
        self.datasets.iter()
    }

    pub fn ids(&self) -> Vec<DatasetId> {
        self.datasets.iter().map(|d| d.id.clone()).collect()
    }

    /// Union of all channel names, in first-seen order.
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for channel in self.datasets.iter().flat_map(|d| d.channels.iter()) {
            if !names.contains(channel) {
                names.push(channel.clone());
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn clear(&mut self) {
        self.datasets.clear();
    }
}
