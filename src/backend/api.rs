//! Wire types exchanged with the backend service (JSON, camelCase).

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::datasets::Dataset;
use crate::data::series::{DatasetId, Series, SeriesId};
use crate::data::slicer::{CutMode, CutRange};
use crate::error::{AlignError, Result, MULTI_CHANNEL_SCHEMA_HINT};

/// Columns of one series as sent by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl RawSeries {
    /// Validate into an immutable [`Series`].
    pub fn into_series(self, id: impl Into<String>) -> Result<Series> {
        Series::new(id, self.x, self.y)
    }
}

/// `GET /data`: every single-channel series keyed by id.
pub type SeriesMap = BTreeMap<SeriesId, RawSeries>;

/// Body of a rejected upload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadFailure {
    /// `true` or an error string, depending on the backend version.
    pub error: Value,
    /// Present when the file does not match the multi-channel layout; may
    /// carry a schema hint string.
    #[serde(default, rename = "formatError")]
    pub format_error: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl UploadFailure {
    pub fn into_error(self) -> AlignError {
        let message = self
            .message
            .or_else(|| self.error.as_str().map(str::to_string))
            .unwrap_or_else(|| "upload rejected".to_string());
        match self.format_error {
            Some(Value::Bool(false)) | Some(Value::Null) | None => AlignError::Network(message),
            Some(Value::String(hint)) => AlignError::Format { message, hint },
            Some(_) => AlignError::Format {
                message,
                hint: MULTI_CHANNEL_SCHEMA_HINT.to_string(),
            },
        }
    }
}

/// `POST /upload` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UploadResponse {
    Failed(UploadFailure),
    /// Multi-channel upload registered as a dataset.
    Dataset(Dataset),
    /// Single-channel upload merged into the series set.
    Loaded { message: String },
}

/// `POST /clear` response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClearResponse {
    #[serde(default, rename = "filesDeletedCount")]
    pub files_deleted_count: usize,
}

/// `POST /align` body for single-channel runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAlignRequest {
    pub groups: BTreeMap<String, Vec<SeriesId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cut_ranges: Option<BTreeMap<SeriesId, CutRange>>,
    /// Whether `cut_ranges` bounds are sample indices or time values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cut_mode: Option<CutMode>,
    pub reference_group: String,
}

/// `POST /datasets/align` body for multi-channel runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetAlignRequest {
    pub dataset_ids: Vec<DatasetId>,
    pub channel_id: String,
    pub reference_dataset_id: DatasetId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cut_range: Option<CutRange>,
    pub target_points: usize,
}

/// Response of either alignment endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AlignResponse {
    Offsets { offsets: HashMap<String, f64> },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetsResponse {
    pub datasets: Vec<Dataset>,
}

/// `GET /datasets/{id}/data`: every channel of a small dataset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetDataResponse {
    pub data: BTreeMap<String, RawSeries>,
}

/// Window endpoints: one downsampled channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChannelWindowResponse {
    pub data: RawSeries,
}

/// Query string of the window endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowQuery {
    pub target_points: usize,
    pub dataset_id: DatasetId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub dataset_id: DatasetId,
    pub name: String,
}
