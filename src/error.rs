//! Error type shared by the alignment engine and the backend client.
//!
//! Every fallible operation returns [`AlignError`]. Nothing in the crate
//! panics on a failed request: errors are caught at the state boundary and
//! turned into a user-visible notice (see [`crate::state::Notifications`]).

use thiserror::Error;

use crate::data::series::ChannelKey;

/// Hint shown when a multi-channel upload does not match the expected layout.
pub const MULTI_CHANNEL_SCHEMA_HINT: &str =
    "first column must be the time column, followed by one column per channel";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignError {
    /// Any request failure (fetch, upload, align, window fetch).
    #[error("network error: {0}")]
    Network(String),
    /// The backend rejected an upload because its schema is wrong.
    #[error("{message} (expected: {hint})")]
    Format { message: String, hint: String },
    /// The correlation service could not compute an offset.
    #[error("alignment failed: {0}")]
    Alignment(String),
    /// One channel window failed to load; siblings are unaffected.
    #[error("failed to load channel {key}: {reason}")]
    PartialChannelLoad { key: ChannelKey, reason: String },
    #[error("alignment needs at least two {scope} with data, found {found}")]
    NotEnoughScopes { scope: &'static str, found: usize },
    #[error("an alignment request is already in progress")]
    AlignmentInProgress,
    #[error("group '{0}' already exists")]
    GroupExists(String),
    #[error("group name must not be empty")]
    EmptyGroupName,
    #[error("cannot delete the last remaining group")]
    LastGroup,
    #[error("unknown group '{0}'")]
    UnknownGroup(String),
    #[error("unknown dataset '{0}'")]
    UnknownDataset(String),
    #[error("invalid series '{id}': {reason}")]
    InvalidSeries { id: String, reason: String },
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AlignError>;

impl From<reqwest::Error> for AlignError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AlignError::Network(format!("request timed out: {e}"))
        } else {
            AlignError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AlignError {
    fn from(e: serde_json::Error) -> Self {
        AlignError::Network(format!("malformed response: {e}"))
    }
}

impl AlignError {
    /// Short category label used by the notification log.
    pub fn kind(&self) -> &'static str {
        match self {
            AlignError::Network(_) => "network",
            AlignError::Format { .. } => "format",
            AlignError::Alignment(_) => "alignment",
            AlignError::PartialChannelLoad { .. } => "channel",
            AlignError::Config(_) => "config",
            _ => "input",
        }
    }
}
