//! Configuration for the aligner UI and engine.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::data::offsets::ShiftModePolicy;
use crate::data::viewport::ShiftBoundsConfig;
use crate::error::{AlignError, Result};

/// Environment variable overriding [`AlignerConfig::backend_url`].
pub const BACKEND_URL_ENV: &str = "SERIESALIGN_BACKEND";

/// Settings for [`run_aligner`](crate::run_aligner) and [`AlignState`](crate::AlignState).
///
/// Every field has a default, so a JSON config file only needs the keys it
/// wants to change.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    /// Window title.
    pub title: String,
    /// Base URL of the backend service.
    pub backend_url: String,
    /// Point budget requested for large-dataset windows and alignment.
    pub target_points: usize,
    /// Timeout applied to uploads only; large files are slow to ingest.
    pub upload_timeout_secs: u64,
    pub shift_bounds: ShiftBoundsConfig,
    /// Whether switching the manual-shift mode clears the table being left.
    pub shift_mode_policy: ShiftModePolicy,
    /// Number of notices kept in the notification log.
    pub notification_capacity: usize,
    /// Groups created at start-up.
    pub initial_groups: Vec<String>,
    /// Optional eframe window options.
    #[serde(skip)]
    pub native_options: Option<eframe::NativeOptions>,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            title: "Series Align".to_string(),
            backend_url: "http://127.0.0.1:8000".to_string(),
            target_points: 10_000,
            upload_timeout_secs: 600,
            shift_bounds: ShiftBoundsConfig::default(),
            shift_mode_policy: ShiftModePolicy::default(),
            notification_capacity: 50,
            initial_groups: vec!["Normal".to_string(), "Abnormal".to_string()],
            native_options: None,
        }
    }
}

impl AlignerConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AlignError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| AlignError::Config(format!("{}: {e}", path.display())))
    }

    /// Apply environment overrides on top of the current values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                self.backend_url = url.trim().to_string();
            }
        }
        self
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}
