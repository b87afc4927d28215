//! Monitor configuration.

use crate::error::{AppError, AppResult};
use nocti_core::LiveMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_api_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_assistant_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_settings_path() -> String {
    "nocti-settings.json".to_string()
}

fn default_summary_interval_secs() -> u64 {
    30
}

/// TOML-backed monitor configuration.
///
/// These are the first-run values; once the settings file exists, the
/// persisted settings win for everything they cover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Validation service base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Assistant service base URL.
    #[serde(default = "default_assistant_base_url")]
    pub assistant_base_url: String,
    /// Live transport preference applied at startup.
    #[serde(default)]
    pub live_mode: LiveMode,
    /// Admin credential for the authenticated surface.
    #[serde(default)]
    pub admin_token: Option<String>,
    /// Where client settings are persisted.
    #[serde(default = "default_settings_path")]
    pub settings_path: String,
    /// Cadence of the one-line status summary, seconds.
    #[serde(default = "default_summary_interval_secs")]
    pub summary_interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            assistant_base_url: default_assistant_base_url(),
            live_mode: LiveMode::default(),
            admin_token: None,
            settings_path: default_settings_path(),
            summary_interval_secs: default_summary_interval_secs(),
        }
    }
}

impl MonitorConfig {
    /// Load from a file if it exists, defaults otherwise.
    pub fn load(config_path: &str) -> AppResult<Self> {
        if Path::new(config_path).exists() {
            Self::from_file(config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }
}
