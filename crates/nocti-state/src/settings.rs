//! Client settings persistence.
//!
//! The original deployment kept these as individual localStorage keys;
//! here they are one JSON document behind a `SettingsStore`. Persisted
//! on every change, rehydrated at startup. No ambient globals:
//! configuration enters the container at construction and changes only
//! through its setters.

use crate::error::{StateError, StateResult};
use nocti_core::{Language, ViewMode};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

fn default_api_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_assistant_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

/// Durable client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_assistant_base_url")]
    pub assistant_base_url: String,
    /// Admin credential. Empty means unauthenticated.
    #[serde(default)]
    pub admin_token: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::default(),
            language: Language::default(),
            api_base_url: default_api_base_url(),
            assistant_base_url: default_assistant_base_url(),
            admin_token: String::new(),
        }
    }
}

/// Storage backend for [`Settings`].
pub trait SettingsStore: Send + Sync {
    /// Load persisted settings. Absent or unreadable state yields None;
    /// the caller falls back to defaults.
    fn load(&self) -> Option<Settings>;

    /// Persist the full settings document.
    fn save(&self, settings: &Settings) -> StateResult<()>;
}

impl<S: SettingsStore + ?Sized> SettingsStore for std::sync::Arc<S> {
    fn load(&self) -> Option<Settings> {
        self.as_ref().load()
    }

    fn save(&self, settings: &Settings) -> StateResult<()> {
        self.as_ref().save(settings)
    }
}

/// JSON file store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SettingsStore for FileStore {
    fn load(&self) -> Option<Settings> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read settings");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt settings file");
                None
            }
        }
    }

    fn save(&self, settings: &Settings) -> StateResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StateError::Settings(format!("Failed to create {parent:?}: {e}")))?;
        }

        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| StateError::Settings(format!("Failed to encode settings: {e}")))?;
        std::fs::write(&self.path, content)
            .map_err(|e| StateError::Settings(format!("Failed to write settings: {e}")))
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Option<Settings>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the store.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            inner: Mutex::new(Some(settings)),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Option<Settings> {
        self.inner.lock().clone()
    }

    fn save(&self, settings: &Settings) -> StateResult<()> {
        *self.inner.lock() = Some(settings.clone());
        Ok(())
    }
}
