//! Dashboard state container for the NoctiVision monitor.
//!
//! The single process-wide owner of configuration, connection status,
//! and cached data. Presentation layers read snapshots and issue
//! commands; they never mutate state directly.

pub mod container;
pub mod error;
pub mod settings;

pub use container::{Dashboard, ADMIN_POLL_INTERVAL, DEFAULT_STATS_WINDOW_MINUTES};
pub use error::{StateError, StateResult};
pub use settings::{FileStore, MemoryStore, Settings, SettingsStore};
