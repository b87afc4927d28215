//! Headless monitor for the NoctiVision validation pipeline.
//!
//! Operational shell around the dashboard state container: loads TOML
//! configuration, applies the configured live mode, and reports
//! connection transitions and cache activity until interrupted.

pub mod app;
pub mod config;
pub mod error;

pub use app::App;
pub use config::MonitorConfig;
pub use error::{AppError, AppResult};
