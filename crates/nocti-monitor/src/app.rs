//! Monitor application loop.
//!
//! Builds the dashboard state container over a file-backed settings
//! store, applies the configured live mode, performs the initial bulk
//! pull, and then reports a one-line summary on a fixed cadence until
//! interrupted.

use crate::config::MonitorConfig;
use crate::error::AppResult;
use nocti_state::{Dashboard, FileStore, Settings, SettingsStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Main application.
pub struct App {
    config: MonitorConfig,
}

impl App {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }

    /// Run until ctrl-c.
    pub async fn run(self) -> AppResult<()> {
        let store = FileStore::new(&self.config.settings_path);

        // First run: seed the settings file from the TOML config. After
        // that the persisted settings win.
        if store.load().is_none() {
            let seeded = Settings {
                api_base_url: self.config.api_base_url.clone(),
                assistant_base_url: self.config.assistant_base_url.clone(),
                admin_token: self.config.admin_token.clone().unwrap_or_default(),
                ..Default::default()
            };
            if let Err(e) = store.save(&seeded) {
                warn!(error = %e, "Failed to seed settings file");
            }
        }

        let dashboard = Dashboard::new(Box::new(store))?;
        info!(
            api = %dashboard.settings().api_base_url,
            live_mode = %self.config.live_mode,
            "Monitor starting"
        );

        dashboard.set_live_mode(self.config.live_mode).await;
        dashboard.refresh_results().await;

        let mut summary =
            tokio::time::interval(Duration::from_secs(self.config.summary_interval_secs.max(1)));
        summary.tick().await; // immediate first tick

        loop {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        warn!(error = %e, "Failed to listen for shutdown signal");
                    }
                    info!("Shutdown requested");
                    break;
                }
                _ = summary.tick() => {
                    log_summary(&dashboard).await;
                }
            }
        }

        dashboard.shutdown().await;
        info!("Monitor stopped");
        Ok(())
    }
}

async fn log_summary(dashboard: &Arc<Dashboard>) {
    let status = dashboard.connection_status().await;
    let queue = dashboard.admin_status().map(|s| s.queue_size);

    info!(
        cached_results = dashboard.result_count(),
        connected = dashboard.is_connected(),
        transport = status.transport.map(|t| t.to_string()),
        error = status.last_error,
        queue_size = queue,
        "Monitor summary"
    );
}
