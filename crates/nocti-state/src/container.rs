//! The dashboard state container.
//!
//! Single writer for all client-side state: configuration, the bounded
//! result cache, the activity log, admin/stats snapshots, and the
//! derived connection status. Orchestrates the REST client, the live
//! connection, and two background tasks (live event pump, admin
//! polling).
//!
//! Ordering rules:
//! - `refresh_results` is guarded by a generation counter so a stale
//!   in-flight response can never clobber newer rows.
//! - Applying a live mode always tears the prior session down first.
//! - The admin polling task is cancelled whenever the token changes.

use crate::error::StateResult;
use crate::settings::{Settings, SettingsStore};
use nocti_api::{AdminToken, ApiClient, AssistantClient, ControlAction, ExportFormat};
use nocti_core::{
    ActivityKind, ActivityLog, ActivityLogEntry, AdminStatus, AssistantResponse, DomainOverrides,
    FilterState, LiveMode, ResultCache, SortState, StatsResponse, Status, UploadResponse,
    ValidationResult, RESULT_CACHE_CAPACITY,
};
use nocti_live::{ConnectionStatus, LiveConnection, LiveEvent};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Cadence of the background admin status/stats refresh.
pub const ADMIN_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default trailing window for stats pulls.
pub const DEFAULT_STATS_WINDOW_MINUTES: u32 = 15;

/// Default top-N size for error-domain rankings.
const DEFAULT_STATS_TOP: u32 = 10;

/// Row limit for export pulls.
const EXPORT_LIMIT: usize = 100_000;

/// Capacity of the live event channel.
const LIVE_CHANNEL_CAPACITY: usize = 256;

/// Process-wide owner of dashboard state.
pub struct Dashboard {
    store: Box<dyn SettingsStore>,
    settings: RwLock<Settings>,

    api: RwLock<ApiClient>,
    assistant: RwLock<AssistantClient>,

    live: tokio::sync::Mutex<LiveConnection>,
    live_mode: RwLock<LiveMode>,
    connected: AtomicBool,
    connection_error: RwLock<Option<String>>,

    cache: RwLock<ResultCache>,
    activity: RwLock<ActivityLog>,
    admin_status: RwLock<Option<AdminStatus>>,
    stats: RwLock<Option<StatsResponse>>,

    filters: RwLock<FilterState>,
    sort: RwLock<SortState>,

    refresh_generation: AtomicU64,
    loading_results: AtomicBool,
    loading_status: AtomicBool,
    loading_stats: AtomicBool,

    poll_token: Mutex<Option<CancellationToken>>,
    pump_token: CancellationToken,
}

impl Dashboard {
    /// Build the container over a settings store.
    ///
    /// Rehydrates persisted settings, wires the REST clients, and
    /// spawns the live event pump. No live transport is attempted until
    /// `set_live_mode` is called; admin polling starts immediately when
    /// a token was rehydrated.
    pub fn new(store: Box<dyn SettingsStore>) -> StateResult<Arc<Self>> {
        let settings = store.load().unwrap_or_default();
        info!(
            api = %settings.api_base_url,
            assistant = %settings.assistant_base_url,
            has_token = !settings.admin_token.is_empty(),
            "Building dashboard state"
        );

        let mut api = ApiClient::new(&settings.api_base_url)?;
        if !settings.admin_token.is_empty() {
            api.set_token(Some(AdminToken::new(settings.admin_token.clone())));
        }
        let assistant = AssistantClient::new(&settings.assistant_base_url)?;

        let (events_tx, events_rx) = mpsc::channel(LIVE_CHANNEL_CAPACITY);
        let pump_token = CancellationToken::new();

        let dashboard = Arc::new(Self {
            store,
            settings: RwLock::new(settings),
            api: RwLock::new(api),
            assistant: RwLock::new(assistant),
            live: tokio::sync::Mutex::new(LiveConnection::new(events_tx)),
            live_mode: RwLock::new(LiveMode::Off),
            connected: AtomicBool::new(false),
            connection_error: RwLock::new(None),
            cache: RwLock::new(ResultCache::new()),
            activity: RwLock::new(ActivityLog::new()),
            admin_status: RwLock::new(None),
            stats: RwLock::new(None),
            filters: RwLock::new(FilterState::default()),
            sort: RwLock::new(SortState::default()),
            refresh_generation: AtomicU64::new(0),
            loading_results: AtomicBool::new(false),
            loading_status: AtomicBool::new(false),
            loading_stats: AtomicBool::new(false),
            poll_token: Mutex::new(None),
            pump_token: pump_token.clone(),
        });

        tokio::spawn(run_event_pump(
            Arc::downgrade(&dashboard),
            events_rx,
            pump_token,
        ));

        if dashboard.api.read().has_token() {
            dashboard.start_admin_polling();
        }

        Ok(dashboard)
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    pub fn set_view_mode(&self, mode: nocti_core::ViewMode) {
        let snapshot = {
            let mut settings = self.settings.write();
            settings.view_mode = mode;
            settings.clone()
        };
        self.persist(&snapshot);
    }

    pub fn set_language(&self, language: nocti_core::Language) {
        let snapshot = {
            let mut settings = self.settings.write();
            settings.language = language;
            settings.clone()
        };
        self.persist(&snapshot);
    }

    /// Point the container at a different validation service.
    ///
    /// Rebuilds the REST client and restarts any live session against
    /// the new endpoint.
    pub async fn set_api_base_url(&self, url: &str) -> StateResult<()> {
        let mut client = ApiClient::new(url)?;

        let snapshot = {
            let mut settings = self.settings.write();
            settings.api_base_url = client.base_url().to_string();
            if !settings.admin_token.is_empty() {
                client.set_token(Some(AdminToken::new(settings.admin_token.clone())));
            }
            settings.clone()
        };
        self.persist(&snapshot);
        *self.api.write() = client;

        let mode = *self.live_mode.read();
        if mode != LiveMode::Off {
            self.apply_live(mode).await;
        }
        Ok(())
    }

    pub fn set_assistant_base_url(&self, url: &str) -> StateResult<()> {
        let client = AssistantClient::new(url)?;

        let snapshot = {
            let mut settings = self.settings.write();
            settings.assistant_base_url = client.base_url().to_string();
            settings.clone()
        };
        self.persist(&snapshot);
        *self.assistant.write() = client;
        Ok(())
    }

    /// Set or clear the admin credential.
    ///
    /// Starts admin polling when a token appears, stops it when the
    /// token is cleared. Prior admin snapshots are left as-is.
    pub fn set_admin_token(self: &Arc<Self>, token: &str) {
        let snapshot = {
            let mut settings = self.settings.write();
            settings.admin_token = token.to_string();
            settings.clone()
        };
        self.persist(&snapshot);

        if token.is_empty() {
            self.api.write().set_token(None);
            self.stop_admin_polling();
        } else {
            self.api.write().set_token(Some(AdminToken::new(token)));
            self.start_admin_polling();
        }
    }

    fn persist(&self, settings: &Settings) {
        if let Err(e) = self.store.save(settings) {
            warn!(error = %e, "Failed to persist settings");
        }
    }

    // ------------------------------------------------------------------
    // Live connection
    // ------------------------------------------------------------------

    pub fn live_mode(&self) -> LiveMode {
        *self.live_mode.read()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn connection_error(&self) -> Option<String> {
        self.connection_error.read().clone()
    }

    /// Detailed transport status.
    pub async fn connection_status(&self) -> ConnectionStatus {
        self.live.lock().await.status()
    }

    /// Apply a live-mode preference. Every call is a distinct selection
    /// event: the prior session is torn down fully first.
    pub async fn set_live_mode(&self, mode: LiveMode) {
        *self.live_mode.write() = mode;
        self.apply_live(mode).await;
    }

    async fn apply_live(&self, mode: LiveMode) {
        self.connected.store(false, Ordering::SeqCst);
        *self.connection_error.write() = None;

        let base_url = self.api.read().base_url().to_string();
        let mut live = self.live.lock().await;
        live.apply(mode, &base_url).await;
    }

    fn handle_live_event(&self, event: LiveEvent) {
        match event {
            LiveEvent::Opened { transport } => {
                self.connected.store(true, Ordering::SeqCst);
                *self.connection_error.write() = None;
                self.activity
                    .write()
                    .push(ActivityKind::Info, format!("{transport} connected"));
                info!(%transport, "Live transport connected");
            }
            LiveEvent::Result(row) => {
                self.cache.write().push(*row);
            }
            LiveEvent::Closed { transport, reason } => {
                self.connected.store(false, Ordering::SeqCst);
                *self.connection_error.write() = Some(reason.clone());
                debug!(%transport, %reason, "Live transport dropped");
            }
        }
    }

    // ------------------------------------------------------------------
    // Filters, sort, results
    // ------------------------------------------------------------------

    pub fn filters(&self) -> FilterState {
        self.filters.read().clone()
    }

    pub fn sort(&self) -> SortState {
        *self.sort.read()
    }

    /// Update the filter and refresh when the value actually changed.
    pub async fn set_filters(&self, filters: FilterState) {
        let changed = {
            let mut guard = self.filters.write();
            if *guard == filters {
                false
            } else {
                *guard = filters;
                true
            }
        };
        if changed {
            self.refresh_results().await;
        }
    }

    /// Update the sort order and refresh when the value actually changed.
    pub async fn set_sort(&self, sort: SortState) {
        let changed = {
            let mut guard = self.sort.write();
            if *guard == sort {
                false
            } else {
                *guard = sort;
                true
            }
        };
        if changed {
            self.refresh_results().await;
        }
    }

    /// Bulk pull with the current filter/sort, replacing the cache.
    ///
    /// On failure the cache is reset to empty and one error audit entry
    /// is appended — stale rows are never retained past a failed
    /// refresh. A response superseded by a newer call is discarded.
    pub async fn refresh_results(&self) {
        let generation = self.refresh_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.loading_results.store(true, Ordering::SeqCst);

        let filters = self.filters.read().clone();
        let sort = *self.sort.read();
        let api = self.api.read().clone();

        let result = api
            .fetch_results(&filters, &sort, RESULT_CACHE_CAPACITY)
            .await;

        if self.refresh_generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Discarding stale results refresh");
            return;
        }

        match result {
            Ok(rows) => {
                debug!(count = rows.len(), "Results refreshed");
                self.cache.write().replace_all(rows);
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch results");
                self.cache.write().clear();
                self.activity
                    .write()
                    .push(ActivityKind::Error, format!("Failed to fetch results: {e}"));
            }
        }
        self.loading_results.store(false, Ordering::SeqCst);
    }

    pub fn results(&self) -> Vec<ValidationResult> {
        self.cache.read().snapshot()
    }

    pub fn result_count(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_loading_results(&self) -> bool {
        self.loading_results.load(Ordering::SeqCst)
    }

    // ------------------------------------------------------------------
    // Admin surface
    // ------------------------------------------------------------------

    pub fn admin_status(&self) -> Option<AdminStatus> {
        self.admin_status.read().clone()
    }

    pub fn stats(&self) -> Option<StatsResponse> {
        self.stats.read().clone()
    }

    pub fn is_loading_status(&self) -> bool {
        self.loading_status.load(Ordering::SeqCst)
    }

    pub fn is_loading_stats(&self) -> bool {
        self.loading_stats.load(Ordering::SeqCst)
    }

    /// Pull worker/queue status. No-op without a token; on failure the
    /// prior snapshot is left untouched.
    pub async fn refresh_admin_status(&self) {
        let api = self.api.read().clone();
        if !api.has_token() {
            return;
        }

        self.loading_status.store(true, Ordering::SeqCst);
        match api.admin_status().await {
            Ok(status) => {
                *self.admin_status.write() = Some(status);
            }
            Err(e) if e.is_unauthorized() => {
                warn!("Admin status refresh rejected");
                self.activity
                    .write()
                    .push(ActivityKind::Error, "Invalid admin token");
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch admin status");
            }
        }
        self.loading_status.store(false, Ordering::SeqCst);
    }

    /// Pull aggregate stats. No-op without a token; on failure the
    /// prior snapshot is left untouched.
    pub async fn refresh_stats(&self, window_minutes: u32) {
        let api = self.api.read().clone();
        if !api.has_token() {
            return;
        }

        self.loading_stats.store(true, Ordering::SeqCst);
        match api.fetch_stats(window_minutes, DEFAULT_STATS_TOP).await {
            Ok(stats) => {
                *self.stats.write() = Some(stats);
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch stats");
            }
        }
        self.loading_stats.store(false, Ordering::SeqCst);
    }

    fn start_admin_polling(self: &Arc<Self>) {
        self.stop_admin_polling();

        let token = CancellationToken::new();
        *self.poll_token.lock() = Some(token.clone());

        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(ADMIN_POLL_INTERVAL);
            loop {
                tokio::select! {
                    () = token.cancelled() => return,
                    _ = interval.tick() => {
                        let Some(dashboard) = weak.upgrade() else { return };
                        dashboard.refresh_admin_status().await;
                        dashboard.refresh_stats(DEFAULT_STATS_WINDOW_MINUTES).await;
                    }
                }
            }
        });
    }

    fn stop_admin_polling(&self) {
        if let Some(token) = self.poll_token.lock().take() {
            token.cancel();
        }
    }

    /// Worker control. Updates the admin snapshot from the response.
    pub async fn admin_control(
        &self,
        action: ControlAction,
        workers: Option<u32>,
    ) -> StateResult<AdminStatus> {
        let api = self.api.read().clone();
        let status = api.admin_control(action, workers).await?;
        *self.admin_status.write() = Some(status.clone());
        self.activity
            .write()
            .push(ActivityKind::Admin, format!("Worker control: {action}"));
        Ok(status)
    }

    pub async fn admin_cleanup(&self, status: Option<Status>) -> StateResult<()> {
        let api = self.api.read().clone();
        api.admin_cleanup(status).await?;
        let scope = status.map_or_else(|| "all".to_string(), |s| s.to_string());
        self.activity
            .write()
            .push(ActivityKind::Admin, format!("Cleanup: {scope}"));
        Ok(())
    }

    pub async fn admin_reset(&self) -> StateResult<()> {
        let api = self.api.read().clone();
        api.admin_reset().await?;
        self.activity
            .write()
            .push(ActivityKind::Admin, "Pipeline reset");
        Ok(())
    }

    pub async fn admin_queue_clear(&self) -> StateResult<()> {
        let api = self.api.read().clone();
        api.admin_queue_clear().await?;
        self.activity
            .write()
            .push(ActivityKind::Admin, "Queue cleared");
        Ok(())
    }

    pub async fn admin_queue_drain(&self, enable: bool) -> StateResult<()> {
        let api = self.api.read().clone();
        api.admin_queue_drain(enable).await?;
        let state = if enable { "enabled" } else { "disabled" };
        self.activity
            .write()
            .push(ActivityKind::Admin, format!("Drain mode {state}"));
        Ok(())
    }

    pub async fn admin_domains(&self) -> StateResult<DomainOverrides> {
        let api = self.api.read().clone();
        Ok(api.admin_domains().await?)
    }

    pub async fn admin_domain_set(&self, domain: &str, limit: u32) -> StateResult<()> {
        let api = self.api.read().clone();
        api.admin_domain_set(domain, limit).await?;
        self.activity.write().push(
            ActivityKind::Admin,
            format!("Domain override {domain} -> {limit}"),
        );
        Ok(())
    }

    pub async fn admin_domain_delete(&self, domain: &str) -> StateResult<()> {
        let api = self.api.read().clone();
        api.admin_domain_delete(domain).await?;
        self.activity
            .write()
            .push(ActivityKind::Admin, format!("Domain override {domain} removed"));
        Ok(())
    }

    pub async fn admin_set_concurrency(&self, concurrency: u32) -> StateResult<()> {
        let api = self.api.read().clone();
        api.admin_set_concurrency(concurrency).await?;
        self.activity.write().push(
            ActivityKind::Admin,
            format!("Validator concurrency set to {concurrency}"),
        );
        Ok(())
    }

    /// Reveal plaintext passwords for the given result ids.
    pub async fn reveal_passwords(&self, ids: &[String]) -> StateResult<HashMap<String, String>> {
        let api = self.api.read().clone();
        Ok(api.admin_passwords(ids).await?)
    }

    // ------------------------------------------------------------------
    // Uploads, export, assistant
    // ------------------------------------------------------------------

    /// Upload a credential list. Non-`.txt` names are rejected before
    /// any network call.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> StateResult<UploadResponse> {
        let api = self.api.read().clone();
        let response = api.upload(file_name, bytes).await?;
        self.activity.write().push(
            ActivityKind::Upload,
            format!(
                "Uploaded {file_name}: accepted {}, deduped {}",
                response.accepted, response.deduped
            ),
        );
        Ok(response)
    }

    /// Raw export payload for the current filter/sort.
    pub async fn export(&self, format: ExportFormat) -> StateResult<String> {
        let filters = self.filters.read().clone();
        let sort = *self.sort.read();
        let api = self.api.read().clone();
        Ok(api
            .export_results(format, &filters, &sort, EXPORT_LIMIT)
            .await?)
    }

    /// Ask the assistant a question in the configured language.
    pub async fn assistant_query(&self, text: &str) -> StateResult<AssistantResponse> {
        let lang = self.settings.read().language;
        let assistant = self.assistant.read().clone();
        Ok(assistant.query(text, lang).await?)
    }

    // ------------------------------------------------------------------
    // Activity log
    // ------------------------------------------------------------------

    pub fn activity_log(&self) -> Vec<ActivityLogEntry> {
        self.activity.read().snapshot()
    }

    pub fn add_activity(&self, kind: ActivityKind, message: impl Into<String>) {
        self.activity.write().push(kind, message);
    }

    pub fn clear_activity_log(&self) {
        self.activity.write().clear();
    }

    // ------------------------------------------------------------------
    // Shutdown
    // ------------------------------------------------------------------

    /// Stop background tasks and tear down the live session.
    pub async fn shutdown(&self) {
        info!("Shutting down dashboard state");
        self.stop_admin_polling();
        self.pump_token.cancel();
        self.live.lock().await.shutdown().await;
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("live_mode", &*self.live_mode.read())
            .field("connected", &self.connected.load(Ordering::SeqCst))
            .field("cached_results", &self.cache.read().len())
            .field("activity_entries", &self.activity.read().len())
            .finish()
    }
}

async fn run_event_pump(
    dashboard: Weak<Dashboard>,
    mut events: mpsc::Receiver<LiveEvent>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            () = token.cancelled() => return,
            event = events.recv() => {
                let Some(event) = event else { return };
                let Some(dashboard) = dashboard.upgrade() else { return };
                dashboard.handle_live_event(event);
            }
        }
    }
}
