//! Transport selection and reconnect policy.
//!
//! Translates the live-mode preference into one background session:
//! - `off`: no connection; disconnected with no error.
//! - `ws`: WebSocket only; fixed 3-second reconnect, indefinitely.
//! - `sse`: event stream only; fixed 3-second reconnect, indefinitely.
//! - `auto`: WebSocket first; on any failure, fall back to the event
//!   stream after 1 second. Fallback is one-directional within a mode
//!   session — once on SSE, the session never re-escalates.
//!
//! Applying a mode (including reapplying the current one) always tears
//! the previous session down fully — cancel the token, await the task —
//! before the new policy starts, so at most one transport is ever
//! subscribed and no retry timer outlives its session.

use crate::error::LiveResult;
use crate::event::{LiveEvent, TransportKind};
use crate::sse::{run_sse, sse_url};
use crate::ws::{run_ws, ws_url};
use nocti_core::LiveMode;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Fixed delay before re-attempting a failed transport.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Fixed delay before the WebSocket-to-SSE fallback under `auto`.
pub const FALLBACK_DELAY: Duration = Duration::from_secs(1);

/// Grace period for a cancelled session to finish before it is aborted.
const TEARDOWN_GRACE: Duration = Duration::from_secs(1);

/// Connection lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Errored,
}

/// Observable connection state.
#[derive(Debug, Clone, Default)]
pub struct ConnectionStatus {
    pub phase: ConnectionPhase,
    /// Transport of the current attempt/connection, None when off.
    pub transport: Option<TransportKind>,
    /// Human-readable description of the last failure; cleared on
    /// success and on teardown.
    pub last_error: Option<String>,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        self.phase == ConnectionPhase::Connected
    }

    pub(crate) fn connecting(&mut self, transport: TransportKind) {
        self.phase = ConnectionPhase::Connecting;
        self.transport = Some(transport);
    }

    pub(crate) fn connected(&mut self, transport: TransportKind) {
        self.phase = ConnectionPhase::Connected;
        self.transport = Some(transport);
        self.last_error = None;
    }

    pub(crate) fn errored(&mut self, transport: TransportKind, message: String) {
        self.phase = ConnectionPhase::Errored;
        self.transport = Some(transport);
        self.last_error = Some(message);
    }

    pub(crate) fn disconnected(&mut self) {
        self.phase = ConnectionPhase::Disconnected;
        self.transport = None;
        self.last_error = None;
    }
}

pub(crate) type SharedStatus = Arc<RwLock<ConnectionStatus>>;

struct Session {
    token: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

/// One logical live subscription, managed per mode session.
pub struct LiveConnection {
    mode: LiveMode,
    status: SharedStatus,
    events_tx: mpsc::Sender<LiveEvent>,
    session: Option<Session>,
}

impl LiveConnection {
    /// Create an idle connection. No transport is attempted until
    /// `apply` is called with a mode other than `off`.
    pub fn new(events_tx: mpsc::Sender<LiveEvent>) -> Self {
        Self {
            mode: LiveMode::Off,
            status: Arc::new(RwLock::new(ConnectionStatus::default())),
            events_tx,
            session: None,
        }
    }

    pub fn mode(&self) -> LiveMode {
        self.mode
    }

    /// Snapshot of the current connection state.
    pub fn status(&self) -> ConnectionStatus {
        self.status.read().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.status.read().is_connected()
    }

    pub fn connection_error(&self) -> Option<String> {
        self.status.read().last_error.clone()
    }

    /// Apply a live-mode preference against an API base URL.
    ///
    /// Every call is a distinct selection event: the prior session is
    /// torn down fully even when the mode is unchanged.
    pub async fn apply(&mut self, mode: LiveMode, base_url: &str) {
        self.teardown().await;
        self.mode = mode;

        if mode == LiveMode::Off {
            info!("Live updates off");
            return;
        }

        info!(%mode, %base_url, "Starting live session");
        let token = CancellationToken::new();
        let task = tokio::spawn(run_session(
            mode,
            base_url.to_string(),
            self.events_tx.clone(),
            self.status.clone(),
            token.clone(),
        ));
        self.session = Some(Session { token, task });
    }

    /// Tear down any active session and report disconnected.
    pub async fn shutdown(&mut self) {
        self.teardown().await;
        self.mode = LiveMode::Off;
    }

    async fn teardown(&mut self) {
        let Some(session) = self.session.take() else {
            self.status.write().disconnected();
            return;
        };

        session.token.cancel();
        let mut task = session.task;
        if tokio::time::timeout(TEARDOWN_GRACE, &mut task).await.is_err() {
            warn!("Live session did not stop within grace period, aborting");
            task.abort();
            let _ = task.await;
        }
        self.status.write().disconnected();
    }
}

impl Drop for LiveConnection {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.token.cancel();
            session.task.abort();
        }
    }
}

async fn run_session(
    mode: LiveMode,
    base_url: String,
    events: mpsc::Sender<LiveEvent>,
    status: SharedStatus,
    token: CancellationToken,
) {
    match mode {
        LiveMode::Off => {}
        LiveMode::Ws => ws_session(&base_url, &events, &status, &token).await,
        LiveMode::Sse => sse_session(&base_url, &events, &status, &token).await,
        LiveMode::Auto => auto_session(&base_url, &events, &status, &token).await,
    }
}

/// WebSocket-only session: retry on the fixed cadence until cancelled.
async fn ws_session(
    base_url: &str,
    events: &mpsc::Sender<LiveEvent>,
    status: &SharedStatus,
    token: &CancellationToken,
) {
    let url = ws_url(base_url);
    loop {
        status.write().connecting(TransportKind::WebSocket);
        let result = run_ws(&url, events, status, token).await;
        if report_closed(TransportKind::WebSocket, result, events, status, token).await {
            return;
        }
        if sleep_or_cancel(RECONNECT_DELAY, status, token).await {
            return;
        }
    }
}

/// SSE-only session: retry on the fixed cadence until cancelled.
async fn sse_session(
    base_url: &str,
    events: &mpsc::Sender<LiveEvent>,
    status: &SharedStatus,
    token: &CancellationToken,
) {
    let url = sse_url(base_url);
    loop {
        status.write().connecting(TransportKind::EventStream);
        let result = run_sse(&url, events, status, token).await;
        if report_closed(TransportKind::EventStream, result, events, status, token).await {
            return;
        }
        if sleep_or_cancel(RECONNECT_DELAY, status, token).await {
            return;
        }
    }
}

/// Auto session: one WebSocket attempt, then the event stream for the
/// rest of the session.
async fn auto_session(
    base_url: &str,
    events: &mpsc::Sender<LiveEvent>,
    status: &SharedStatus,
    token: &CancellationToken,
) {
    let url = ws_url(base_url);
    status.write().connecting(TransportKind::WebSocket);
    let result = run_ws(&url, events, status, token).await;
    if report_closed(TransportKind::WebSocket, result, events, status, token).await {
        return;
    }

    debug!(
        delay_ms = FALLBACK_DELAY.as_millis() as u64,
        "Falling back to event stream"
    );
    if sleep_or_cancel(FALLBACK_DELAY, status, token).await {
        return;
    }

    // One-directional within the session: no path back to WebSocket.
    sse_session(base_url, events, status, token).await;
}

/// Record a terminated attempt. Returns true when the session was
/// cancelled and the caller should exit.
async fn report_closed(
    transport: TransportKind,
    result: LiveResult<()>,
    events: &mpsc::Sender<LiveEvent>,
    status: &SharedStatus,
    token: &CancellationToken,
) -> bool {
    if token.is_cancelled() {
        status.write().disconnected();
        return true;
    }

    let reason = match result {
        Ok(()) => "connection closed".to_string(),
        Err(e) => e.to_string(),
    };
    warn!(%transport, %reason, "Live transport dropped");
    status.write().errored(transport, reason.clone());
    let _ = events.send(LiveEvent::Closed { transport, reason }).await;
    false
}

/// Cancellation-aware retry sleep. Returns true when cancelled.
async fn sleep_or_cancel(delay: Duration, status: &SharedStatus, token: &CancellationToken) -> bool {
    tokio::select! {
        () = tokio::time::sleep(delay) => false,
        () = token.cancelled() => {
            status.write().disconnected();
            true
        }
    }
}
