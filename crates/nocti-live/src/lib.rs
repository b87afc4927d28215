//! Live push channel for the NoctiVision monitor.
//!
//! Provides a single logical subscription to the server's stream of
//! validation results over one of two transports:
//! - Bidirectional WebSocket (`/ws`)
//! - Unidirectional Server-Sent-Events (`/stream`)
//!
//! The transport selector owns fallback and retry timing: fixed 3-second
//! reconnect, 1-second WebSocket-to-SSE fallback under `auto`, full
//! teardown before every mode change. At most one transport is
//! subscribed at any instant.

pub mod error;
pub mod event;
pub mod selector;
pub mod sse;
pub mod ws;

pub use error::{LiveError, LiveResult};
pub use event::{LiveEvent, TransportKind};
pub use selector::{
    ConnectionPhase, ConnectionStatus, LiveConnection, FALLBACK_DELAY, RECONNECT_DELAY,
};
pub use sse::{sse_url, SseDecoder};
pub use ws::ws_url;

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
