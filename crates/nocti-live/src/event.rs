//! Live event channel payloads and inbound frame handling.
//!
//! Both transports deliver JSON frames with identical semantics: a
//! `{"type":"ping"}` keep-alive is consumed locally, a malformed frame
//! is dropped with a local diagnostic, anything else is a pushed
//! validation result.

use nocti_core::ValidationResult;
use tracing::debug;

/// Which wire transport a live session is using.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    WebSocket,
    EventStream,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebSocket => "websocket",
            Self::EventStream => "event-stream",
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event from the live channel.
#[derive(Debug, Clone)]
pub enum LiveEvent {
    /// A transport completed its open handshake.
    Opened { transport: TransportKind },
    /// One pushed validation result.
    Result(Box<ValidationResult>),
    /// The active transport dropped; the selector decides what happens next.
    Closed {
        transport: TransportKind,
        reason: String,
    },
}

/// Parse one inbound frame.
///
/// Returns the pushed result, or None for keep-alives and malformed
/// payloads. A malformed frame must never close the connection, so this
/// never returns an error.
pub(crate) fn parse_frame(text: &str) -> Option<ValidationResult> {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Discarding unparseable push frame");
            return None;
        }
    };

    if value.get("type").and_then(|t| t.as_str()) == Some("ping") {
        return None;
    }

    match serde_json::from_value::<ValidationResult>(value) {
        Ok(row) => Some(row),
        Err(e) => {
            debug!(error = %e, "Discarding malformed push frame");
            None
        }
    }
}
