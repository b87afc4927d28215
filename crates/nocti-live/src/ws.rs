//! WebSocket transport.
//!
//! Read-only subscription to the server's `/ws` push channel. The
//! endpoint is the API base URL with the scheme substituted
//! (http -> ws, https -> wss) and `/ws` appended. Retry and fallback
//! live in the selector; this module only runs one connection to
//! completion.

use crate::error::{LiveError, LiveResult};
use crate::event::{parse_frame, LiveEvent, TransportKind};
use crate::selector::SharedStatus;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async_tls_with_config, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Derive the WebSocket endpoint from the API base URL.
pub fn ws_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let with_scheme = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    format!("{with_scheme}/ws")
}

/// Run one WebSocket connection until it ends.
///
/// Emits `Opened` after the handshake and one `Result` per pushed row.
/// Returns Ok on cancellation or clean stream end, Err on transport
/// failure; the caller maps either into its retry policy.
pub(crate) async fn run_ws(
    url: &str,
    events: &mpsc::Sender<LiveEvent>,
    status: &SharedStatus,
    shutdown: &CancellationToken,
) -> LiveResult<()> {
    debug!(%url, "Connecting WebSocket");

    let connect = connect_async_tls_with_config(url, None, true, None);
    let (ws_stream, _response) = tokio::select! {
        result = connect => result?,
        () = shutdown.cancelled() => {
            debug!("Shutdown during WebSocket connect");
            return Ok(());
        }
    };
    let (mut write, mut read) = ws_stream.split();

    status.write().connected(TransportKind::WebSocket);
    info!(%url, "WebSocket connected");
    if events
        .send(LiveEvent::Opened {
            transport: TransportKind::WebSocket,
        })
        .await
        .is_err()
    {
        warn!("Live event receiver dropped");
        return Ok(());
    }

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                debug!("Shutdown signal received in WebSocket loop");
                if let Err(e) = write.send(Message::Close(None)).await {
                    debug!(?e, "Failed to send Close frame during shutdown");
                }
                return Ok(());
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(row) = parse_frame(&text) {
                            if events.send(LiveEvent::Result(Box::new(row))).await.is_err() {
                                warn!("Live event receiver dropped");
                                return Ok(());
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        write.send(Message::Pong(data)).await?;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|f| (f.code.into(), f.reason.to_string()))
                            .unwrap_or((1000, "Normal close".to_string()));
                        warn!(code, %reason, "WebSocket closed by server");
                        return Err(LiveError::ConnectionClosed { code, reason });
                    }
                    Some(Err(e)) => {
                        warn!(?e, "WebSocket read error");
                        return Err(e.into());
                    }
                    None => {
                        warn!("WebSocket stream ended");
                        return Ok(());
                    }
                    _ => {}
                }
            }
        }
    }
}
