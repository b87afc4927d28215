//! Server-Sent-Events transport.
//!
//! Unidirectional subscription to the server's `/stream` endpoint,
//! consumed as a streaming response body. The decoder implements the
//! subset of `text/event-stream` framing the server uses: records
//! separated by blank lines, `data:` field lines concatenated with a
//! newline, `:` comment lines ignored.

use crate::error::{LiveError, LiveResult};
use crate::event::{parse_frame, LiveEvent, TransportKind};
use crate::selector::SharedStatus;
use futures_util::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Connect timeout for the stream request. The established stream
/// itself has no read deadline; liveness comes from server keep-alives
/// plus the selector's retry policy.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Derive the SSE endpoint from the API base URL.
pub fn sse_url(base_url: &str) -> String {
    format!("{}/stream", base_url.trim_end_matches('/'))
}

/// Incremental `text/event-stream` decoder.
///
/// Feed arbitrary chunk boundaries; complete event payloads come out as
/// they are terminated by a blank line.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning any completed event payloads.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);

        let mut out = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            self.process_line(line.trim_end_matches(['\n', '\r']), &mut out);
        }
        out
    }

    fn process_line(&mut self, line: &str, out: &mut Vec<String>) {
        if line.is_empty() {
            // Blank line terminates the record.
            if !self.data.is_empty() {
                out.push(self.data.join("\n"));
                self.data.clear();
            }
            return;
        }
        if line.starts_with(':') {
            return; // comment / keep-alive line
        }
        if let Some(value) = line.strip_prefix("data:") {
            self.data
                .push(value.strip_prefix(' ').unwrap_or(value).to_string());
        }
        // event:/id:/retry: fields carry nothing we consume.
    }
}

/// Run one SSE subscription until it ends.
///
/// Emits `Opened` once the response headers arrive with a 2xx status,
/// then one `Result` per pushed row.
pub(crate) async fn run_sse(
    url: &str,
    events: &mpsc::Sender<LiveEvent>,
    status: &SharedStatus,
    shutdown: &CancellationToken,
) -> LiveResult<()> {
    debug!(%url, "Connecting event stream");

    // A dedicated client: the stream is long-lived, so only the connect
    // phase gets a deadline.
    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?;

    let request = client
        .get(url)
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .send();
    let response = tokio::select! {
        result = request => result?,
        () = shutdown.cancelled() => {
            debug!("Shutdown during event-stream connect");
            return Ok(());
        }
    };

    let http_status = response.status();
    if !http_status.is_success() {
        return Err(LiveError::Http {
            status: http_status.as_u16(),
        });
    }

    status.write().connected(TransportKind::EventStream);
    info!(%url, "Event stream connected");
    if events
        .send(LiveEvent::Opened {
            transport: TransportKind::EventStream,
        })
        .await
        .is_err()
    {
        warn!("Live event receiver dropped");
        return Ok(());
    }

    let mut stream = response.bytes_stream();
    let mut decoder = SseDecoder::new();

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                debug!("Shutdown signal received in event-stream loop");
                return Ok(());
            }

            chunk = stream.next() => {
                match chunk {
                    Some(Ok(bytes)) => {
                        let text = String::from_utf8_lossy(&bytes);
                        for payload in decoder.feed(&text) {
                            if let Some(row) = parse_frame(&payload) {
                                if events.send(LiveEvent::Result(Box::new(row))).await.is_err() {
                                    warn!("Live event receiver dropped");
                                    return Ok(());
                                }
                            }
                        }
                    }
                    Some(Err(e)) => {
                        warn!(?e, "Event stream read error");
                        return Err(e.into());
                    }
                    None => {
                        warn!("Event stream ended");
                        return Ok(());
                    }
                }
            }
        }
    }
}
