//! Mock validation service for container tests.
//!
//! A small hand-rolled HTTP/1.1 server with fixed routes:
//! - `GET /results` — one canned row; `q=slow` delays 500ms and returns
//!   a stale marker row, `q=fail` answers 500.
//! - `GET /admin/status`, `GET /admin/stats` — 200 with the token
//!   `good`, 403 otherwise.
//! - `GET /stream` — `text/event-stream` body replaying the configured
//!   events, then held open with keep-alive comments.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};

pub const GOOD_TOKEN: &str = "good";

const RESULT_ROW: &str = r#"{"id":"1","url":"https://a.com/login","login":"u","status":"valid","created_at":"2024-01-01T00:00:00Z","domain":"a.com"}"#;

const STALE_ROW: &str = r#"{"id":"stale","url":"https://old.com/login","login":"u","status":"error","created_at":"2023-01-01T00:00:00Z","domain":"old.com"}"#;

const ADMIN_STATUS_BODY: &str = r#"{"ok":true,"workers_total":8,"workers_alive":7,"paused":false,"running":true,"target":8,"accept_uploads":true,"queue_size":42}"#;

const STATS_BODY: &str = r#"{"ok":true,"window_minutes":15,"total":5,"by_status":{"valid":2,"invalid":3},"avg_latency_ms":100.0,"p50_latency_ms":90.0,"p75_latency_ms":120.0,"p90_latency_ms":150.0,"p99_latency_ms":200.0,"span":{"from":"2024-01-01T00:00:00Z","to":"2024-01-01T00:15:00Z"},"rate_per_min":0.33,"top_error_domains":[{"domain":"a.com","count":3}],"queue":7,"series":{"points":[1,2],"errors":[0,1],"valid":[1,1],"invalid":[0,1],"captcha":[0,0],"mfa":[0,0]},"now":"2024-01-01T00:15:00Z"}"#;

/// Mock HTTP API server.
pub struct MockApiServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockApiServer {
    /// Start on an available port. `stream_events` is replayed to each
    /// `/stream` subscriber as one `data:` record per event.
    pub async fn start(stream_events: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let requests_clone = requests.clone();
        let stream_events = Arc::new(stream_events);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        let requests = requests_clone.clone();
                        let events = stream_events.clone();
                        tokio::spawn(handle_connection(stream, requests, events));
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            requests,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request heads (request line + headers) seen so far.
    pub async fn request_heads(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    requests: Arc<Mutex<Vec<String>>>,
    events: Arc<Vec<String>>,
) {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte).await {
            Ok(0) | Err(_) => return,
            Ok(_) => head.push(byte[0]),
        }
    }
    let head = String::from_utf8_lossy(&head).to_string();

    {
        let mut log = requests.lock().await;
        log.push(head.clone());
    }

    let request_line = head.lines().next().unwrap_or_default().to_string();
    let authorized = head
        .to_ascii_lowercase()
        .contains(&format!("x-admin-token: {GOOD_TOKEN}"));

    if request_line.contains("/stream") {
        serve_stream(stream, &events).await;
        return;
    }

    let response = if request_line.contains("/results") {
        if request_line.contains("q=fail") {
            http_response("500 Internal Server Error", "text/plain", "boom")
        } else if request_line.contains("q=slow") {
            tokio::time::sleep(Duration::from_millis(500)).await;
            http_response("200 OK", "application/json", &format!("[{STALE_ROW}]"))
        } else {
            http_response("200 OK", "application/json", &format!("[{RESULT_ROW}]"))
        }
    } else if request_line.contains("/admin/status") {
        if authorized {
            http_response("200 OK", "application/json", ADMIN_STATUS_BODY)
        } else {
            http_response("403 Forbidden", "text/plain", "forbidden")
        }
    } else if request_line.contains("/admin/stats") {
        if authorized {
            http_response("200 OK", "application/json", STATS_BODY)
        } else {
            http_response("403 Forbidden", "text/plain", "forbidden")
        }
    } else {
        http_response("404 Not Found", "text/plain", "not found")
    };

    let _ = stream.write_all(response.as_bytes()).await;
}

async fn serve_stream(mut stream: TcpStream, events: &[String]) {
    let header =
        "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ncache-control: no-cache\r\n\r\n";
    if stream.write_all(header.as_bytes()).await.is_err() {
        return;
    }

    for event in events {
        let record = format!("data: {event}\n\n");
        if stream.write_all(record.as_bytes()).await.is_err() {
            return;
        }
    }
    let _ = stream.flush().await;

    loop {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if stream.write_all(b": keep-alive\n\n").await.is_err() {
            return;
        }
    }
}

fn http_response(status: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    )
}
