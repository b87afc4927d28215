//! Mock push servers for transport tests.
//!
//! `MockPushServer` speaks WebSocket on `/ws`; `MockStreamServer` speaks
//! HTTP with a `text/event-stream` body on `/stream` and rejects `/ws`
//! upgrades with a 404 so the auto-mode fallback path can be exercised
//! against a single base URL.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// A mock WebSocket push server.
pub struct MockPushServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    connections: Arc<Mutex<u32>>,
    open_connections: Arc<Mutex<u32>>,
}

impl MockPushServer {
    /// Start on an available port. Each accepted client is sent `frames`
    /// in order, then the connection is held open.
    pub async fn start(frames: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        let open_connections: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let connections_clone = connections.clone();
        let open_clone = open_connections.clone();
        let frames = Arc::new(frames);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        let connections = connections_clone.clone();
                        let open = open_clone.clone();
                        let frames = frames.clone();
                        tokio::spawn(handle_ws_connection(stream, connections, open, frames));
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
            connections,
            open_connections,
        }
    }

    /// HTTP base URL; the client derives `ws://.../ws` from it.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Total connections accepted since start.
    pub async fn connection_count(&self) -> u32 {
        *self.connections.lock().await
    }

    /// Connections currently open.
    pub async fn open_count(&self) -> u32 {
        *self.open_connections.lock().await
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_ws_connection(
    stream: TcpStream,
    connections: Arc<Mutex<u32>>,
    open: Arc<Mutex<u32>>,
    frames: Arc<Vec<String>>,
) {
    {
        let mut count = connections.lock().await;
        *count += 1;
    }

    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {e}");
            return;
        }
    };

    {
        let mut count = open.lock().await;
        *count += 1;
    }

    let (mut write, mut read) = ws_stream.split();

    for frame in frames.iter() {
        if write.send(Message::Text(frame.clone())).await.is_err() {
            break;
        }
    }

    // Hold the connection until the client goes away.
    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Ping(data)) => {
                let _ = write.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) | Err(_) => break,
            _ => {}
        }
    }

    {
        let mut count = open.lock().await;
        *count -= 1;
    }
}

/// A mock HTTP server: `/stream` answers with an event-stream body,
/// `/ws` answers 404 (so WebSocket handshakes fail before open).
pub struct MockStreamServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    stream_connections: Arc<Mutex<u32>>,
}

impl MockStreamServer {
    /// Start on an available port. Each `/stream` client receives one
    /// `data:` record per event, then the connection is held open.
    pub async fn start(events: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let stream_connections: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let connections_clone = stream_connections.clone();
        let events = Arc::new(events);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        let connections = connections_clone.clone();
                        let events = events.clone();
                        tokio::spawn(handle_http_connection(stream, connections, events));
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
            stream_connections,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// `/stream` subscriptions accepted since start.
    pub async fn stream_connection_count(&self) -> u32 {
        *self.stream_connections.lock().await
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_http_connection(
    mut stream: TcpStream,
    connections: Arc<Mutex<u32>>,
    events: Arc<Vec<String>>,
) {
    // Read the request head.
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte).await {
            Ok(0) | Err(_) => return,
            Ok(_) => head.push(byte[0]),
        }
    }
    let head = String::from_utf8_lossy(&head);

    if !head.starts_with("GET /stream") {
        let _ = stream
            .write_all(b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
            .await;
        return;
    }

    {
        let mut count = connections.lock().await;
        *count += 1;
    }

    let response = "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ncache-control: no-cache\r\n\r\n";
    if stream.write_all(response.as_bytes()).await.is_err() {
        return;
    }

    for event in events.iter() {
        let record = format!("data: {event}\n\n");
        if stream.write_all(record.as_bytes()).await.is_err() {
            return;
        }
    }
    let _ = stream.flush().await;

    // Keep the stream alive with comment lines until the client hangs up.
    loop {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if stream.write_all(b": keep-alive\n\n").await.is_err() {
            return;
        }
    }
}
