//! Common test utilities for HyperSockets integration tests
//!
//! Provides a scriptable mock WebSocket server and a plain-text codec.

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use hypersockets::{FrameCodec, HyperSocketError, Result, SessionHandler, ShutdownToken};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Notify};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// A mock WebSocket server for testing
///
/// Records every binary frame it receives and the `Authorization` header of
/// every handshake. Frames pushed with [`push`](Self::push) go to every open
/// connection. [`drop_connections`](Self::drop_connections) kills open
/// connections without a close frame, simulating a network fault.
///
/// Shutdown is sticky: a server dropped before its accept loop first runs
/// still stops listening.
pub struct MockWsServer {
    pub addr: SocketAddr,
    shutdown: ShutdownToken,
    kill: Arc<Notify>,
    outbound: broadcast::Sender<Message>,
    received: Arc<Mutex<Vec<Vec<u8>>>>,
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
    accepted: Arc<AtomicUsize>,
    hang_up: Arc<AtomicBool>,
}

impl MockWsServer {
    /// Create and start a new mock WebSocket server
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = ShutdownToken::new();
        let kill = Arc::new(Notify::new());
        let (outbound, _) = broadcast::channel(256);
        let received = Arc::new(Mutex::new(Vec::new()));
        let auth_headers = Arc::new(Mutex::new(Vec::new()));
        let accepted = Arc::new(AtomicUsize::new(0));
        let hang_up = Arc::new(AtomicBool::new(false));

        let server = Self {
            addr,
            shutdown: shutdown.clone(),
            kill: kill.clone(),
            outbound: outbound.clone(),
            received: received.clone(),
            auth_headers: auth_headers.clone(),
            accepted: accepted.clone(),
            hang_up: hang_up.clone(),
        };

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let conn = Connection {
                                    kill: kill.clone(),
                                    shutdown: shutdown.clone(),
                                    outbound: outbound.subscribe(),
                                    received: received.clone(),
                                    auth_headers: auth_headers.clone(),
                                    accepted: accepted.clone(),
                                    hang_up: hang_up.clone(),
                                };
                                tokio::spawn(conn.run(stream));
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown.cancelled() => {
                        break;
                    }
                }
            }
        });

        server
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Send a binary frame to every open connection
    pub fn push(&self, frame: impl Into<Vec<u8>>) {
        let _ = self.outbound.send(Message::Binary(frame.into()));
    }

    /// Send a text frame to every open connection
    pub fn push_text(&self, text: &str) {
        let _ = self.outbound.send(Message::Text(text.to_string()));
    }

    /// Drop every open connection without a close handshake
    pub fn drop_connections(&self) {
        self.kill.notify_waiters();
    }

    /// Drop every later connection right after its handshake completes
    pub fn hang_up_after_handshake(&self, enabled: bool) {
        self.hang_up.store(enabled, Ordering::SeqCst);
    }

    /// Binary frames received so far, decoded as UTF-8
    pub fn received_text(&self) -> Vec<String> {
        self.received
            .lock()
            .iter()
            .map(|frame| String::from_utf8_lossy(frame).into_owned())
            .collect()
    }

    /// `Authorization` header of every handshake, in order
    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.auth_headers.lock().clone()
    }

    /// Number of completed handshakes
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Connection {
    kill: Arc<Notify>,
    shutdown: ShutdownToken,
    outbound: broadcast::Receiver<Message>,
    received: Arc<Mutex<Vec<Vec<u8>>>>,
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
    accepted: Arc<AtomicUsize>,
    hang_up: Arc<AtomicBool>,
}

impl Connection {
    async fn run(mut self, stream: tokio::net::TcpStream) {
        let auth_headers = self.auth_headers.clone();
        let callback = move |request: &Request, response: Response| -> std::result::Result<Response, ErrorResponse> {
            let auth = request
                .headers()
                .get("Authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            auth_headers.lock().push(auth);
            Ok(response)
        };

        let ws_stream = match tokio_tungstenite::accept_hdr_async(stream, callback).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };
        self.accepted.fetch_add(1, Ordering::SeqCst);
        if self.hang_up.load(Ordering::SeqCst) {
            return;
        }

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Binary(data))) => self.received.lock().push(data),
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        Some(Ok(_)) => {}
                    }
                }
                out = self.outbound.recv() => {
                    match out {
                        Ok(msg) => {
                            if write.send(msg).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = self.kill.notified() => break,
                _ = self.shutdown.cancelled() => break,
            }
        }
    }
}

/// A websocket URL nothing listens on
///
/// The port was bound and released, so dials are refused.
pub fn dead_ws_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{}", addr)
}

/// UTF-8 text carried in binary frames
pub struct TextCodec;

impl FrameCodec for TextCodec {
    type Message = String;

    fn encode(&self, message: &String) -> Result<Vec<u8>> {
        Ok(message.as_bytes().to_vec())
    }

    fn decode(&self, frame: &[u8]) -> Result<String> {
        String::from_utf8(frame.to_vec()).map_err(|e| HyperSocketError::Decode(e.to_string()))
    }

    fn ping(&self) -> String {
        "ping".to_string()
    }

    fn kind(&self, _message: &String) -> &'static str {
        "text"
    }
}

/// Handler that records every message it sees
#[derive(Default)]
pub struct RecordingHandler {
    pub messages: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl SessionHandler<String> for RecordingHandler {
    async fn handle(&self, message: String) -> Result<()> {
        self.messages.lock().push(message);
        Ok(())
    }
}

/// Poll `check` until it holds or `within` elapses
pub async fn wait_until(within: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
