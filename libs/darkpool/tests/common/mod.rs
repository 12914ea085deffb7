//! Common test utilities for market maker integration tests
//!
//! Provides a mock venue that speaks envelopes and a canned configuration.

#![allow(dead_code)]

use darkpool::config::Config;
use darkpool::protocol::{Envelope, EnvelopeCodec, MessageType};
use futures::{SinkExt, StreamExt};
use hypersockets::{FrameCodec, ShutdownToken};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
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

/// Private key 1; address 0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf
pub const TEST_KEY: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";

pub const BSC_POOL: &str = "0x28D3a265f6d40867986004029ee91F4C9532fCC5";
pub const WBNB: &str = "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c";
pub const USDT: &str = "0x55d398326f99059fF775485246999027B3197955";
pub const RECIPIENT: &str = "0x1234567890123456789012345678901234567890";

/// A BSC-only configuration pointed at `server_url` with fast timers
pub fn test_config(server_url: &str) -> Config {
    let yaml = format!(
        r#"
app:
  name: "test-mm"
  log_level: "debug"
signer:
  private_key: "{key}"
websocket:
  server_url: "{url}"
  api_token: "test-token"
  reconnect_interval: 50ms
  heartbeat_interval: 5s
  read_timeout: 10s
  write_timeout: 2s
  handshake_timeout: 2s
eip712_domains:
  - chain_id: 56
    name: "DarkPool Pool"
    version: "1"
    verifying_contract: "{pool}"
quote:
  valid_duration: 30s
depth:
  enabled: true
  push_interval: 100ms
pairs:
  - chain_id: 56
    pair_id: "WBNB-USDT"
    pool_address: "{pool}"
    base_token: "{wbnb}"
    quote_token: "{usdt}"
    base_token_decimals: 18
    quote_token_decimals: 18
    fee_rate: 30
"#,
        key = TEST_KEY,
        url = server_url,
        pool = BSC_POOL,
        wbnb = WBNB,
        usdt = USDT,
    );
    let config = Config::from_yaml_str(&yaml).unwrap();
    config.validate().unwrap();
    config
}

/// A mock venue
///
/// Decodes every binary frame it receives as an envelope and records the
/// `Authorization` header of every handshake. Envelopes pushed with
/// [`push`](Self::push) go to every open connection. Dropping the venue
/// stops it even if its accept loop has not run yet.
pub struct MockVenue {
    pub addr: SocketAddr,
    shutdown: ShutdownToken,
    outbound: broadcast::Sender<Message>,
    received: Arc<Mutex<Vec<Envelope>>>,
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
    accepted: Arc<AtomicUsize>,
}

impl MockVenue {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = ShutdownToken::new();
        let (outbound, _) = broadcast::channel(256);
        let received = Arc::new(Mutex::new(Vec::new()));
        let auth_headers = Arc::new(Mutex::new(Vec::new()));
        let accepted = Arc::new(AtomicUsize::new(0));

        let venue = Self {
            addr,
            shutdown: shutdown.clone(),
            outbound: outbound.clone(),
            received: received.clone(),
            auth_headers: auth_headers.clone(),
            accepted: accepted.clone(),
        };

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let conn = Connection {
                                    shutdown: shutdown.clone(),
                                    outbound: outbound.subscribe(),
                                    received: received.clone(),
                                    auth_headers: auth_headers.clone(),
                                    accepted: accepted.clone(),
                                };
                                tokio::spawn(conn.run(stream));
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown.cancelled() => break,
                }
            }
        });

        venue
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn push(&self, envelope: &Envelope) {
        let frame = EnvelopeCodec.encode(envelope).unwrap();
        let _ = self.outbound.send(Message::Binary(frame));
    }

    pub fn received(&self) -> Vec<Envelope> {
        self.received.lock().clone()
    }

    pub fn received_of(&self, kind: MessageType) -> Vec<Envelope> {
        self.received
            .lock()
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.auth_headers.lock().clone()
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for MockVenue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Connection {
    shutdown: ShutdownToken,
    outbound: broadcast::Receiver<Message>,
    received: Arc<Mutex<Vec<Envelope>>>,
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
    accepted: Arc<AtomicUsize>,
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

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Binary(data))) => match EnvelopeCodec.decode(&data) {
                            Ok(envelope) => self.received.lock().push(envelope),
                            Err(e) => eprintln!("Undecodable frame: {}", e),
                        },
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
                _ = self.shutdown.cancelled() => break,
            }
        }
    }
}

/// A websocket URL nothing listens on
pub fn dead_ws_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{}/ws", addr)
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
