//! Session: the connection state machine
//!
//! ```text
//!             connect()                 handshake ok
//! Disconnected ───────> Connecting ───────────────────> Connected ──mark_ready()──> Ready
//!      ▲                    │ handshake failed               │                        │
//!      └────────────────────┘                                │ fault                  │
//!      ▲                                                     ▼                        │
//!      └──────────── reconnect loop (backoff, re-dial) <─────┴────────────────────────┘
//! ```
//!
//! Each successful dial starts a connection epoch: a read loop and a
//! liveness monitor that share one cancellation token. Any path that
//! invalidates the transport cancels the epoch first, so a stale monitor
//! can never reconnect a connection that was already replaced.
//!
//! Locking:
//! - `state` is atomic and never requires a lock
//! - `transport` (RwLock) is only held to clone or swap the `Arc`
//! - the per-transport writer mutex serializes outbound frames
//! - `reconnecting` is the idempotence guard for the reconnect cycle

use crate::core::config::{SessionConfig, CLOSE_FRAME_TIMEOUT};
use crate::core::connection_state::{AtomicConnectionState, ConnectionState};
use crate::core::liveness::{LivenessMonitor, LivenessTarget};
use crate::core::shutdown::ShutdownToken;
use crate::traits::*;
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Write half of one open connection
///
/// The mutex is the write lock: whoever holds it owns the sink for the
/// whole encode-and-write of one frame.
struct Transport {
    writer: tokio::sync::Mutex<WsSink>,
}

/// Tasks bound to one open connection
struct Epoch {
    token: ShutdownToken,
    read_task: JoinHandle<()>,
    liveness_task: JoinHandle<()>,
}

impl Epoch {
    fn cancel(&self) {
        self.token.cancel();
    }

    async fn join(self) {
        self.cancel();
        let _ = self.read_task.await;
        let _ = self.liveness_task.await;
    }
}

struct Inner<C: FrameCodec> {
    config: SessionConfig,
    codec: C,
    headers: Arc<dyn HeaderProvider>,
    state: AtomicConnectionState,
    transport: RwLock<Option<Arc<Transport>>>,
    handler: RwLock<Option<Arc<dyn SessionHandler<C::Message>>>>,
    reconnected_handler: RwLock<Option<Arc<dyn ReconnectedHandler>>>,
    reconnector: Mutex<ReconnectController>,
    reconnecting: AtomicBool,
    scope: Mutex<Option<ShutdownToken>>,
    epoch: Mutex<Option<Epoch>>,
    reconnect_task: Mutex<Option<JoinHandle<()>>>,
}

/// Persistent, self-healing duplex session
///
/// Cheap to clone; all clones drive the same connection.
pub struct Session<C: FrameCodec> {
    inner: Arc<Inner<C>>,
}

impl<C: FrameCodec> Clone for Session<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: FrameCodec> Session<C> {
    pub fn new(config: SessionConfig, codec: C, headers: Arc<dyn HeaderProvider>) -> Self {
        let reconnector = ReconnectController::new(config.reconnect.clone());
        Self {
            inner: Arc::new(Inner {
                config,
                codec,
                headers,
                state: AtomicConnectionState::default(),
                transport: RwLock::new(None),
                handler: RwLock::new(None),
                reconnected_handler: RwLock::new(None),
                reconnector: Mutex::new(reconnector),
                reconnecting: AtomicBool::new(false),
                scope: Mutex::new(None),
                epoch: Mutex::new(None),
                reconnect_task: Mutex::new(None),
            }),
        }
    }

    #[inline]
    pub fn state(&self) -> ConnectionState {
        self.inner.state.get()
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.inner.state.is_connected()
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.inner.state.is_ready()
    }

    pub fn url(&self) -> &str {
        self.inner.config.url()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn codec(&self) -> &C {
        &self.inner.codec
    }

    /// Attempts made by the current reconnection cycle
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.reconnector.lock().attempts()
    }

    pub fn set_message_handler(&self, handler: Arc<dyn SessionHandler<C::Message>>) {
        *self.inner.handler.write() = Some(handler);
    }

    pub fn set_reconnected_handler(&self, handler: Arc<dyn ReconnectedHandler>) {
        *self.inner.reconnected_handler.write() = Some(handler);
    }

    pub fn clear_handlers(&self) {
        *self.inner.handler.write() = None;
        *self.inner.reconnected_handler.write() = None;
    }

    /// Promote Connected to Ready after the peer acknowledged the session
    ///
    /// Returns false (and changes nothing) from any other state.
    pub fn mark_ready(&self) -> bool {
        let promoted = self
            .inner
            .state
            .transition(ConnectionState::Connected, ConnectionState::Ready);
        if promoted {
            info!("Session ready");
        } else {
            debug!("Ignoring ready promotion from state {}", self.state());
        }
        promoted
    }

    /// Open the session
    ///
    /// Only valid from Disconnected. On success the read loop and liveness
    /// monitor run under a child of `parent`, so cancelling `parent` has
    /// the same effect on background work as [`close`](Self::close).
    pub async fn connect(&self, parent: &ShutdownToken) -> Result<()> {
        if self.reconnect_in_progress() {
            return Err(HyperSocketError::InvalidState(
                "reconnection in progress".to_string(),
            ));
        }

        if !self
            .inner
            .state
            .transition(ConnectionState::Disconnected, ConnectionState::Connecting)
        {
            return Err(HyperSocketError::InvalidState(format!(
                "cannot connect from state {}",
                self.state()
            )));
        }

        let scope = parent.child();
        if let Some(previous) = self.inner.scope.lock().replace(scope.clone()) {
            previous.cancel();
        }
        self.inner.reconnecting.store(false, Ordering::Release);
        self.inner.reconnector.lock().reset();

        self.dial(&scope, false).await
    }

    /// Encode and write one message
    ///
    /// Fails with [`HyperSocketError::NotConnected`] unless the session is
    /// Connected or Ready. A write error or deadline expiry starts a
    /// reconnection cycle and is returned to the caller.
    pub async fn send(&self, message: &C::Message) -> Result<()> {
        if !self.inner.state.is_connected() {
            return Err(HyperSocketError::NotConnected);
        }
        let transport = self
            .inner
            .transport
            .read()
            .clone()
            .ok_or(HyperSocketError::NotConnected)?;

        let frame = self.inner.codec.encode(message)?;
        let write_timeout = self.inner.config.write_timeout;

        let result = timeout(write_timeout, async {
            let mut writer = transport.writer.lock().await;
            writer.send(Message::Binary(frame)).await
        })
        .await;

        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                error!("Failed to send {}: {}", self.inner.codec.kind(message), e);
                self.trigger_reconnect();
                Err(HyperSocketError::WebSocket(e.to_string()))
            }
            Err(_) => {
                error!(
                    "Send of {} timed out after {:?}",
                    self.inner.codec.kind(message),
                    write_timeout
                );
                self.trigger_reconnect();
                Err(HyperSocketError::Timeout(format!(
                    "write exceeded {:?}",
                    write_timeout
                )))
            }
        }
    }

    /// Start a reconnection cycle unless one is already running
    pub fn trigger_reconnect(&self) {
        let scope = self.inner.scope.lock().clone();
        let Some(scope) = scope else {
            debug!("Reconnect requested on a closed session, ignoring");
            return;
        };
        if scope.is_cancelled() {
            debug!("Reconnect requested during shutdown, ignoring");
            return;
        }

        if self
            .inner
            .reconnecting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Reconnection already in progress");
            return;
        }

        let session = self.clone();
        let handle = tokio::spawn(async move {
            session.reconnect_loop(scope).await;
        });
        *self.inner.reconnect_task.lock() = Some(handle);
    }

    /// Stop all background work and release the transport
    ///
    /// Waits for the read loop, the liveness monitor and any reconnection
    /// cycle to exit, then sends a close frame best-effort. Safe from any
    /// state. Must not be awaited from inside a message handler, since the
    /// read loop is awaiting that handler.
    pub async fn close(&self) -> Result<()> {
        let scope = self.inner.scope.lock().take();
        let has_transport = self.inner.transport.read().is_some();
        if scope.is_none() && !has_transport {
            debug!("Session already closed");
            return Ok(());
        }

        info!("Closing session to {}", self.url());
        if let Some(scope) = &scope {
            scope.cancel();
        }

        let reconnect_task = self.inner.reconnect_task.lock().take();
        if let Some(task) = reconnect_task {
            let _ = task.await;
        }

        self.teardown_epoch().await;

        let transport = self.inner.transport.write().take();
        if let Some(transport) = transport {
            let frame = CloseFrame {
                code: CloseCode::Normal,
                reason: "".into(),
            };
            let result = timeout(CLOSE_FRAME_TIMEOUT, async {
                let mut writer = transport.writer.lock().await;
                writer.send(Message::Close(Some(frame))).await
            })
            .await;
            match result {
                Ok(Ok(())) => debug!("Close frame sent"),
                Ok(Err(e)) => debug!("Close frame not delivered: {}", e),
                Err(_) => debug!("Close frame timed out"),
            }
        }

        self.inner.state.set(ConnectionState::Disconnected);
        self.inner.reconnecting.store(false, Ordering::Release);
        info!("Session closed");
        Ok(())
    }

    fn reconnect_in_progress(&self) -> bool {
        self.inner
            .reconnect_task
            .lock()
            .as_ref()
            .map_or(false, |task| !task.is_finished())
    }

    async fn build_request(&self) -> Result<Request> {
        let url = self.url();
        let mut request = url.into_client_request().map_err(|e| {
            HyperSocketError::Configuration(format!("invalid url {}: {}", url, e))
        })?;

        for (key, value) in self.inner.headers.get_headers().await {
            match (
                key.parse::<http::header::HeaderName>(),
                value.parse::<http::header::HeaderValue>(),
            ) {
                (Ok(name), Ok(value)) => {
                    request.headers_mut().insert(name, value);
                }
                _ => warn!("Skipping invalid header '{}'", key),
            }
        }

        Ok(request)
    }

    /// One handshake attempt; state is Connected on success and
    /// Disconnected on failure.
    async fn dial(&self, scope: &ShutdownToken, is_reconnect: bool) -> Result<()> {
        self.inner.state.set(ConnectionState::Connecting);

        let stream = match self.handshake(scope).await {
            Ok(stream) => stream,
            Err(e) => {
                self.inner.state.set(ConnectionState::Disconnected);
                error!("Failed to connect to {}: {}", self.url(), e);
                return Err(e);
            }
        };

        let (sink, source) = stream.split();
        *self.inner.transport.write() = Some(Arc::new(Transport {
            writer: tokio::sync::Mutex::new(sink),
        }));

        // Connected must be visible before the first frame is dispatched,
        // otherwise an immediate acknowledgment could not promote to Ready.
        self.inner.state.set(ConnectionState::Connected);
        info!("Connected to {}", self.url());

        self.inner.reconnector.lock().reset();

        // Released before the epoch starts so a read loop that dies at once
        // can open the next cycle itself
        if is_reconnect {
            self.inner.reconnecting.store(false, Ordering::Release);
        }

        self.start_epoch(scope, source);

        if is_reconnect {
            let handler = self.inner.reconnected_handler.read().clone();
            if let Some(handler) = handler {
                tokio::spawn(async move {
                    handler.on_reconnected().await;
                });
            }
        }

        Ok(())
    }

    async fn handshake(&self, scope: &ShutdownToken) -> Result<WsStream> {
        let request = self.build_request().await?;
        let handshake_timeout = self.inner.config.handshake_timeout;

        debug!("Connecting to {}", self.url());
        tokio::select! {
            _ = scope.cancelled() => Err(HyperSocketError::Cancelled),
            result = timeout(handshake_timeout, connect_async(request)) => match result {
                Ok(Ok((stream, _response))) => Ok(stream),
                Ok(Err(e)) => Err(HyperSocketError::WebSocket(e.to_string())),
                Err(_) => Err(HyperSocketError::Timeout(format!(
                    "handshake exceeded {:?}",
                    handshake_timeout
                ))),
            },
        }
    }

    fn start_epoch(&self, scope: &ShutdownToken, source: WsSource) {
        let token = scope.child();
        let monitor = Arc::new(LivenessMonitor::new(self.inner.config.read_timeout));

        let read_task = {
            let session = self.clone();
            let token = token.clone();
            let monitor = Arc::clone(&monitor);
            tokio::spawn(async move {
                session.read_loop(source, &monitor, &token).await;
            })
        };

        let liveness_task = {
            let session = self.clone();
            let token = token.clone();
            let interval = self.inner.config.heartbeat_interval;
            tokio::spawn(async move {
                monitor.run(interval, &session, &token).await;
            })
        };

        let stale = self.inner.epoch.lock().replace(Epoch {
            token,
            read_task,
            liveness_task,
        });
        if let Some(stale) = stale {
            warn!("Replacing a connection epoch that was never torn down");
            stale.cancel();
        }
    }

    async fn teardown_epoch(&self) {
        let epoch = self.inner.epoch.lock().take();
        if let Some(epoch) = epoch {
            epoch.join().await;
        }
    }

    /// Drop the current transport, closing its sink best-effort
    async fn release_transport(&self) {
        let transport = self.inner.transport.write().take();
        if let Some(transport) = transport {
            let _ = timeout(CLOSE_FRAME_TIMEOUT, async {
                let mut writer = transport.writer.lock().await;
                writer.close().await
            })
            .await;
        }
    }

    async fn read_loop(&self, mut source: WsSource, monitor: &LivenessMonitor, token: &ShutdownToken) {
        let read_timeout = self.inner.config.read_timeout;
        debug!("Read loop started");

        loop {
            let next = tokio::select! {
                _ = token.cancelled() => break,
                next = timeout(read_timeout, source.next()) => next,
            };

            let frame = match next {
                Ok(Some(Ok(frame))) => frame,
                Ok(Some(Err(e))) => {
                    error!("WebSocket read error: {}", e);
                    self.trigger_reconnect();
                    break;
                }
                Ok(None) => {
                    warn!("WebSocket stream closed");
                    self.trigger_reconnect();
                    break;
                }
                Err(_) => {
                    warn!("No frame received within {:?}", read_timeout);
                    self.trigger_reconnect();
                    break;
                }
            };

            let data = match frame {
                Message::Binary(data) => data,
                Message::Text(_) => {
                    warn!("Ignoring non-binary frame");
                    continue;
                }
                Message::Close(frame) => {
                    info!("Server closed connection: {:?}", frame);
                    self.trigger_reconnect();
                    break;
                }
                // Control frames are answered by the transport itself
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            };

            let message = match self.inner.codec.decode(&data) {
                Ok(message) => message,
                Err(e) => {
                    warn!("Failed to decode frame ({} bytes): {}", data.len(), e);
                    continue;
                }
            };

            monitor.on_activity();

            let handler = self.inner.handler.read().clone();
            match handler {
                Some(handler) => {
                    let kind = self.inner.codec.kind(&message);
                    if let Err(e) = handler.handle(message).await {
                        error!("Handler failed for {}: {}", kind, e);
                    }
                }
                None => debug!("No handler installed, dropping {}", self.inner.codec.kind(&message)),
            }
        }

        debug!("Read loop exiting");
    }

    async fn reconnect_loop(&self, scope: ShutdownToken) {
        info!("Connection lost, starting reconnection to {}", self.url());

        self.teardown_epoch().await;
        self.release_transport().await;
        self.inner.state.set(ConnectionState::Disconnected);

        loop {
            if scope.is_cancelled() {
                debug!("Reconnection cancelled");
                return;
            }

            let (delay, attempt) = {
                let mut reconnector = self.inner.reconnector.lock();
                if !reconnector.should_continue() {
                    error!(
                        "Max reconnect attempts reached ({}), giving up",
                        reconnector.attempts()
                    );
                    return;
                }
                let delay = reconnector.next_interval();
                (delay, reconnector.attempts())
            };

            info!("Reconnecting in {:?} (attempt {})", delay, attempt);
            tokio::select! {
                _ = scope.cancelled() => {
                    debug!("Reconnection cancelled during backoff");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            match self.dial(&scope, true).await {
                Ok(()) => {
                    info!("Reconnected after {} attempt(s)", attempt);
                    return;
                }
                Err(e) => warn!("Reconnect attempt {} failed: {}", attempt, e),
            }
        }
    }
}

#[async_trait]
impl<C: FrameCodec> LivenessTarget for Session<C> {
    async fn send_ping(&self) -> Result<()> {
        let ping = self.inner.codec.ping();
        self.send(&ping).await
    }

    fn trigger_reconnect(&self) {
        Session::trigger_reconnect(self);
    }
}
