use crate::traits::ReconnectConfig;
use std::time::Duration;

/// Default interval between liveness ticks
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
/// Default maximum silence before the peer is presumed dead
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(90);
/// Default deadline for one outbound frame
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);
/// Default deadline for the opening handshake
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
/// Deadline for the best-effort close frame
pub const CLOSE_FRAME_TIMEOUT: Duration = Duration::from_secs(1);

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// WebSocket URL (wss:// or ws://)
    pub url: String,

    /// Backoff schedule used after a fault
    pub reconnect: ReconnectConfig,

    /// Liveness tick period; a ping is sent on every healthy tick
    pub heartbeat_interval: Duration,

    /// Rolling per-frame read deadline, also the liveness timeout
    pub read_timeout: Duration,

    /// Deadline for a single send, lock acquisition included
    pub write_timeout: Duration,

    /// Deadline for the opening handshake
    pub handshake_timeout: Duration,
}

impl SessionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect: ReconnectConfig::default(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}
