pub mod states;

use crate::core::config::SessionConfig;
use crate::core::session::Session;
use crate::traits::*;
use states::*;
use std::sync::Arc;
use std::time::Duration;

/// Type-state builder for [`Session`]
///
/// URL and codec are required and enforced at compile time; everything
/// else falls back to the [`SessionConfig`] defaults.
///
/// ```ignore
/// let session = hypersockets::builder()
///     .url("wss://venue.example/ws")
///     .codec(ProtoCodec)
///     .headers(BearerToken::new(token))
///     .heartbeat_interval(Duration::from_secs(30))
///     .read_timeout(Duration::from_secs(90))
///     .reconnect(ReconnectConfig::new(Duration::from_secs(5), 0))
///     .build();
/// ```
pub struct SessionBuilder<U, K, C>
where
    U: UrlState,
    K: CodecState,
{
    _state: TypeState<U, K>,
    config: SessionConfig,
    codec: Option<C>,
    headers: Option<Arc<dyn HeaderProvider>>,
}

impl SessionBuilder<NoUrl, NoCodec, ()> {
    pub fn new() -> Self {
        Self {
            _state: TypeState::new(),
            config: SessionConfig::new(String::new()),
            codec: None,
            headers: None,
        }
    }
}

impl Default for SessionBuilder<NoUrl, NoCodec, ()> {
    fn default() -> Self {
        Self::new()
    }
}

// URL setting
impl<K, C> SessionBuilder<NoUrl, K, C>
where
    K: CodecState,
{
    pub fn url(mut self, url: impl Into<String>) -> SessionBuilder<HasUrl, K, C> {
        self.config.url = url.into();
        SessionBuilder {
            _state: TypeState::new(),
            config: self.config,
            codec: self.codec,
            headers: self.headers,
        }
    }
}

// Codec setting
impl<U> SessionBuilder<U, NoCodec, ()>
where
    U: UrlState,
{
    pub fn codec<C: FrameCodec>(self, codec: C) -> SessionBuilder<U, HasCodec, C> {
        SessionBuilder {
            _state: TypeState::new(),
            config: self.config,
            codec: Some(codec),
            headers: self.headers,
        }
    }
}

// Optional settings, available in any state
impl<U, K, C> SessionBuilder<U, K, C>
where
    U: UrlState,
    K: CodecState,
{
    pub fn headers(mut self, headers: impl HeaderProvider + 'static) -> Self {
        self.headers = Some(Arc::new(headers));
        self
    }

    pub fn reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.config.reconnect = reconnect;
        self
    }

    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.config.heartbeat_interval = interval;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = timeout;
        self
    }

    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }
}

impl<C: FrameCodec> SessionBuilder<HasUrl, HasCodec, C> {
    /// Build the session (still Disconnected)
    pub fn build(self) -> Result<Session<C>> {
        let codec = self
            .codec
            .ok_or_else(|| HyperSocketError::Configuration("codec not set".to_string()))?;

        if self.config.heartbeat_interval.is_zero() {
            return Err(HyperSocketError::Configuration(
                "heartbeat interval must be positive".to_string(),
            ));
        }
        if self.config.read_timeout.is_zero() || self.config.write_timeout.is_zero() {
            return Err(HyperSocketError::Configuration(
                "read and write timeouts must be positive".to_string(),
            ));
        }

        let headers = self.headers.unwrap_or_else(|| Arc::new(NoHeaders));
        Ok(Session::new(self.config, codec, headers))
    }
}
