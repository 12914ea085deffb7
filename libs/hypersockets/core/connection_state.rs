use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Session lifecycle state
///
/// `Disconnected` is both the initial state and the state after `close()`.
/// `Ready` is only ever entered through an explicit call after the peer has
/// acknowledged the connection.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    Ready = 3,
}

impl ConnectionState {
    fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Disconnected),
            1 => Some(Self::Connecting),
            2 => Some(Self::Connected),
            3 => Some(Self::Ready),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Connected => "Connected",
            ConnectionState::Ready => "Ready",
        }
    }

    /// Label for a raw discriminant, `"Unknown"` when out of range
    pub fn label(raw: u8) -> &'static str {
        Self::from_u8(raw).map_or("Unknown", |state| state.as_str())
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free connection state cell
///
/// Polled before every depth push and on every send, so it never sits
/// behind the transport lock.
#[derive(Debug)]
pub struct AtomicConnectionState {
    state: AtomicU8,
}

impl AtomicConnectionState {
    pub fn new(initial: ConnectionState) -> Self {
        Self {
            state: AtomicU8::new(initial as u8),
        }
    }

    #[inline]
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
            .unwrap_or(ConnectionState::Disconnected)
    }

    #[inline]
    pub fn set(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Compare-and-swap; true when the state was `from` and is now `to`
    #[inline]
    pub fn transition(&self, from: ConnectionState, to: ConnectionState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Transport open (Connected or Ready)
    #[inline]
    pub fn is_connected(&self) -> bool {
        matches!(self.get(), ConnectionState::Connected | ConnectionState::Ready)
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.get() == ConnectionState::Ready
    }
}

impl Default for AtomicConnectionState {
    fn default() -> Self {
        Self::new(ConnectionState::Disconnected)
    }
}
