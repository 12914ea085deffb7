//! # HyperSockets
//!
//! A resilient, authenticated WebSocket session layer.
//!
//! ## Features
//!
//! - **Explicit state machine**: Disconnected -> Connecting -> Connected -> Ready
//! - **Self-healing**: deterministic exponential backoff with an attempt budget
//! - **Liveness**: inbound-silence detection with one reconnect per timeout episode
//! - **Serialized writes**: per-transport write lock with per-call deadlines
//! - **Pluggable framing**: any [`FrameCodec`] over binary frames

pub mod traits;
pub mod core;

// Re-export all traits
pub use traits::*;

// Re-export core session functionality
pub use self::core::{
    builder, config, connection_state, liveness, session, shutdown,
    builder::{states, SessionBuilder},
    config::SessionConfig,
    connection_state::{AtomicConnectionState, ConnectionState},
    liveness::{LivenessMonitor, LivenessTarget, LivenessVerdict},
    session::Session,
    shutdown::ShutdownToken,
};

/// Type alias for Result with HyperSocketError
pub type Result<T> = std::result::Result<T, traits::HyperSocketError>;
