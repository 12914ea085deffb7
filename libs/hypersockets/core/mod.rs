//! # HyperSockets core
//!
//! - **session**: connection state machine, read loop, serialized writes, reconnection
//! - **liveness**: inbound-silence detection and heartbeat pings
//! - **connection_state**: lock-free lifecycle state
//! - **shutdown**: cooperative cancellation tokens
//! - **builder**: type-state session builder

pub mod builder;
pub mod config;
pub mod connection_state;
pub mod liveness;
pub mod session;
pub mod shutdown;

// Re-export main types
pub use builder::{states, SessionBuilder};
pub use config::SessionConfig;
pub use connection_state::{AtomicConnectionState, ConnectionState};
pub use liveness::{LivenessMonitor, LivenessTarget, LivenessVerdict};
pub use session::Session;
pub use shutdown::ShutdownToken;

// Re-export traits for convenience
pub use crate::traits::*;

/// Create a new session builder
pub fn builder() -> SessionBuilder<builder::states::NoUrl, builder::states::NoCodec, ()> {
    SessionBuilder::new()
}
