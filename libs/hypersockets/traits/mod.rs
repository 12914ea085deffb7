//! # HyperSockets Traits
//!
//! Seams between the session layer and the application:
//!
//! - **FrameCodec**: typed message <-> binary frame
//! - **SessionHandler / ReconnectedHandler**: inbound dispatch and reconnect notification
//! - **HeaderProvider**: handshake headers (bearer credential)
//! - **ReconnectController**: deterministic exponential backoff

pub mod codec;
pub mod error;
pub mod handler;
pub mod headers;
pub mod reconnect;

// Re-export commonly used types
pub use codec::FrameCodec;
pub use error::{HyperSocketError, Result};
pub use handler::{ReconnectedHandler, SessionHandler};
pub use headers::{BearerToken, HeaderProvider, Headers, NoHeaders};
pub use reconnect::{ReconnectConfig, ReconnectController};
