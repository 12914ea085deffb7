//! Session callbacks
//!
//! # Ordering Guarantees
//!
//! The read loop awaits [`SessionHandler::handle`] inline, so within one
//! connection epoch frames reach the handler strictly in arrival order and
//! each one is processed to completion before the next is dispatched. A slow
//! handler delays the frames behind it.

use crate::Result;
use async_trait::async_trait;
use std::fmt::Debug;

/// Receives every successfully decoded inbound message
///
/// # Example
///
/// ```ignore
/// struct Printer;
///
/// #[async_trait]
/// impl SessionHandler<Envelope> for Printer {
///     async fn handle(&self, message: Envelope) -> Result<()> {
///         tracing::info!("Received {:?}", message);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait SessionHandler<M>: Send + Sync + 'static
where
    M: Send + Debug + 'static,
{
    /// Handle one inbound message
    ///
    /// # Errors
    /// Errors are logged by the read loop, which then continues with the
    /// next frame.
    async fn handle(&self, message: M) -> Result<()>;
}

/// Notified after a reconnect (never after the first connect) succeeds
///
/// Runs on its own task; the reconnect routine does not wait for it.
#[async_trait]
pub trait ReconnectedHandler: Send + Sync + 'static {
    async fn on_reconnected(&self);
}
