//! Cooperative cancellation
//!
//! A [`ShutdownToken`] is a cloneable flag backed by a `tokio::sync::watch`
//! channel. Child tokens are cancelled together with their parent but can
//! also be cancelled on their own, which is how a session scopes its loops
//! to both `close()` and the application-wide shutdown.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct ShutdownToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    /// Cancel this token and every child derived from it
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the token is cancelled
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // An Err means every sender is gone, which can only happen once
        // cancellation can no longer be observed.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Token cancelled when either it or `self` is cancelled
    pub fn child(&self) -> ShutdownToken {
        let child = ShutdownToken::new();
        if self.is_cancelled() {
            child.cancel();
            return child;
        }

        let parent = self.clone();
        let forward = child.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = parent.cancelled() => forward.cancel(),
                _ = forward.cancelled() => {}
            }
        });
        child
    }
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}
