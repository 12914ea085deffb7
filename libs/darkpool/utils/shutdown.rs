//! Graceful shutdown management

use hypersockets::ShutdownToken;
use tokio::signal;
use tracing::info;

/// Owns the root cancellation token for the process
pub struct ShutdownManager {
    token: ShutdownToken,
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self {
            token: ShutdownToken::new(),
        }
    }

    /// Spawn a Ctrl+C (and SIGTERM on unix) handler that cancels the root token
    pub fn spawn_signal_handler(&self) {
        let token = self.token.clone();
        tokio::spawn(async move {
            let signal_name = wait_for_signal().await;
            info!("Received shutdown signal ({})", signal_name);
            info!("Shutting down gracefully...");
            token.cancel();
        });
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn token(&self) -> ShutdownToken {
        self.token.clone()
    }

    pub fn shutdown(&self) {
        self.token.cancel();
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{signal as unix_signal, SignalKind};

    match unix_signal(SignalKind::terminate()) {
        Ok(mut term) => tokio::select! {
            _ = signal::ctrl_c() => "Ctrl+C",
            _ = term.recv() => "SIGTERM",
        },
        Err(_) => {
            let _ = signal::ctrl_c().await;
            "Ctrl+C"
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    let _ = signal::ctrl_c().await;
    "Ctrl+C"
}
