//! Liveness monitor
//!
//! Tracks the time since the last inbound frame and forces a reconnect when
//! the peer goes quiet for longer than the read timeout.
//!
//! ```text
//! read loop ──on_activity()──> last_activity_ms (atomic store)
//!                                   │
//! ticker (every heartbeat) ── evaluate(now)
//!        ├─ Healthy        -> send ping
//!        ├─ TimedOut       -> trigger_reconnect (once per episode)
//!        └─ StillTimedOut  -> nothing
//! ```
//!
//! Timestamps are milliseconds since an internal epoch so the read loop
//! only ever performs a single atomic store.

use crate::core::shutdown::ShutdownToken;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// What the monitor drives when a tick fires
#[async_trait]
pub trait LivenessTarget: Send + Sync + 'static {
    /// Send a liveness ping to the peer
    async fn send_ping(&self) -> crate::Result<()>;

    /// Start a reconnection cycle (idempotent on the target side)
    fn trigger_reconnect(&self);
}

/// Outcome of one liveness evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessVerdict {
    /// Activity seen within the read timeout
    Healthy,
    /// First tick of a timeout episode; the caller should reconnect
    TimedOut,
    /// Timeout already reported for this episode
    StillTimedOut,
}

pub struct LivenessMonitor {
    epoch: Instant,
    last_activity_ms: AtomicU64,
    timeout_detected: AtomicBool,
    read_timeout: Duration,
}

impl LivenessMonitor {
    /// Fresh monitor; creation counts as activity
    pub fn new(read_timeout: Duration) -> Self {
        Self {
            epoch: Instant::now(),
            last_activity_ms: AtomicU64::new(0),
            timeout_detected: AtomicBool::new(false),
            read_timeout,
        }
    }

    /// Record inbound traffic
    #[inline]
    pub fn on_activity(&self) {
        self.on_activity_at(Instant::now());
    }

    pub fn on_activity_at(&self, now: Instant) {
        let ms = now.saturating_duration_since(self.epoch).as_millis() as u64;
        self.last_activity_ms.fetch_max(ms, Ordering::AcqRel);
    }

    /// Time between the last recorded activity and `now`
    pub fn idle_for(&self, now: Instant) -> Duration {
        let now_ms = now.saturating_duration_since(self.epoch).as_millis() as u64;
        let last_ms = self.last_activity_ms.load(Ordering::Acquire);
        Duration::from_millis(now_ms.saturating_sub(last_ms))
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Classify the connection at `now`
    ///
    /// Only the first evaluation of a sustained timeout returns `TimedOut`;
    /// the episode ends as soon as an evaluation sees fresh activity.
    pub fn evaluate(&self, now: Instant) -> LivenessVerdict {
        if self.idle_for(now) > self.read_timeout {
            if self.timeout_detected.swap(true, Ordering::AcqRel) {
                LivenessVerdict::StillTimedOut
            } else {
                LivenessVerdict::TimedOut
            }
        } else {
            self.timeout_detected.store(false, Ordering::Release);
            LivenessVerdict::Healthy
        }
    }

    /// Tick until `token` is cancelled
    pub async fn run<T: LivenessTarget>(
        &self,
        interval: Duration,
        target: &T,
        token: &ShutdownToken,
    ) {
        let mut ticker = tokio::time::interval(interval);
        // Skip the first immediate tick - wait for the first interval
        ticker.tick().await;
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        debug!("Liveness monitor started with interval: {:?}", interval);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.evaluate(Instant::now()) {
                LivenessVerdict::Healthy => {
                    if let Err(e) = target.send_ping().await {
                        debug!("Liveness ping failed: {}", e);
                    }
                }
                LivenessVerdict::TimedOut => {
                    warn!(
                        "No inbound traffic for {:?} (read timeout {:?}), reconnecting",
                        self.idle_for(Instant::now()),
                        self.read_timeout
                    );
                    target.trigger_reconnect();
                }
                LivenessVerdict::StillTimedOut => {}
            }
        }

        debug!("Liveness monitor exiting");
    }
}
