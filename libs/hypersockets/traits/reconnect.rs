use std::time::Duration;

/// Default growth factor between consecutive reconnect intervals
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Default ceiling, expressed as a multiple of the initial interval
pub const DEFAULT_CEILING_FACTOR: u32 = 32;

/// Reconnection schedule parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectConfig {
    /// Delay before the first reconnect attempt
    pub initial_interval: Duration,
    /// Upper bound for any single delay
    pub max_interval: Duration,
    /// Growth factor applied after every attempt
    pub multiplier: f64,
    /// Attempt budget (0 = unlimited)
    pub max_attempts: u32,
}

impl ReconnectConfig {
    /// Exponential schedule with the default multiplier and a ceiling of
    /// 32x the initial interval
    pub fn new(initial_interval: Duration, max_attempts: u32) -> Self {
        Self {
            initial_interval,
            max_interval: initial_interval * DEFAULT_CEILING_FACTOR,
            multiplier: DEFAULT_MULTIPLIER,
            max_attempts,
        }
    }

    pub fn with_max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = max_interval;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 0)
    }
}

/// Exponential backoff controller
///
/// Pure scheduling state: no clocks, no jitter. The same configuration and
/// call sequence always yields the same intervals.
///
/// The n-th call to [`next_interval`](Self::next_interval) returns
/// `min(initial * multiplier^(n-1), max_interval)`.
#[derive(Debug, Clone)]
pub struct ReconnectController {
    config: ReconnectConfig,
    current: Duration,
    attempts: u32,
}

impl ReconnectController {
    pub fn new(config: ReconnectConfig) -> Self {
        let current = config.initial_interval.min(config.max_interval);
        Self {
            config,
            current,
            attempts: 0,
        }
    }

    /// True while the attempt budget allows another try
    pub fn should_continue(&self) -> bool {
        self.config.max_attempts == 0 || self.attempts < self.config.max_attempts
    }

    /// Return the current interval, then grow it and count the attempt
    pub fn next_interval(&mut self) -> Duration {
        let interval = self.current;
        self.attempts = self.attempts.saturating_add(1);

        let grown = interval.mul_f64(self.config.multiplier.max(1.0));
        self.current = grown.min(self.config.max_interval);

        interval
    }

    /// Attempts made since construction or the last reset
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Interval the next call to `next_interval` will return
    pub fn current_interval(&self) -> Duration {
        self.current
    }

    pub fn config(&self) -> &ReconnectConfig {
        &self.config
    }

    /// Forget all attempts and restore the initial interval
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.current = self.config.initial_interval.min(self.config.max_interval);
    }
}
