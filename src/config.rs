//! Engine configuration.
//!
//! The loop has two knobs: the target frame rate and how long a single key poll may
//! block. Both are fixed once an [`Engine`](crate::engine::Engine) is built.

use std::time::Duration;

/// Default bound on a single key poll.
///
/// Small enough that frame cadence does not visibly drift, large enough that the idle
/// loop does not spin the CPU.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// Settings for an [`Engine`](crate::engine::Engine).
///
/// ```rust
/// use std::time::Duration;
/// use toybox::config::EngineConfig;
///
/// let config = EngineConfig::new(20).with_poll_timeout(Duration::from_millis(5));
/// assert_eq!(config.frame_interval_ms(), 50);
/// assert_eq!(config.poll_timeout(), Duration::from_millis(5));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    fps: u32,
    poll_timeout: Duration,
}

impl EngineConfig {
    /// Creates a config for the given frame rate. A rate of zero is treated as one.
    pub fn new(fps: u32) -> Self {
        Self {
            fps: fps.max(1),
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    /// Overrides the key poll timeout. Clamped to at least one millisecond.
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout.max(Duration::from_millis(1));
        self
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }

    /// Minimum number of milliseconds between two rendered frames.
    pub fn frame_interval_ms(&self) -> u64 {
        1000 / self.fps as u64
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(30)
    }
}
