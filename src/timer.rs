//! Monotonic millisecond clock.
//!
//! The engine only ever asks "how many milliseconds since the epoch", so time is
//! abstracted behind the [`Clock`] trait. [`Timer`] is the real clock; tests drive the
//! loop with a hand-advanced one.

use std::time::Instant;

/// A source of monotonic milliseconds.
pub trait Clock {
    /// Milliseconds elapsed since this clock's epoch. Never decreases.
    fn now_ms(&self) -> u64;
}

/// Monotonic clock whose epoch is the moment it was started.
///
/// ```rust
/// use toybox::timer::{Clock, Timer};
///
/// let timer = Timer::start();
/// let a = timer.now_ms();
/// let b = timer.now_ms();
/// assert!(b >= a);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Timer {
    epoch: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Clock for Timer {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn timer_starts_near_zero_and_advances() {
        let timer = Timer::start();
        assert!(timer.now_ms() < 1000);
        std::thread::sleep(Duration::from_millis(15));
        assert!(timer.now_ms() >= 15);
    }
}
