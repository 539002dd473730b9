//! Debounce timer with an explicit clock.
//!
//! A debounce delays an action until a quiet period has elapsed; every
//! triggering event restarts the window, and only a window that survives
//! uninterrupted fires. The current time is passed into every method so the
//! timer is deterministic under test: no sleeping, no hidden clock.

use std::time::{Duration, Instant};

/// A restartable single-shot timer.
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    delay: Duration,
    due: Option<Instant>,
}

impl DebounceTimer {
    /// Create a timer with the given quiet-window length.
    pub fn new(delay: Duration) -> Self {
        Self { delay, due: None }
    }

    /// The configured quiet-window length.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Start (or restart) the window as of `now`.
    pub fn arm(&mut self, now: Instant) {
        self.due = Some(now + self.delay);
    }

    /// Cancel a pending window.
    pub fn cancel(&mut self) {
        self.due = None;
    }

    /// Returns `true` if a window is pending.
    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    /// When the pending window elapses, if armed.
    pub fn due(&self) -> Option<Instant> {
        self.due
    }

    /// Fire if the window has elapsed as of `now`.
    ///
    /// Returns `true` at most once per armed window; firing disarms the timer.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_only_after_quiet_window() {
        let start = Instant::now();
        let mut timer = DebounceTimer::new(Duration::from_millis(100));

        timer.arm(start);
        assert!(!timer.fire(start + Duration::from_millis(50)));
        assert!(timer.fire(start + Duration::from_millis(100)));
        // Firing disarms.
        assert!(!timer.fire(start + Duration::from_millis(200)));
    }

    #[test]
    fn test_rearm_restarts_window() {
        let start = Instant::now();
        let mut timer = DebounceTimer::new(Duration::from_millis(100));

        timer.arm(start);
        timer.arm(start + Duration::from_millis(90));
        assert!(!timer.fire(start + Duration::from_millis(150)));
        assert!(timer.fire(start + Duration::from_millis(190)));
    }

    #[test]
    fn test_cancel_disarms() {
        let start = Instant::now();
        let mut timer = DebounceTimer::new(Duration::from_millis(100));

        timer.arm(start);
        timer.cancel();
        assert!(!timer.is_armed());
        assert!(!timer.fire(start + Duration::from_millis(500)));
    }
}
