//! Quiescence timer for a changing input.
//!
//! Time is passed in by the caller, so the debouncer itself never reads a
//! clock and is deterministic under test.

use std::time::{Duration, Instant};

use crate::config::DEFAULT_DEBOUNCE_MS;

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    last_change: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_change: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a change; restarts the quiet period.
    pub fn touch(&mut self, now: Instant) {
        self.last_change = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.last_change.is_some()
    }

    /// Whether the quiet period has elapsed. Does not consume the change.
    pub fn is_ready(&self, now: Instant) -> bool {
        self.last_change
            .is_some_and(|changed| now.saturating_duration_since(changed) >= self.delay)
    }

    /// Consume the pending change if its quiet period has elapsed.
    pub fn take_ready(&mut self, now: Instant) -> bool {
        if self.is_ready(now) {
            self.last_change = None;
            true
        } else {
            false
        }
    }

    /// Time left before a pending change becomes ready.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.last_change
            .map(|changed| self.delay.saturating_sub(now.saturating_duration_since(changed)))
    }

    pub fn cancel(&mut self) {
        self.last_change = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        assert!(!debouncer.take_ready(start));

        debouncer.touch(start);
        assert!(!debouncer.take_ready(start + Duration::from_millis(299)));
        assert!(debouncer.take_ready(start + Duration::from_millis(300)));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_new_change_restarts_timer() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        debouncer.touch(start);
        debouncer.touch(start + Duration::from_millis(80));

        assert!(!debouncer.is_ready(start + Duration::from_millis(150)));
        assert_eq!(
            debouncer.remaining(start + Duration::from_millis(150)),
            Some(Duration::from_millis(30))
        );
        assert!(debouncer.is_ready(start + Duration::from_millis(180)));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.touch(start);
        debouncer.cancel();
        assert!(!debouncer.is_ready(start + Duration::from_secs(1)));
        assert_eq!(debouncer.remaining(start), None);
    }
}
