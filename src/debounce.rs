//! Cancellable quiet-period timer.
//!
//! The timer holds at most one deadline. Scheduling again replaces the
//! pending deadline, so a burst of triggers collapses into a single firing
//! once the quiet period has elapsed since the last one. Time is passed in
//! by the caller, which keeps the timer deterministic under test.

use std::time::Duration;

use tokio::time::Instant;

/// Quiet period between the last search keystroke and the list fetch.
pub const SEARCH_QUIET_PERIOD: Duration = Duration::from_millis(400);

#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Arm the timer to fire one quiet period after `now`, replacing any
    /// pending deadline.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// Drop the pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the deadline if it has been reached.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_QUIET_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut timer = Debouncer::default();
        timer.schedule(start);

        assert!(!timer.fire_if_due(start + ms(399)));
        assert!(timer.fire_if_due(start + ms(400)));
        assert!(!timer.fire_if_due(start + ms(800)));
        assert!(!timer.is_pending());
    }

    #[test]
    fn rescheduling_pushes_the_deadline_back() {
        let start = Instant::now();
        let mut timer = Debouncer::default();
        timer.schedule(start);
        timer.schedule(start + ms(300));

        assert!(!timer.fire_if_due(start + ms(500)));
        assert_eq!(timer.deadline(), Some(start + ms(700)));
        assert!(timer.fire_if_due(start + ms(700)));
    }

    #[test]
    fn cancel_clears_pending_deadline() {
        let start = Instant::now();
        let mut timer = Debouncer::new(ms(50));
        assert!(!timer.cancel());

        timer.schedule(start);
        assert!(timer.cancel());
        assert!(!timer.fire_if_due(start + ms(1_000)));
    }
}
