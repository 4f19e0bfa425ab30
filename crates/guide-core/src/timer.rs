//! Single-shot, cancellable deadlines.
//!
//! Components never read the clock. The host passes `now` into every call and
//! each component owns the deadlines it needs; restarting a deadline always
//! replaces the previous one so timers never stack.

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Deadline {
    due: Option<Instant>,
}

impl Deadline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any armed deadline and arm a new one `delay` after `now`.
    pub fn restart(&mut self, now: Instant, delay: Duration) {
        self.due = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    /// Armed and not yet due at `now`.
    pub fn is_pending(&self, now: Instant) -> bool {
        self.due.is_some_and(|due| now < due)
    }

    pub fn due(&self) -> Option<Instant> {
        self.due
    }

    /// Returns true exactly once, on the first call at or after the due instant.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
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
    use super::Deadline;
    use std::time::{Duration, Instant};

    #[test]
    fn fires_once_after_delay() {
        let t0 = Instant::now();
        let mut deadline = Deadline::new();
        deadline.restart(t0, Duration::from_millis(50));

        assert!(!deadline.fire_if_due(t0 + Duration::from_millis(49)));
        assert!(deadline.fire_if_due(t0 + Duration::from_millis(50)));
        assert!(!deadline.fire_if_due(t0 + Duration::from_millis(80)));
        assert!(!deadline.is_armed());
    }

    #[test]
    fn restart_replaces_previous_deadline() {
        let t0 = Instant::now();
        let mut deadline = Deadline::new();
        deadline.restart(t0, Duration::from_millis(50));
        deadline.restart(t0 + Duration::from_millis(40), Duration::from_millis(50));

        assert!(!deadline.fire_if_due(t0 + Duration::from_millis(60)));
        assert!(deadline.fire_if_due(t0 + Duration::from_millis(90)));
    }

    #[test]
    fn cancelled_deadline_never_fires() {
        let t0 = Instant::now();
        let mut deadline = Deadline::new();
        deadline.restart(t0, Duration::from_millis(10));
        deadline.cancel();

        assert!(!deadline.is_pending(t0));
        assert!(!deadline.fire_if_due(t0 + Duration::from_secs(1)));
    }
}
