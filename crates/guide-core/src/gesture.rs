//! Double-tap recognition over line taps.
//!
//! A tap becomes the pending first tap; a second tap on the same line before
//! the window closes emits [`DoubleTap`] and returns to neutral, so a third
//! rapid tap starts over instead of pairing with the second.

use crate::timer::Deadline;
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleTap {
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    window: Duration,
    pending_line: Option<usize>,
    expiry: Deadline,
}

impl GestureRecognizer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending_line: None,
            expiry: Deadline::new(),
        }
    }

    pub fn tap(&mut self, line: usize, now: Instant) -> Option<DoubleTap> {
        let paired = self.pending_line == Some(line) && self.expiry.is_pending(now);
        if paired {
            trace!(line, "Double tap recognized");
            self.reset();
            return Some(DoubleTap { line });
        }

        self.pending_line = Some(line);
        self.expiry.restart(now, self.window);
        None
    }

    /// Drop a first tap whose window has elapsed.
    pub fn tick(&mut self, now: Instant) {
        if self.expiry.fire_if_due(now) {
            self.pending_line = None;
        }
    }

    pub fn reset(&mut self) {
        self.pending_line = None;
        self.expiry.cancel();
    }

    pub fn pending_line(&self) -> Option<usize> {
        self.pending_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    fn build_test_recognizer() -> GestureRecognizer {
        GestureRecognizer::new(Duration::from_millis(300))
    }

    #[test]
    fn two_quick_taps_on_same_line_emit_one_double_tap() {
        let t0 = Instant::now();
        let mut gestures = build_test_recognizer();
        assert_eq!(gestures.tap(12, t0), None);
        assert_eq!(gestures.tap(12, ms(t0, 150)), Some(DoubleTap { line: 12 }));
    }

    #[test]
    fn third_rapid_tap_does_not_pair_with_second() {
        let t0 = Instant::now();
        let mut gestures = build_test_recognizer();
        gestures.tap(7, t0);
        assert!(gestures.tap(7, ms(t0, 100)).is_some());
        assert_eq!(gestures.tap(7, ms(t0, 150)), None);
        assert_eq!(gestures.pending_line(), Some(7));
    }

    #[test]
    fn taps_outside_window_are_independent() {
        let t0 = Instant::now();
        let mut gestures = build_test_recognizer();
        gestures.tap(3, t0);
        assert_eq!(gestures.tap(3, ms(t0, 300)), None);
        assert_eq!(gestures.tap(3, ms(t0, 450)), Some(DoubleTap { line: 3 }));
    }

    #[test]
    fn alternating_lines_never_double_tap() {
        let t0 = Instant::now();
        let mut gestures = build_test_recognizer();
        for step in 0..10u64 {
            let line = if step % 2 == 0 { 4 } else { 5 };
            assert_eq!(gestures.tap(line, ms(t0, step * 20)), None);
        }
    }

    #[test]
    fn tick_clears_expired_first_tap() {
        let t0 = Instant::now();
        let mut gestures = build_test_recognizer();
        gestures.tap(9, t0);
        gestures.tick(ms(t0, 299));
        assert_eq!(gestures.pending_line(), Some(9));
        gestures.tick(ms(t0, 300));
        assert_eq!(gestures.pending_line(), None);
    }
}
