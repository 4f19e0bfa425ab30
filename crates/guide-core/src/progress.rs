//! Debounced write-through of the reading position.
//!
//! Every logical-line change restarts the save timer. While content is
//! loading, the user is scrolling, or the initial restore has not finished,
//! the timer is held off; once those gates clear the timer is armed again so
//! the latest position is still saved.

use crate::store::GuideStore;
use crate::timer::Deadline;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Progress {
    pub guide_id: String,
    /// 1-based line number.
    pub line: usize,
    /// `line / total_lines`, in `0.0..=1.0`.
    pub percentage: f64,
}

#[derive(Debug, Clone)]
pub struct PositionPersistence {
    guide_id: String,
    delay: Duration,
    timer: Deadline,
    pending_line: Option<usize>,
    total_lines: usize,
    loading: bool,
    restore_complete: bool,
}

impl PositionPersistence {
    pub fn new(guide_id: impl Into<String>, delay: Duration) -> Self {
        Self {
            guide_id: guide_id.into(),
            delay,
            timer: Deadline::new(),
            pending_line: None,
            total_lines: 0,
            loading: true,
            restore_complete: false,
        }
    }

    pub fn guide_id(&self) -> &str {
        &self.guide_id
    }

    /// A new guide is being loaded; forget anything pending.
    pub fn begin_loading(&mut self) {
        self.loading = true;
        self.restore_complete = false;
        self.pending_line = None;
        self.timer.cancel();
    }

    pub fn finish_loading(&mut self, total_lines: usize) {
        self.loading = false;
        self.total_lines = total_lines;
    }

    pub fn mark_restore_complete(&mut self) {
        self.restore_complete = true;
    }

    fn is_suppressed(&self, actively_scrolling: bool) -> bool {
        self.loading || actively_scrolling || !self.restore_complete
    }

    pub fn on_position_changed(&mut self, line: usize, now: Instant, actively_scrolling: bool) {
        self.pending_line = Some(line);
        if self.is_suppressed(actively_scrolling) {
            self.timer.cancel();
        } else {
            self.timer.restart(now, self.delay);
        }
    }

    /// Returns the progress record to write once the debounce window passes.
    pub fn tick(&mut self, now: Instant, actively_scrolling: bool) -> Option<Progress> {
        if self.is_suppressed(actively_scrolling) {
            self.timer.cancel();
            return None;
        }
        let line = self.pending_line?;
        if !self.timer.is_armed() {
            self.timer.restart(now, self.delay);
            return None;
        }
        if !self.timer.fire_if_due(now) {
            return None;
        }
        self.pending_line = None;
        Some(self.progress_for(line))
    }

    pub fn progress_for(&self, line: usize) -> Progress {
        let percentage = if self.total_lines == 0 {
            0.0
        } else {
            (line as f64 / self.total_lines as f64).clamp(0.0, 1.0)
        };
        Progress {
            guide_id: self.guide_id.clone(),
            line,
            percentage,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending_line.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending_line = None;
        self.timer.cancel();
    }
}

/// Best-effort background save: failures are logged and dropped. The next
/// position change saves again.
pub async fn persist_progress<S: GuideStore + ?Sized>(store: &S, progress: &Progress) -> bool {
    match store.save_progress(progress).await {
        Ok(()) => {
            debug!(guide_id = %progress.guide_id, line = progress.line, "Saved reading progress");
            true
        }
        Err(err) => {
            warn!(
                guide_id = %progress.guide_id,
                line = progress.line,
                "Failed to save reading progress: {err}"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    fn build_test_persistence() -> PositionPersistence {
        let mut persistence = PositionPersistence::new("g", Duration::from_millis(1000));
        persistence.finish_loading(200);
        persistence.mark_restore_complete();
        persistence
    }

    #[test]
    fn saves_after_quiet_period() {
        let t0 = Instant::now();
        let mut persistence = build_test_persistence();
        persistence.on_position_changed(50, t0, false);

        assert_eq!(persistence.tick(ms(t0, 999), false), None);
        let saved = persistence.tick(ms(t0, 1000), false).expect("progress");
        assert_eq!(saved.line, 50);
        assert_eq!(saved.percentage, 0.25);
        assert_eq!(persistence.tick(ms(t0, 3000), false), None);
    }

    #[test]
    fn rapid_changes_collapse_into_one_save_of_latest_line() {
        let t0 = Instant::now();
        let mut persistence = build_test_persistence();
        persistence.on_position_changed(10, t0, false);
        persistence.on_position_changed(11, ms(t0, 600), false);
        persistence.on_position_changed(12, ms(t0, 1200), false);

        assert_eq!(persistence.tick(ms(t0, 2100), false), None);
        assert_eq!(persistence.tick(ms(t0, 2200), false).map(|p| p.line), Some(12));
    }

    #[test]
    fn nothing_is_saved_while_scrolling_then_saves_after() {
        let t0 = Instant::now();
        let mut persistence = build_test_persistence();
        persistence.on_position_changed(70, t0, true);
        assert_eq!(persistence.tick(ms(t0, 1500), true), None);

        assert_eq!(persistence.tick(ms(t0, 1600), false), None);
        assert_eq!(persistence.tick(ms(t0, 2599), false), None);
        assert_eq!(persistence.tick(ms(t0, 2600), false).map(|p| p.line), Some(70));
    }

    #[test]
    fn gated_until_restore_completes() {
        let t0 = Instant::now();
        let mut persistence = PositionPersistence::new("g", Duration::from_millis(1000));
        persistence.finish_loading(100);
        persistence.on_position_changed(1, t0, false);
        assert_eq!(persistence.tick(ms(t0, 5000), false), None);

        persistence.mark_restore_complete();
        assert_eq!(persistence.tick(ms(t0, 5000), false), None);
        assert_eq!(persistence.tick(ms(t0, 6000), false).map(|p| p.line), Some(1));
    }

    #[test]
    fn loading_discards_pending_position() {
        let t0 = Instant::now();
        let mut persistence = build_test_persistence();
        persistence.on_position_changed(30, t0, false);
        persistence.begin_loading();
        assert!(!persistence.has_pending());
        assert_eq!(persistence.tick(ms(t0, 5000), false), None);
    }

    #[tokio::test]
    async fn failed_write_is_swallowed() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let progress = build_test_persistence().progress_for(3);
        assert!(!persist_progress(&store, &progress).await);

        store.fail_writes(false);
        assert!(persist_progress(&store, &progress).await);
        assert_eq!(store.get_progress("g").await.unwrap(), Some(progress));
    }
}
