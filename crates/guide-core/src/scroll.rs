//! Scroll surface state: logical line, materialized range and timers.
//!
//! Two origins are tracked. `Idle` means scroll events come from the user and
//! move the logical line once they settle. `Programmatic` is entered before
//! any scroll the controller itself requests and lasts for the settle window,
//! so the burst of native events from an animated scroll is not mistaken for
//! user scrolling.

use crate::config::ReaderConfig;
use crate::timer::Deadline;
use crate::viewport::{ViewportGeometry, ViewportRange, offset_for_line, should_replace};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOrigin {
    Idle,
    Programmatic,
}

/// A scroll the host must perform on its scrollable surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ScrollRequest {
    pub offset: f32,
    /// `false` jumps without animation.
    pub animated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollEvent {
    ScrollTo(ScrollRequest),
    RangeChanged(ViewportRange),
    LogicalLineChanged(usize),
    RestoreCompleted,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSettings {
    pub line_height: f32,
    pub viewport_height: f32,
    pub buffer_lines: usize,
    pub stability_lines: usize,
    pub debounce: Duration,
    pub settle: Duration,
    pub activity_window: Duration,
    pub restore_delay: Duration,
}

impl From<&ReaderConfig> for ScrollSettings {
    fn from(config: &ReaderConfig) -> Self {
        ScrollSettings {
            line_height: config.line_height_px,
            viewport_height: config.viewport_height_px,
            buffer_lines: config.buffer_lines,
            stability_lines: config.range_stability_lines,
            debounce: config.scroll_debounce(),
            settle: config.programmatic_settle(),
            activity_window: config.scroll_activity_window(),
            restore_delay: config.initial_restore_delay(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitialRestore {
    Waiting,
    Scheduled { line: usize },
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    Restore,
    Settle,
    Debounce,
    Activity,
}

#[derive(Debug, Clone)]
pub struct ScrollController {
    settings: ScrollSettings,
    total_lines: usize,
    origin: ScrollOrigin,
    logical_line: usize,
    scroll_offset: f32,
    range: ViewportRange,
    pending_offset: Option<f32>,
    debounce: Deadline,
    settle: Deadline,
    activity: Deadline,
    restore: InitialRestore,
    restore_timer: Deadline,
}

impl ScrollController {
    pub fn new(settings: ScrollSettings) -> Self {
        Self {
            settings,
            total_lines: 0,
            origin: ScrollOrigin::Idle,
            logical_line: 1,
            scroll_offset: 0.0,
            range: ViewportRange::EMPTY,
            pending_offset: None,
            debounce: Deadline::new(),
            settle: Deadline::new(),
            activity: Deadline::new(),
            restore: InitialRestore::Waiting,
            restore_timer: Deadline::new(),
        }
    }

    /// Start over for freshly loaded content.
    pub fn reset(&mut self, total_lines: usize, events: &mut Vec<ScrollEvent>) {
        self.cancel_timers();
        self.total_lines = total_lines;
        self.origin = ScrollOrigin::Idle;
        self.logical_line = 1;
        self.scroll_offset = 0.0;
        self.restore = InitialRestore::Waiting;
        self.refresh_range(true, events);
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    pub fn logical_line(&self) -> usize {
        self.logical_line
    }

    pub fn range(&self) -> ViewportRange {
        self.range
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn origin(&self) -> ScrollOrigin {
        self.origin
    }

    pub fn settings(&self) -> &ScrollSettings {
        &self.settings
    }

    pub fn restore_complete(&self) -> bool {
        self.restore == InitialRestore::Done
    }

    /// True during a programmatic scroll and for the trailing activity window
    /// after any scroll event.
    pub fn is_actively_scrolling(&self, now: Instant) -> bool {
        self.origin == ScrollOrigin::Programmatic || self.activity.is_pending(now)
    }

    pub fn geometry(&self) -> ViewportGeometry {
        ViewportGeometry {
            scroll_offset: self.scroll_offset,
            viewport_height: self.settings.viewport_height,
            line_height: self.settings.line_height,
            total_lines: self.total_lines,
        }
    }

    /// Animated navigation to 1-based `line`, clamped into the guide.
    pub fn goto_line(&mut self, line: usize, now: Instant, events: &mut Vec<ScrollEvent>) {
        self.navigate(line, now, true, events);
    }

    pub fn page_down(&mut self, now: Instant, events: &mut Vec<ScrollEvent>) {
        let target = self.logical_line.saturating_add(self.geometry().page_lines());
        self.goto_line(target, now, events);
    }

    pub fn page_up(&mut self, now: Instant, events: &mut Vec<ScrollEvent>) {
        let target = self.logical_line.saturating_sub(self.geometry().page_lines());
        self.goto_line(target, now, events);
    }

    fn navigate(&mut self, line: usize, now: Instant, animated: bool, events: &mut Vec<ScrollEvent>) {
        if self.total_lines == 0 {
            debug!(line, "Ignoring navigation in an empty guide");
            return;
        }
        let target = line.clamp(1, self.total_lines);
        let offset = offset_for_line(target, self.settings.line_height);

        // The flag goes up before the scroll is issued and comes down only
        // when the settle window closes.
        self.origin = ScrollOrigin::Programmatic;
        self.settle.restart(now, self.settings.settle);
        self.activity.restart(now, self.settings.activity_window);
        self.pending_offset = None;
        self.debounce.cancel();

        self.scroll_offset = offset;
        self.set_logical_line(target, events);
        self.refresh_range(false, events);
        info!(line = target, offset, animated, "Navigating to line");
        events.push(ScrollEvent::ScrollTo(ScrollRequest { offset, animated }));
    }

    /// Raw scroll event from the host; processed after the debounce window.
    pub fn on_scroll(&mut self, offset: f32, now: Instant) {
        self.pending_offset = Some(sanitize_offset(offset));
        self.debounce.restart(now, self.settings.debounce);
        self.activity.restart(now, self.settings.activity_window);
    }

    pub fn set_viewport_height(&mut self, height: f32, events: &mut Vec<ScrollEvent>) {
        if !(height.is_finite() && height >= 0.0) {
            debug!(height, "Ignoring invalid viewport height");
            return;
        }
        self.settings.viewport_height = height;
        self.refresh_range(true, events);
    }

    /// Schedule the one restore per load. `None` means there is nothing to
    /// restore and the restore counts as complete immediately.
    pub fn schedule_initial_restore(
        &mut self,
        line: Option<usize>,
        now: Instant,
        events: &mut Vec<ScrollEvent>,
    ) {
        if self.restore != InitialRestore::Waiting {
            debug!("Initial restore already handled for this load");
            return;
        }
        match line {
            Some(line) => {
                self.restore = InitialRestore::Scheduled { line };
                self.restore_timer.restart(now, self.settings.restore_delay);
            }
            None => {
                self.restore = InitialRestore::Done;
                events.push(ScrollEvent::RestoreCompleted);
            }
        }
    }

    /// Fire every deadline due at `now`, earliest first, so the outcome does
    /// not depend on how often the host ticks.
    pub fn tick(&mut self, now: Instant, events: &mut Vec<ScrollEvent>) {
        while let Some((timer, due)) = self.next_due(now) {
            match timer {
                Timer::Restore => {
                    self.restore_timer.cancel();
                    if let InitialRestore::Scheduled { line } = self.restore {
                        info!(line, "Restoring saved position");
                        self.navigate(line, due, false, events);
                        self.restore = InitialRestore::Done;
                        events.push(ScrollEvent::RestoreCompleted);
                    }
                }
                Timer::Settle => {
                    self.settle.cancel();
                    if self.origin == ScrollOrigin::Programmatic {
                        trace!("Programmatic scroll settled");
                        self.origin = ScrollOrigin::Idle;
                        events.push(ScrollEvent::Settled);
                    }
                }
                Timer::Debounce => {
                    self.debounce.cancel();
                    if let Some(offset) = self.pending_offset.take() {
                        self.apply_offset(offset, events);
                    }
                }
                // Expiry only clears the flag.
                Timer::Activity => self.activity.cancel(),
            }
        }
    }

    /// Earliest deadline due at `now`. Ties resolve in declaration order, so a
    /// settle and a debounce due together leave the debounced offset to the
    /// idle state.
    fn next_due(&self, now: Instant) -> Option<(Timer, Instant)> {
        [
            (Timer::Restore, self.restore_timer.due()),
            (Timer::Settle, self.settle.due()),
            (Timer::Debounce, self.debounce.due()),
            (Timer::Activity, self.activity.due()),
        ]
        .into_iter()
        .filter_map(|(timer, due)| due.filter(|due| *due <= now).map(|due| (timer, due)))
        .min_by_key(|(_, due)| *due)
    }

    /// Cancel every timer; nothing fires after this.
    pub fn teardown(&mut self) {
        self.cancel_timers();
        self.origin = ScrollOrigin::Idle;
        if matches!(self.restore, InitialRestore::Scheduled { .. }) {
            self.restore = InitialRestore::Done;
        }
    }

    fn cancel_timers(&mut self) {
        self.pending_offset = None;
        self.debounce.cancel();
        self.settle.cancel();
        self.activity.cancel();
        self.restore_timer.cancel();
    }

    fn apply_offset(&mut self, offset: f32, events: &mut Vec<ScrollEvent>) {
        self.scroll_offset = offset;
        self.refresh_range(false, events);
        if self.origin == ScrollOrigin::Idle {
            let top = self.geometry().top_line();
            self.set_logical_line(top, events);
        }
    }

    fn set_logical_line(&mut self, line: usize, events: &mut Vec<ScrollEvent>) {
        if line != self.logical_line {
            self.logical_line = line;
            events.push(ScrollEvent::LogicalLineChanged(line));
        }
    }

    fn refresh_range(&mut self, force: bool, events: &mut Vec<ScrollEvent>) {
        let geometry = self.geometry();
        let next = geometry.range_with_buffer(self.settings.buffer_lines);
        let replace = force
            || should_replace(
                self.range,
                next,
                geometry.visible_range(),
                self.settings.stability_lines,
            );
        if replace && next != self.range {
            trace!(start = next.start, end = next.end, "Viewport range changed");
            self.range = next;
            events.push(ScrollEvent::RangeChanged(next));
        }
    }
}

fn sanitize_offset(offset: f32) -> f32 {
    if offset.is_finite() { offset.max(0.0) } else { 0.0 }
}
