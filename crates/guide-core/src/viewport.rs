//! Materialized line range for a scroll position.
//!
//! Ranges are half-open indices into the line sequence and always satisfy
//! `0 <= start <= end <= total_lines`. They are deliberately over-inclusive:
//! a buffer of lines is added above and below the visible window.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ViewportRange {
    pub start: usize,
    pub end: usize,
}

impl ViewportRange {
    pub const EMPTY: ViewportRange = ViewportRange { start: 0, end: 0 };

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, other: ViewportRange) -> bool {
        other.is_empty() || (self.start <= other.start && other.end <= self.end)
    }
}

/// Inputs describing the scroll surface, all in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportGeometry {
    pub scroll_offset: f32,
    pub viewport_height: f32,
    pub line_height: f32,
    pub total_lines: usize,
}

impl ViewportGeometry {
    /// Offsets and heights that are negative or not finite count as zero.
    fn sanitized(self) -> Option<(f64, f64, f64)> {
        let clamp = |v: f32| {
            if v.is_finite() { f64::from(v).max(0.0) } else { 0.0 }
        };
        let line_height = clamp(self.line_height);
        if line_height <= 0.0 {
            return None;
        }
        Some((clamp(self.scroll_offset), clamp(self.viewport_height), line_height))
    }

    /// Lines actually on screen, without any buffer.
    pub fn visible_range(self) -> ViewportRange {
        self.range_with_buffer(0)
    }

    pub fn range_with_buffer(self, buffer: usize) -> ViewportRange {
        let Some((offset, height, line_height)) = self.sanitized() else {
            return ViewportRange::EMPTY;
        };
        let total = self.total_lines;
        let first = (offset / line_height).floor() as usize;
        let last = ((offset + height) / line_height).ceil() as usize;

        let end = last.saturating_add(buffer).min(total);
        let start = first.saturating_sub(buffer).min(end);
        ViewportRange { start, end }
    }

    /// 1-based line at the top edge of the viewport.
    pub fn top_line(self) -> usize {
        let Some((offset, _, line_height)) = self.sanitized() else {
            return 1;
        };
        let line = (offset / line_height).floor() as usize + 1;
        line.clamp(1, self.total_lines.max(1))
    }

    /// Lines that fit fully in the viewport, at least one.
    pub fn page_lines(self) -> usize {
        match self.sanitized() {
            Some((_, height, line_height)) => ((height / line_height).floor() as usize).max(1),
            None => 1,
        }
    }
}

/// Scroll offset that puts 1-based `line` at the top of the viewport.
pub fn offset_for_line(line: usize, line_height: f32) -> f32 {
    let line_height = if line_height.is_finite() { line_height.max(0.0) } else { 0.0 };
    line.saturating_sub(1) as f32 * line_height
}

/// Whether a caller holding `current` should swap to `next`.
///
/// Small movements are ignored to avoid render churn, unless the held range
/// no longer covers the lines that are actually visible.
pub fn should_replace(
    current: ViewportRange,
    next: ViewportRange,
    visible: ViewportRange,
    threshold: usize,
) -> bool {
    if !current.contains(visible) {
        return true;
    }
    current.start.abs_diff(next.start) > threshold || current.end.abs_diff(next.end) > threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(offset: f32, height: f32, line_height: f32, total: usize) -> ViewportGeometry {
        ViewportGeometry {
            scroll_offset: offset,
            viewport_height: height,
            line_height,
            total_lines: total,
        }
    }

    #[test]
    fn buffered_range_for_mid_guide_offset() {
        let range = geometry(2000.0, 800.0, 20.0, 200).range_with_buffer(50);
        assert_eq!(range, ViewportRange { start: 50, end: 190 });
    }

    #[test]
    fn range_is_clamped_at_both_ends() {
        let top = geometry(0.0, 800.0, 20.0, 200).range_with_buffer(50);
        assert_eq!(top, ViewportRange { start: 0, end: 90 });

        let bottom = geometry(3900.0, 800.0, 20.0, 200).range_with_buffer(50);
        assert_eq!(bottom, ViewportRange { start: 145, end: 200 });
    }

    #[test]
    fn offset_past_the_end_keeps_start_at_or_below_end() {
        let range = geometry(1_000_000.0, 800.0, 20.0, 200).range_with_buffer(50);
        assert!(range.start <= range.end);
        assert_eq!(range.end, 200);
    }

    #[test]
    fn degenerate_geometry_yields_empty_or_clamped_ranges() {
        assert_eq!(geometry(100.0, 800.0, 0.0, 200).range_with_buffer(50), ViewportRange::EMPTY);
        assert_eq!(
            geometry(100.0, 800.0, -4.0, 200).range_with_buffer(50),
            ViewportRange::EMPTY
        );
        assert_eq!(
            geometry(100.0, 800.0, f32::NAN, 200).range_with_buffer(50),
            ViewportRange::EMPTY
        );

        let negative = geometry(-500.0, -10.0, 20.0, 200).range_with_buffer(50);
        assert_eq!(negative, ViewportRange { start: 0, end: 50 });
    }

    #[test]
    fn visible_window_is_always_inside_buffered_range() {
        let offsets = [0.0, 7.5, 19.9, 20.0, 333.3, 1999.0, 2000.0, 3999.0, 9000.0];
        let heights = [0.0, 1.0, 240.0, 800.0, 5000.0];
        let line_heights = [1.0, 13.7, 20.0, 48.0];
        let totals = [0usize, 1, 10, 200, 50_000];

        for &offset in &offsets {
            for &height in &heights {
                for &line_height in &line_heights {
                    for &total in &totals {
                        let g = geometry(offset, height, line_height, total);
                        let range = g.range_with_buffer(50);
                        assert!(range.start <= range.end && range.end <= total);
                        assert!(range.contains(g.visible_range()), "{g:?} -> {range:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn small_shifts_do_not_replace_held_range() {
        let held = ViewportRange { start: 50, end: 190 };
        let visible = ViewportRange { start: 105, end: 145 };
        assert!(!should_replace(held, ViewportRange { start: 55, end: 195 }, visible, 10));
        assert!(should_replace(held, ViewportRange { start: 61, end: 200 }, visible, 10));
    }

    #[test]
    fn uncovered_visible_window_forces_replacement() {
        let held = ViewportRange { start: 0, end: 20 };
        let visible = ViewportRange { start: 15, end: 25 };
        assert!(should_replace(held, ViewportRange { start: 0, end: 25 }, visible, 10));
    }

    #[test]
    fn top_line_and_offset_agree() {
        let offset = offset_for_line(41, 20.0);
        assert_eq!(offset, 800.0);
        assert_eq!(geometry(offset, 800.0, 20.0, 200).top_line(), 41);
        assert_eq!(geometry(0.0, 800.0, 20.0, 0).top_line(), 1);
    }

    #[test]
    fn inverted_range_has_zero_length() {
        let inverted = ViewportRange { start: 9, end: 4 };
        assert_eq!(inverted.len(), 0);
        assert_eq!(ViewportRange { start: 4, end: 9 }.len(), 5);
    }
}
