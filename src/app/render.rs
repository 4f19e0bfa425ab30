//! Plain-text rendering of reader state for the terminal.

use guide_core::{Bookmark, Notification, ReaderSnapshot};
use std::fmt::Write;

/// Visible window of the snapshot: `rows` lines starting at the logical line.
pub fn viewport(snapshot: &ReaderSnapshot, rows: usize) -> String {
    let mut out = String::new();
    let first = snapshot.logical_line;
    let width = snapshot.total_lines.max(1).to_string().len();
    for line in snapshot
        .lines
        .iter()
        .filter(|line| line.number >= first)
        .take(rows)
    {
        let marker = if snapshot.pending_tap_line == Some(line.number) {
            '*'
        } else {
            ' '
        };
        let _ = writeln!(out, "{marker}{:>width$} | {}", line.number, line.text);
    }
    let _ = write!(
        out,
        "-- line {}/{} | lines {}..{} in memory{}",
        snapshot.logical_line,
        snapshot.total_lines,
        snapshot.range.start + 1,
        snapshot.range.end,
        if snapshot.actively_scrolling {
            " | scrolling"
        } else {
            ""
        }
    );
    if !snapshot.search_query.trim().is_empty() {
        let selected = snapshot
            .selected_search_result
            .map(|idx| format!("{}/", idx + 1))
            .unwrap_or_default();
        let _ = write!(
            out,
            " | \"{}\" {}{} matches",
            snapshot.search_query.trim(),
            selected,
            snapshot.search_results.len()
        );
    }
    out
}

pub fn bookmarks(current: Option<&Bookmark>, regular: &[Bookmark]) -> String {
    let mut out = String::new();
    match current {
        Some(bookmark) => {
            let _ = writeln!(out, "> {} (line {})", bookmark.title, bookmark.line);
        }
        None => out.push_str("> no current position\n"),
    }
    if regular.is_empty() {
        out.push_str("  no bookmarks");
    }
    for bookmark in regular {
        let _ = write!(
            out,
            "  {:>6}  {}  [{}]",
            bookmark.line, bookmark.title, bookmark.id
        );
        if let Some(note) = &bookmark.note {
            let _ = write!(out, " - {note}");
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

pub fn notification(notification: &Notification) -> String {
    match notification {
        Notification::CurrentPositionSet { line } => format!("Current position set to line {line}"),
        Notification::PreviousPositionConverted { line, title, .. } => {
            format!("Previous position at line {line} kept as \"{title}\"")
        }
        Notification::BookmarkAdded { id, line } => format!("Bookmark {id} added at line {line}"),
        Notification::BookmarkUpdated { id } => format!("Bookmark {id} updated"),
        Notification::BookmarkDeleted { id } => format!("Bookmark {id} deleted"),
        Notification::OperationFailed {
            operation, message, ..
        } => format!("{operation} failed: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guide_core::session::RenderedLine;
    use guide_core::viewport::ViewportRange;

    fn snapshot() -> ReaderSnapshot {
        ReaderSnapshot {
            guide_id: "g".to_string(),
            total_lines: 120,
            logical_line: 10,
            scroll_offset: 216.0,
            range: ViewportRange { start: 0, end: 60 },
            lines: (1..=60)
                .map(|number| RenderedLine {
                    number,
                    text: format!("text {number}"),
                })
                .collect(),
            actively_scrolling: false,
            restore_complete: true,
            pending_tap_line: Some(11),
            search_query: String::new(),
            search_results: Vec::new(),
            selected_search_result: None,
            bookmark_count: 0,
        }
    }

    #[test]
    fn viewport_starts_at_logical_line() {
        let text = viewport(&snapshot(), 3);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "  10 | text 10");
        assert_eq!(lines[1], "* 11 | text 11");
        assert_eq!(lines[3], "-- line 10/120 | lines 1..60 in memory");
    }

    #[test]
    fn notifications_read_as_sentences() {
        let text = notification(&Notification::PreviousPositionConverted {
            id: "x".to_string(),
            line: 10,
            title: "Previous Position (Line 10)".to_string(),
        });
        assert_eq!(
            text,
            "Previous position at line 10 kept as \"Previous Position (Line 10)\""
        );
    }
}
