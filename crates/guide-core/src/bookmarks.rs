//! Bookmark model and the current-position reconciliation rule.
//!
//! A guide has at most one current-position bookmark. Setting a new current
//! position converts the previous one into a regular bookmark instead of
//! deleting it. Everything here is pure; `service.rs` runs the resulting plan
//! against a store.

use crate::error::ReaderError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const CURRENT_POSITION_TITLE: &str = "Current Position";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Bookmark {
    pub id: String,
    pub guide_id: String,
    /// 1-based line number.
    pub line: usize,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub note: Option<String>,
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub is_current_position: bool,
}

/// Partial update for an existing bookmark. The current-position flag is not
/// representable here; only [`plan_current_position`] changes it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BookmarkEdit {
    #[ts(optional)]
    pub title: Option<String>,
    /// `Some("")` clears the note.
    #[ts(optional)]
    pub note: Option<String>,
    #[ts(optional)]
    pub line: Option<usize>,
}

/// Caller-supplied fields for a new regular bookmark.
#[derive(Debug, Clone, PartialEq, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewBookmark {
    pub guide_id: String,
    pub line: usize,
    pub title: String,
    #[ts(optional)]
    pub note: Option<String>,
}

/// Deterministic id so repeated saves overwrite the same record.
pub fn current_position_id(guide_id: &str) -> String {
    format!("current-position-{guide_id}")
}

pub fn previous_position_title(line: usize) -> String {
    format!("Previous Position (Line {line})")
}

pub fn find_current_position<'a>(guide_id: &str, bookmarks: &'a [Bookmark]) -> Option<&'a Bookmark> {
    bookmarks
        .iter()
        .find(|bookmark| bookmark.guide_id == guide_id && bookmark.is_current_position)
}

/// Writes required to move the current position of one guide.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentPositionPlan {
    /// Former current position, rewritten as a regular bookmark.
    pub converted: Option<Bookmark>,
    /// Id of the former current-position record.
    pub delete_id: Option<String>,
    pub current: Bookmark,
}

pub fn plan_current_position(
    guide_id: &str,
    line: usize,
    existing: &[Bookmark],
    now: DateTime<Utc>,
    new_id: impl FnOnce() -> String,
) -> CurrentPositionPlan {
    let previous = find_current_position(guide_id, existing);

    let converted = previous.map(|old| {
        // Literal match: a renamed current position keeps its custom title.
        let title = if old.title == CURRENT_POSITION_TITLE {
            previous_position_title(old.line)
        } else {
            old.title.clone()
        };
        Bookmark {
            id: new_id(),
            guide_id: old.guide_id.clone(),
            line: old.line,
            title,
            note: old.note.clone(),
            date_created: old.date_created,
            is_current_position: false,
        }
    });

    CurrentPositionPlan {
        converted,
        delete_id: previous.map(|old| old.id.clone()),
        current: Bookmark {
            id: current_position_id(guide_id),
            guide_id: guide_id.to_string(),
            line,
            title: CURRENT_POSITION_TITLE.to_string(),
            note: None,
            date_created: now,
            is_current_position: true,
        },
    }
}

pub fn validate_title(title: &str) -> Result<String, ReaderError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ReaderError::Validation("bookmark title cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

pub fn validate_line(line: usize, total_lines: usize) -> Result<usize, ReaderError> {
    if line == 0 || line > total_lines {
        return Err(ReaderError::LineOutOfRange {
            line,
            total: total_lines,
        });
    }
    Ok(line)
}

impl BookmarkEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.note.is_none() && self.line.is_none()
    }

    /// Validate every field, then apply; `bookmark` is untouched on error.
    pub fn apply_to(&self, bookmark: &mut Bookmark, total_lines: usize) -> Result<(), ReaderError> {
        let title = self.title.as_deref().map(validate_title).transpose()?;
        let line = self
            .line
            .map(|line| validate_line(line, total_lines))
            .transpose()?;

        if let Some(title) = title {
            bookmark.title = title;
        }
        if let Some(line) = line {
            bookmark.line = line;
        }
        if let Some(note) = &self.note {
            let note = note.trim();
            bookmark.note = (!note.is_empty()).then(|| note.to_string());
        }
        Ok(())
    }
}

/// Current position (if any) kept apart; the rest ascending by line.
pub fn split_for_display(bookmarks: Vec<Bookmark>) -> (Option<Bookmark>, Vec<Bookmark>) {
    let mut current = None;
    let mut regular = Vec::with_capacity(bookmarks.len());
    for bookmark in bookmarks {
        if bookmark.is_current_position && current.is_none() {
            current = Some(bookmark);
        } else {
            regular.push(bookmark);
        }
    }
    regular.sort_by(|a, b| a.line.cmp(&b.line).then(a.date_created.cmp(&b.date_created)));
    (current, regular)
}
