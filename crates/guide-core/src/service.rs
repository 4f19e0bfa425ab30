//! Bookmark operations executed against a [`GuideStore`].
//!
//! Validation happens before any I/O. Store failures propagate to the caller
//! so the editor can stay open and show the error.

use crate::bookmarks::{
    Bookmark, BookmarkEdit, NewBookmark, find_current_position, plan_current_position,
    split_for_display, validate_line, validate_title,
};
use crate::error::ReaderError;
use crate::notifications::Notification;
use crate::store::GuideStore;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

pub struct BookmarkService<'a, S: GuideStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: GuideStore + ?Sized> BookmarkService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Make `line` the guide's current position, converting any previous
    /// current-position record into a regular bookmark.
    pub async fn set_current_position(
        &self,
        guide_id: &str,
        line: usize,
        total_lines: usize,
    ) -> Result<Vec<Notification>, ReaderError> {
        validate_line(line, total_lines)?;
        let existing = self.store.get_bookmarks(guide_id).await?;
        let plan = plan_current_position(guide_id, line, &existing, Utc::now(), fresh_id);

        let mut notifications = Vec::new();
        if let Some(converted) = &plan.converted {
            self.store.save_bookmark(converted).await?;
            info!(
                %guide_id,
                id = %converted.id,
                line = converted.line,
                "Converted previous current position"
            );
            notifications.push(Notification::PreviousPositionConverted {
                id: converted.id.clone(),
                line: converted.line,
                title: converted.title.clone(),
            });
        }
        if let Some(old_id) = &plan.delete_id {
            if let Err(err) = self.store.delete_bookmark(old_id).await {
                warn!(%guide_id, id = %old_id, "Failed to delete previous current position: {err}");
                return Err(err.into());
            }
            notifications.push(Notification::BookmarkDeleted { id: old_id.clone() });
        }
        self.store.save_bookmark(&plan.current).await?;
        info!(%guide_id, line, "Set current position");
        notifications.push(Notification::CurrentPositionSet { line });
        Ok(notifications)
    }

    pub async fn get_current_position(
        &self,
        guide_id: &str,
    ) -> Result<Option<Bookmark>, ReaderError> {
        let bookmarks = self.store.get_bookmarks(guide_id).await?;
        Ok(find_current_position(guide_id, &bookmarks).cloned())
    }

    pub async fn add(
        &self,
        draft: NewBookmark,
        total_lines: usize,
    ) -> Result<(Bookmark, Notification), ReaderError> {
        let title = validate_title(&draft.title)?;
        let line = validate_line(draft.line, total_lines)?;
        let bookmark = Bookmark {
            id: fresh_id(),
            guide_id: draft.guide_id,
            line,
            title,
            note: draft
                .note
                .map(|note| note.trim().to_string())
                .filter(|note| !note.is_empty()),
            date_created: Utc::now(),
            is_current_position: false,
        };
        self.store.save_bookmark(&bookmark).await?;
        info!(guide_id = %bookmark.guide_id, id = %bookmark.id, line, "Added bookmark");
        let notification = Notification::BookmarkAdded {
            id: bookmark.id.clone(),
            line,
        };
        Ok((bookmark, notification))
    }

    /// Edits title, note or line. Renaming the current-position record is
    /// allowed; its flag is never touched here.
    pub async fn update(
        &self,
        guide_id: &str,
        id: &str,
        edit: &BookmarkEdit,
        total_lines: usize,
    ) -> Result<(Bookmark, Notification), ReaderError> {
        if edit.is_empty() {
            return Err(ReaderError::Validation("nothing to update".to_string()));
        }
        let mut bookmark = self.find(guide_id, id).await?;
        edit.apply_to(&mut bookmark, total_lines)?;
        self.store.save_bookmark(&bookmark).await?;
        info!(%guide_id, %id, "Updated bookmark");
        Ok((bookmark, Notification::BookmarkUpdated { id: id.to_string() }))
    }

    /// Deletes a regular bookmark. The current-position record is only ever
    /// converted or replaced.
    pub async fn delete(&self, guide_id: &str, id: &str) -> Result<Notification, ReaderError> {
        let bookmark = self.find(guide_id, id).await?;
        if bookmark.is_current_position {
            return Err(ReaderError::Validation(
                "the current position bookmark cannot be deleted".to_string(),
            ));
        }
        self.store.delete_bookmark(id).await?;
        info!(%guide_id, %id, "Deleted bookmark");
        Ok(Notification::BookmarkDeleted { id: id.to_string() })
    }

    pub async fn list_for_display(
        &self,
        guide_id: &str,
    ) -> Result<(Option<Bookmark>, Vec<Bookmark>), ReaderError> {
        let bookmarks = self.store.get_bookmarks(guide_id).await?;
        Ok(split_for_display(bookmarks))
    }

    async fn find(&self, guide_id: &str, id: &str) -> Result<Bookmark, ReaderError> {
        self.store
            .get_bookmarks(guide_id)
            .await?
            .into_iter()
            .find(|bookmark| bookmark.id == id)
            .ok_or_else(|| ReaderError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const TOTAL: usize = 500;

    fn draft(line: usize, title: &str) -> NewBookmark {
        NewBookmark {
            guide_id: "g".to_string(),
            line,
            title: title.to_string(),
            note: None,
        }
    }

    #[tokio::test]
    async fn second_current_position_converts_the_first() {
        let store = MemoryStore::new();
        let service = BookmarkService::new(&store);

        service.set_current_position("g", 10, TOTAL).await.unwrap();
        let notes = service.set_current_position("g", 25, TOTAL).await.unwrap();
        assert!(matches!(
            notes.as_slice(),
            [
                Notification::PreviousPositionConverted { line: 10, .. },
                Notification::BookmarkDeleted { id },
                Notification::CurrentPositionSet { line: 25 }
            ] if id == "current-position-g"
        ));

        let all = store.get_bookmarks("g").await.unwrap();
        let current: Vec<_> = all.iter().filter(|b| b.is_current_position).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].line, 25);
        assert_eq!(current[0].id, "current-position-g");

        let previous = all
            .iter()
            .find(|b| !b.is_current_position)
            .expect("converted bookmark");
        assert_eq!(previous.line, 10);
        assert_eq!(previous.title, "Previous Position (Line 10)");
        assert_ne!(previous.id, "current-position-g");
    }

    #[tokio::test]
    async fn first_current_position_reports_no_deletion() {
        let store = MemoryStore::new();
        let service = BookmarkService::new(&store);

        let notes = service.set_current_position("g", 10, TOTAL).await.unwrap();
        assert_eq!(notes, vec![Notification::CurrentPositionSet { line: 10 }]);
    }

    #[tokio::test]
    async fn n_positions_leave_one_current_and_n_minus_one_regular() {
        let store = MemoryStore::new();
        let service = BookmarkService::new(&store);
        let lines = [5, 40, 41, 300, 12, 499];
        for line in lines {
            service.set_current_position("g", line, TOTAL).await.unwrap();
        }

        let (current, regular) = service.list_for_display("g").await.unwrap();
        assert_eq!(current.map(|b| b.line), Some(499));
        let regular_lines: Vec<usize> = regular.iter().map(|b| b.line).collect();
        assert_eq!(regular_lines, vec![5, 12, 40, 41, 300]);
    }

    #[tokio::test]
    async fn renamed_current_position_keeps_title_on_conversion() {
        let store = MemoryStore::new();
        let service = BookmarkService::new(&store);
        service.set_current_position("g", 60, TOTAL).await.unwrap();
        let edit = BookmarkEdit {
            title: Some("Before the boss".to_string()),
            ..BookmarkEdit::default()
        };
        let (renamed, _) = service
            .update("g", "current-position-g", &edit, TOTAL)
            .await
            .unwrap();
        assert!(renamed.is_current_position);

        service.set_current_position("g", 90, TOTAL).await.unwrap();
        let (_, regular) = service.list_for_display("g").await.unwrap();
        assert_eq!(regular[0].title, "Before the boss");
    }

    #[tokio::test]
    async fn add_validates_before_any_io() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let service = BookmarkService::new(&store);

        assert!(matches!(
            service.add(draft(10, "  "), TOTAL).await,
            Err(ReaderError::Validation(_))
        ));
        assert!(matches!(
            service.add(draft(0, "Start"), TOTAL).await,
            Err(ReaderError::LineOutOfRange { line: 0, .. })
        ));
        assert!(matches!(
            service.add(draft(10, "Start"), TOTAL).await,
            Err(ReaderError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn update_and_delete_of_unknown_ids_are_not_found() {
        let store = MemoryStore::new();
        let service = BookmarkService::new(&store);
        let edit = BookmarkEdit {
            title: Some("x".to_string()),
            ..BookmarkEdit::default()
        };
        assert!(matches!(
            service.update("g", "missing", &edit, TOTAL).await,
            Err(ReaderError::NotFound(id)) if id == "missing"
        ));
        assert!(matches!(
            service.delete("g", "missing").await,
            Err(ReaderError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn stale_id_after_conversion_is_not_found() {
        let store = MemoryStore::new();
        let service = BookmarkService::new(&store);
        service.set_current_position("g", 3, TOTAL).await.unwrap();
        let (_, regular_before) = service.list_for_display("g").await.unwrap();
        assert!(regular_before.is_empty());

        service.set_current_position("g", 4, TOTAL).await.unwrap();
        let (_, regular) = service.list_for_display("g").await.unwrap();
        let converted_id = regular[0].id.clone();
        service.delete("g", &converted_id).await.unwrap();
        assert!(matches!(
            service.delete("g", &converted_id).await,
            Err(ReaderError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn current_position_cannot_be_deleted_through_crud() {
        let store = MemoryStore::new();
        let service = BookmarkService::new(&store);
        service.set_current_position("g", 3, TOTAL).await.unwrap();
        assert!(matches!(
            service.delete("g", "current-position-g").await,
            Err(ReaderError::Validation(_))
        ));
        assert!(service.get_current_position("g").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn added_bookmarks_are_regular_with_trimmed_fields() {
        let store = MemoryStore::new();
        let service = BookmarkService::new(&store);
        let mut new = draft(77, "  Chocobo farm ");
        new.note = Some("   ".to_string());
        let (bookmark, notification) = service.add(new, TOTAL).await.unwrap();
        assert_eq!(bookmark.title, "Chocobo farm");
        assert_eq!(bookmark.note, None);
        assert!(!bookmark.is_current_position);
        assert_eq!(
            notification,
            Notification::BookmarkAdded {
                id: bookmark.id.clone(),
                line: 77
            }
        );
        assert_eq!(service.get_current_position("g").await.unwrap(), None);
    }
}
