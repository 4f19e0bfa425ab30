//! Persistence boundary for bookmarks and reading progress.
//!
//! The [`GuideStore`] trait lets the reader run against the on-disk cache
//! ([`FileStore`](crate::cache::FileStore)) or the in-process
//! [`MemoryStore`] used by tests.

use crate::bookmarks::Bookmark;
use crate::error::StoreError;
use crate::progress::Progress;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[async_trait]
pub trait GuideStore: Send + Sync {
    /// Insert or overwrite by `bookmark.id`.
    async fn save_bookmark(&self, bookmark: &Bookmark) -> Result<(), StoreError>;

    /// Removing an id that does not exist is not an error at this layer.
    async fn delete_bookmark(&self, id: &str) -> Result<(), StoreError>;

    async fn get_bookmarks(&self, guide_id: &str) -> Result<Vec<Bookmark>, StoreError>;

    async fn save_progress(&self, progress: &Progress) -> Result<(), StoreError>;

    async fn get_progress(&self, guide_id: &str) -> Result<Option<Progress>, StoreError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    bookmarks: Vec<Bookmark>,
    progress: HashMap<String, Progress>,
}

/// In-process store. Bookmarks keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, to exercise error paths.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> Result<T, StoreError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(f(&mut guard))
    }
}

#[async_trait]
impl GuideStore for MemoryStore {
    async fn save_bookmark(&self, bookmark: &Bookmark) -> Result<(), StoreError> {
        self.check_writable()?;
        self.with_state(|state| {
            match state.bookmarks.iter().position(|b| b.id == bookmark.id) {
                Some(idx) => state.bookmarks[idx] = bookmark.clone(),
                None => state.bookmarks.push(bookmark.clone()),
            }
        })
    }

    async fn delete_bookmark(&self, id: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.with_state(|state| state.bookmarks.retain(|b| b.id != id))
    }

    async fn get_bookmarks(&self, guide_id: &str) -> Result<Vec<Bookmark>, StoreError> {
        self.with_state(|state| {
            state
                .bookmarks
                .iter()
                .filter(|b| b.guide_id == guide_id)
                .cloned()
                .collect()
        })
    }

    async fn save_progress(&self, progress: &Progress) -> Result<(), StoreError> {
        self.check_writable()?;
        self.with_state(|state| {
            state
                .progress
                .insert(progress.guide_id.clone(), progress.clone());
        })
    }

    async fn get_progress(&self, guide_id: &str) -> Result<Option<Progress>, StoreError> {
        self.with_state(|state| state.progress.get(guide_id).cloned())
    }
}
