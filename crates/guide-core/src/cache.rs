//! On-disk store for bookmarks and reading progress.
//!
//! Each guide gets a directory under the cache root named by a hash of its
//! guide id, holding `bookmarks.toml` and `progress.toml`. Missing files read
//! as empty.

use crate::bookmarks::Bookmark;
use crate::error::StoreError;
use crate::progress::Progress;
use crate::store::GuideStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

const BOOKMARKS_FILE: &str = "bookmarks.toml";
const PROGRESS_FILE: &str = "progress.toml";

/// Stable guide id for a guide file, so bookmarks survive restarts.
pub fn guide_id_for_path(path: &Path) -> String {
    hash_key(&path.as_os_str().to_string_lossy())
}

fn hash_key(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Serialize, Deserialize, Default)]
struct BookmarkFile {
    #[serde(default)]
    bookmarks: Vec<Bookmark>,
}

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn guide_dir(&self, guide_id: &str) -> PathBuf {
        self.root.join(hash_key(guide_id))
    }

    async fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(path).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    async fn write(path: &Path, contents: String) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        fs::write(path, contents).await.map_err(io_err)
    }

    async fn read_bookmark_file(path: &Path) -> Result<Vec<Bookmark>, StoreError> {
        let Some(data) = Self::read_optional(path).await? else {
            return Ok(Vec::new());
        };
        toml::from_str::<BookmarkFile>(&data)
            .map(|file| file.bookmarks)
            .map_err(|err| StoreError::Decode {
                path: path.display().to_string(),
                message: err.to_string(),
            })
    }

    async fn write_bookmark_file(path: &Path, bookmarks: Vec<Bookmark>) -> Result<(), StoreError> {
        let contents =
            toml::to_string(&BookmarkFile { bookmarks }).map_err(|err| StoreError::Encode {
                what: "bookmarks",
                message: err.to_string(),
            })?;
        Self::write(path, contents).await
    }

    /// Remove `id` from one bookmark file; returns whether it was present.
    async fn remove_from(path: &Path, id: &str) -> Result<bool, StoreError> {
        let mut bookmarks = Self::read_bookmark_file(path).await?;
        let before = bookmarks.len();
        bookmarks.retain(|b| b.id != id);
        if bookmarks.len() == before {
            return Ok(false);
        }
        Self::write_bookmark_file(path, bookmarks).await?;
        Ok(true)
    }
}

#[async_trait]
impl GuideStore for FileStore {
    async fn save_bookmark(&self, bookmark: &Bookmark) -> Result<(), StoreError> {
        let path = self.guide_dir(&bookmark.guide_id).join(BOOKMARKS_FILE);
        let mut bookmarks = Self::read_bookmark_file(&path).await?;
        match bookmarks.iter().position(|b| b.id == bookmark.id) {
            Some(idx) => bookmarks[idx] = bookmark.clone(),
            None => bookmarks.push(bookmark.clone()),
        }
        Self::write_bookmark_file(&path, bookmarks).await?;
        debug!(id = %bookmark.id, line = bookmark.line, "Saved bookmark to cache");
        Ok(())
    }

    async fn delete_bookmark(&self, id: &str) -> Result<(), StoreError> {
        // Current-position ids name their guide; everything else needs a scan.
        if let Some(guide_id) = id.strip_prefix("current-position-") {
            let path = self.guide_dir(guide_id).join(BOOKMARKS_FILE);
            if Self::remove_from(&path, id).await? {
                return Ok(());
            }
        }

        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.root.display().to_string(),
                    source,
                });
            }
        };
        loop {
            let entry = entries.next_entry().await.map_err(|source| StoreError::Io {
                path: self.root.display().to_string(),
                source,
            })?;
            let Some(entry) = entry else {
                break;
            };
            let path = entry.path().join(BOOKMARKS_FILE);
            match Self::remove_from(&path, id).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(err) => warn!(path = %path.display(), "Skipping unreadable bookmark file: {err}"),
            }
        }
        Ok(())
    }

    async fn get_bookmarks(&self, guide_id: &str) -> Result<Vec<Bookmark>, StoreError> {
        let path = self.guide_dir(guide_id).join(BOOKMARKS_FILE);
        Ok(Self::read_bookmark_file(&path)
            .await?
            .into_iter()
            .filter(|b| b.guide_id == guide_id)
            .collect())
    }

    async fn save_progress(&self, progress: &Progress) -> Result<(), StoreError> {
        let path = self.guide_dir(&progress.guide_id).join(PROGRESS_FILE);
        let contents = toml::to_string(progress).map_err(|err| StoreError::Encode {
            what: "progress",
            message: err.to_string(),
        })?;
        Self::write(&path, contents).await
    }

    async fn get_progress(&self, guide_id: &str) -> Result<Option<Progress>, StoreError> {
        let path = self.guide_dir(guide_id).join(PROGRESS_FILE);
        let Some(data) = Self::read_optional(&path).await? else {
            return Ok(None);
        };
        toml::from_str(&data)
            .map(Some)
            .map_err(|err| StoreError::Decode {
                path: path.display().to_string(),
                message: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::current_position_id;
    use chrono::Utc;

    fn build_test_bookmark(id: &str, guide_id: &str, line: usize, current: bool) -> Bookmark {
        Bookmark {
            id: id.to_string(),
            guide_id: guide_id.to_string(),
            line,
            title: format!("Line {line}"),
            note: (line % 2 == 0).then(|| "even".to_string()),
            date_created: Utc::now(),
            is_current_position: current,
        }
    }

    #[test]
    fn guide_ids_are_stable_hex_digests() {
        let a = guide_id_for_path(Path::new("/guides/ff7.txt"));
        assert_eq!(a, guide_id_for_path(Path::new("/guides/ff7.txt")));
        assert_ne!(a, guide_id_for_path(Path::new("/guides/ff8.txt")));
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn missing_files_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.get_bookmarks("g").await.unwrap().is_empty());
        assert_eq!(store.get_progress("g").await.unwrap(), None);
        store.delete_bookmark("nope").await.unwrap();
    }

    #[tokio::test]
    async fn bookmarks_persist_across_store_instances() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save_bookmark(&build_test_bookmark("a", "g", 4, false)).await.unwrap();
        store.save_bookmark(&build_test_bookmark("b", "g", 7, false)).await.unwrap();
        store.save_bookmark(&build_test_bookmark("x", "h", 1, false)).await.unwrap();

        let reopened = FileStore::new(dir.path());
        let for_g = reopened.get_bookmarks("g").await.unwrap();
        assert_eq!(for_g.len(), 2);
        assert_eq!(for_g[0].note.as_deref(), Some("even"));
        assert_eq!(for_g[1].note, None);
    }

    #[tokio::test]
    async fn delete_finds_regular_and_current_position_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let current_id = current_position_id("g");
        store.save_bookmark(&build_test_bookmark(&current_id, "g", 3, true)).await.unwrap();
        store.save_bookmark(&build_test_bookmark("reg", "h", 5, false)).await.unwrap();

        store.delete_bookmark(&current_id).await.unwrap();
        store.delete_bookmark("reg").await.unwrap();

        assert!(store.get_bookmarks("g").await.unwrap().is_empty());
        assert!(store.get_bookmarks("h").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn progress_overwrites_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        for line in [10, 20] {
            let progress = Progress {
                guide_id: "g".to_string(),
                line,
                percentage: line as f64 / 100.0,
            };
            store.save_progress(&progress).await.unwrap();
        }
        let stored = store.get_progress("g").await.unwrap().expect("progress");
        assert_eq!(stored.line, 20);
        assert_eq!(stored.percentage, 0.2);
    }

    #[tokio::test]
    async fn corrupt_bookmark_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let path = store.guide_dir("g").join(BOOKMARKS_FILE);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "bookmarks = 7").unwrap();
        assert!(matches!(
            store.get_bookmarks("g").await,
            Err(StoreError::Decode { .. })
        ));
    }
}
