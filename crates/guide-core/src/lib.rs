//! Virtualized line viewport and bookmark reconciliation for large plain-text
//! guides.
//!
//! [`ReaderSession`] is the entry point for a host: feed it
//! [`SessionCommand`]s with the current instant and execute the returned
//! [`Effect`]s. Bookmark writes go through [`BookmarkService`] against any
//! [`GuideStore`].

pub mod bindings;
pub mod bookmarks;
pub mod cache;
pub mod config;
pub mod error;
pub mod gesture;
pub mod line_store;
pub mod notifications;
pub mod progress;
pub mod scroll;
pub mod search;
pub mod service;
pub mod session;
pub mod store;
pub mod timer;
pub mod viewport;

pub use bindings::export_ts_bindings;
pub use bookmarks::{Bookmark, BookmarkEdit, NewBookmark};
pub use cache::{FileStore, guide_id_for_path};
pub use config::{LogLevel, ReaderConfig, load_config};
pub use error::{ReaderError, StoreError};
pub use notifications::Notification;
pub use progress::{Progress, persist_progress};
pub use service::BookmarkService;
pub use session::{Effect, ReaderSession, ReaderSnapshot, SessionCommand};
pub use store::{GuideStore, MemoryStore};
