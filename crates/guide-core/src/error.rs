//! Error types shared by the reader core.

use thiserror::Error;

/// Failures reported by a [`GuideStore`](crate::store::GuideStore) implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O failed at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {message}")]
    Decode { path: String, message: String },

    #[error("failed to encode {what}: {message}")]
    Encode { what: &'static str, message: String },

    #[error("store is unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced to the caller of reader operations.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// Rejected before any I/O; the caller shows a message and does not retry.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("line {line} is outside the guide (1..={total})")]
    LineOutOfRange { line: usize, total: usize },

    /// An id that should exist does not; usually a stale id after a
    /// current-position conversion.
    #[error("bookmark not found: {0}")]
    NotFound(String),

    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

impl ReaderError {
    /// Short machine-readable code for the host UI.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid_input",
            Self::LineOutOfRange { .. } => "line_out_of_range",
            Self::NotFound(_) => "not_found",
            Self::Persistence(_) => "persistence_failed",
        }
    }
}
