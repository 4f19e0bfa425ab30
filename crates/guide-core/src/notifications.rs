//! Discrete outcome events for the host UI to surface as toasts.

use crate::error::ReaderError;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum Notification {
    CurrentPositionSet { line: usize },
    PreviousPositionConverted { id: String, line: usize, title: String },
    BookmarkAdded { id: String, line: usize },
    BookmarkUpdated { id: String },
    BookmarkDeleted { id: String },
    OperationFailed { operation: String, code: String, message: String },
}

impl Notification {
    pub fn failed(operation: &str, err: &ReaderError) -> Self {
        Notification::OperationFailed {
            operation: operation.to_string(),
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Notification::OperationFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_kind_tag() {
        let value = serde_json::to_value(Notification::PreviousPositionConverted {
            id: "abc".to_string(),
            line: 10,
            title: "Previous Position (Line 10)".to_string(),
        })
        .unwrap();
        assert_eq!(value["kind"], "previous_position_converted");
        assert_eq!(value["line"], 10);
    }

    #[test]
    fn failure_carries_error_code() {
        let notification =
            Notification::failed("delete_bookmark", &ReaderError::NotFound("x".to_string()));
        assert!(notification.is_failure());
        assert!(matches!(
            notification,
            Notification::OperationFailed { ref code, .. } if code == "not_found"
        ));
    }
}
