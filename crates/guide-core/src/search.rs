//! Case-insensitive substring search over the first lines of a guide.

use crate::config::ReaderConfig;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SearchResult {
    /// 1-based line number.
    pub line: usize,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_scan_lines: usize,
    pub max_results: usize,
    pub min_query_len: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits::from(&ReaderConfig::default())
    }
}

impl From<&ReaderConfig> for SearchLimits {
    fn from(config: &ReaderConfig) -> Self {
        SearchLimits {
            max_scan_lines: config.search_max_scan_lines,
            max_results: config.search_max_results,
            min_query_len: config.search_min_query_len,
        }
    }
}

/// One result per matching line, in guide order. Queries shorter than the
/// minimum length return nothing without scanning.
pub fn search<'a, I>(lines: I, query: &str, limits: SearchLimits) -> Vec<SearchResult>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = query.trim();
    if query.is_empty() || query.chars().count() < limits.min_query_len {
        return Vec::new();
    }
    let needle = query.to_lowercase();

    lines
        .into_iter()
        .take(limits.max_scan_lines)
        .enumerate()
        .filter(|(_, line)| line.to_lowercase().contains(&needle))
        .take(limits.max_results)
        .map(|(idx, line)| SearchResult {
            line: idx + 1,
            content: line.to_string(),
        })
        .collect()
}
