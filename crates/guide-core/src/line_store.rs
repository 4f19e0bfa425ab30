//! Guide content split into an immutable, ordered sequence of lines.

use crate::viewport::ViewportRange;
use std::ops::Range;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct LineStore {
    source: String,
    spans: Vec<Range<usize>>,
}

impl LineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_content(content: &str) -> Self {
        let mut store = Self::new();
        store.load(content);
        store
    }

    /// Replace the content. Returns `false` and keeps the current lines when
    /// `content` is byte-identical to what is already loaded.
    pub fn load(&mut self, content: &str) -> bool {
        if !self.spans.is_empty() && self.source == content {
            debug!(lines = self.spans.len(), "Skipping reload of identical guide content");
            return false;
        }
        self.source = content.to_string();
        self.spans = split_spans(&self.source);
        debug!(lines = self.spans.len(), "Loaded guide content");
        true
    }

    pub fn line_count(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Line by 1-based number; empty for anything outside `1..=line_count`.
    pub fn line_at(&self, number: usize) -> &str {
        number
            .checked_sub(1)
            .and_then(|idx| self.spans.get(idx))
            .map(|span| &self.source[span.clone()])
            .unwrap_or("")
    }

    /// Lines materialized for `range`, paired with their 1-based numbers.
    pub fn lines_in(&self, range: ViewportRange) -> impl Iterator<Item = (usize, &str)> + '_ {
        let end = range.end.min(self.spans.len());
        let start = range.start.min(end);
        self.spans[start..end]
            .iter()
            .enumerate()
            .map(move |(offset, span)| (start + offset + 1, &self.source[span.clone()]))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.spans.iter().map(|span| &self.source[span.clone()])
    }
}

// Same boundaries as `str::lines`: `\n` or `\r\n`, no phantom trailing line.
fn split_spans(source: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0usize;
    for (idx, byte) in source.bytes().enumerate() {
        if byte == b'\n' {
            let end = if idx > start && source.as_bytes()[idx - 1] == b'\r' {
                idx - 1
            } else {
                idx
            };
            spans.push(start..end);
            start = idx + 1;
        }
    }
    if start < source.len() {
        spans.push(start..source.len());
    }
    spans
}
