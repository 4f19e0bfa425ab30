use crate::bookmarks::Bookmark;
use crate::config::ReaderConfig;
use crate::error::ReaderError;
use crate::gesture::GestureRecognizer;
use crate::line_store::LineStore;
use crate::notifications::Notification;
use crate::progress::{PositionPersistence, Progress};
use crate::scroll::{ScrollController, ScrollEvent, ScrollRequest, ScrollSettings};
use crate::search::{SearchLimits, SearchResult, search};
use crate::viewport::ViewportRange;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, trace};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct RenderedLine {
    pub number: usize,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ReaderSnapshot {
    pub guide_id: String,
    pub total_lines: usize,
    pub logical_line: usize,
    pub scroll_offset: f32,
    pub range: ViewportRange,
    pub lines: Vec<RenderedLine>,
    pub actively_scrolling: bool,
    pub restore_complete: bool,
    pub pending_tap_line: Option<usize>,
    pub search_query: String,
    pub search_results: Vec<SearchResult>,
    pub selected_search_result: Option<usize>,
    pub bookmark_count: usize,
}

#[derive(Debug, Clone)]
pub enum SessionCommand {
    GetSnapshot,
    Load {
        content: String,
        saved: Option<Progress>,
    },
    Scrolled {
        offset: f32,
    },
    Resized {
        viewport_height: f32,
    },
    GotoLine {
        line: usize,
    },
    PageDown,
    PageUp,
    Tap {
        line: usize,
    },
    Tick,
    SearchSetQuery {
        query: String,
    },
    SearchNext,
    SearchPrev,
    BookmarksLoaded {
        bookmarks: Vec<Bookmark>,
    },
    GotoBookmark {
        id: String,
    },
    Teardown,
}

impl SessionCommand {
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetSnapshot => "reader_get_snapshot",
            Self::Load { .. } => "reader_load",
            Self::Scrolled { .. } => "reader_scrolled",
            Self::Resized { .. } => "reader_resized",
            Self::GotoLine { .. } => "reader_goto_line",
            Self::PageDown => "reader_page_down",
            Self::PageUp => "reader_page_up",
            Self::Tap { .. } => "reader_tap",
            Self::Tick => "reader_tick",
            Self::SearchSetQuery { .. } => "reader_search_set_query",
            Self::SearchNext => "reader_search_next",
            Self::SearchPrev => "reader_search_prev",
            Self::BookmarksLoaded { .. } => "reader_bookmarks_loaded",
            Self::GotoBookmark { .. } => "reader_goto_bookmark",
            Self::Teardown => "reader_teardown",
        }
    }
}

/// Side effects the host performs after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ScrollTo(ScrollRequest),
    RangeChanged(ViewportRange),
    /// Best-effort; see [`persist_progress`](crate::progress::persist_progress).
    SaveProgress(Progress),
    /// A double-tap asked to mark this line as the current position.
    SetCurrentPosition { guide_id: String, line: usize },
    Notify(Notification),
}

/// Reading state for one guide.
///
/// `apply` never performs I/O. Everything that touches the store or the
/// scroll surface comes back as an [`Effect`].
#[derive(Debug, Clone)]
pub struct ReaderSession {
    guide_id: String,
    lines: LineStore,
    scroll: ScrollController,
    gestures: GestureRecognizer,
    persistence: PositionPersistence,
    search_limits: SearchLimits,
    search_query: String,
    search_results: Vec<SearchResult>,
    selected_search_result: Option<usize>,
    bookmarks: Vec<Bookmark>,
    torn_down: bool,
}

impl ReaderSession {
    pub fn new(guide_id: impl Into<String>, config: &ReaderConfig) -> Self {
        let guide_id = guide_id.into();
        Self {
            lines: LineStore::new(),
            scroll: ScrollController::new(ScrollSettings::from(config)),
            gestures: GestureRecognizer::new(config.double_tap_window()),
            persistence: PositionPersistence::new(guide_id.clone(), config.save_debounce()),
            search_limits: SearchLimits::from(config),
            search_query: String::new(),
            search_results: Vec::new(),
            selected_search_result: None,
            bookmarks: Vec::new(),
            torn_down: false,
            guide_id,
        }
    }

    pub fn guide_id(&self) -> &str {
        &self.guide_id
    }

    pub fn total_lines(&self) -> usize {
        self.lines.line_count()
    }

    pub fn logical_line(&self) -> usize {
        self.scroll.logical_line()
    }

    pub fn lines(&self) -> &LineStore {
        &self.lines
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Progress record for the logical line, once the saved position has
    /// been restored. Hosts use it for a final save before teardown.
    pub fn progress_now(&self) -> Option<Progress> {
        (self.scroll.restore_complete() && !self.lines.is_empty())
            .then(|| self.persistence.progress_for(self.scroll.logical_line()))
    }

    pub fn snapshot(&self, now: Instant) -> ReaderSnapshot {
        let range = self.scroll.range();
        ReaderSnapshot {
            guide_id: self.guide_id.clone(),
            total_lines: self.lines.line_count(),
            logical_line: self.scroll.logical_line(),
            scroll_offset: self.scroll.scroll_offset(),
            range,
            lines: self
                .lines
                .lines_in(range)
                .map(|(number, text)| RenderedLine {
                    number,
                    text: text.to_string(),
                })
                .collect(),
            actively_scrolling: self.scroll.is_actively_scrolling(now),
            restore_complete: self.scroll.restore_complete(),
            pending_tap_line: self.gestures.pending_line(),
            search_query: self.search_query.clone(),
            search_results: self.search_results.clone(),
            selected_search_result: self.selected_search_result,
            bookmark_count: self.bookmarks.len(),
        }
    }

    pub fn apply(&mut self, command: SessionCommand, now: Instant) -> Vec<Effect> {
        let action = command.action();
        if self.torn_down {
            trace!(action, "Ignoring command after teardown");
            return Vec::new();
        }
        if !matches!(command, SessionCommand::Tick) {
            trace!(action, "Applying reader command");
        }

        let mut effects = Vec::new();
        let mut events = Vec::new();
        match command {
            SessionCommand::GetSnapshot => {}
            SessionCommand::Load { content, saved } => self.load(&content, saved, now, &mut events),
            SessionCommand::Scrolled { offset } => self.scroll.on_scroll(offset, now),
            SessionCommand::Resized { viewport_height } => {
                self.scroll.set_viewport_height(viewport_height, &mut events)
            }
            SessionCommand::GotoLine { line } => self.scroll.goto_line(line, now, &mut events),
            SessionCommand::PageDown => self.scroll.page_down(now, &mut events),
            SessionCommand::PageUp => self.scroll.page_up(now, &mut events),
            SessionCommand::Tap { line } => self.tap(line, now, &mut effects),
            SessionCommand::Tick => {
                self.scroll.tick(now, &mut events);
                self.gestures.tick(now);
            }
            SessionCommand::SearchSetQuery { query } => self.set_search_query(query),
            SessionCommand::SearchNext => self.search_next(now, &mut events),
            SessionCommand::SearchPrev => self.search_prev(now, &mut events),
            SessionCommand::BookmarksLoaded { bookmarks } => self.set_bookmarks(bookmarks),
            SessionCommand::GotoBookmark { id } => {
                self.goto_bookmark(&id, now, &mut events, &mut effects)
            }
            SessionCommand::Teardown => {
                self.teardown();
                return Vec::new();
            }
        }

        self.absorb_scroll_events(events, now, &mut effects);
        let actively_scrolling = self.scroll.is_actively_scrolling(now);
        if let Some(progress) = self.persistence.tick(now, actively_scrolling) {
            effects.push(Effect::SaveProgress(progress));
        }
        effects
    }

    fn load(
        &mut self,
        content: &str,
        saved: Option<Progress>,
        now: Instant,
        events: &mut Vec<ScrollEvent>,
    ) {
        if !self.lines.load(content) && self.scroll.total_lines() == self.lines.line_count() {
            debug!(guide_id = %self.guide_id, "Guide content unchanged; keeping viewport");
            return;
        }
        self.persistence.begin_loading();
        self.gestures.reset();

        let total = self.lines.line_count();
        self.scroll.reset(total, events);
        self.persistence.finish_loading(total);
        self.refresh_search();
        info!(guide_id = %self.guide_id, total_lines = total, "Loaded guide");

        let restore_line = saved
            .filter(|progress| progress.guide_id == self.guide_id)
            .map(|progress| progress.line)
            .filter(|_| total > 0);
        self.scroll.schedule_initial_restore(restore_line, now, events);
    }

    fn absorb_scroll_events(
        &mut self,
        events: Vec<ScrollEvent>,
        now: Instant,
        effects: &mut Vec<Effect>,
    ) {
        for event in events {
            match event {
                ScrollEvent::ScrollTo(request) => effects.push(Effect::ScrollTo(request)),
                ScrollEvent::RangeChanged(range) => effects.push(Effect::RangeChanged(range)),
                ScrollEvent::LogicalLineChanged(line) => {
                    let actively_scrolling = self.scroll.is_actively_scrolling(now);
                    self.persistence
                        .on_position_changed(line, now, actively_scrolling);
                }
                ScrollEvent::RestoreCompleted => self.persistence.mark_restore_complete(),
                ScrollEvent::Settled => {}
            }
        }
    }

    fn tap(&mut self, line: usize, now: Instant, effects: &mut Vec<Effect>) {
        if line == 0 || line > self.lines.line_count() {
            debug!(line, "Ignoring tap outside the guide");
            return;
        }
        if let Some(double_tap) = self.gestures.tap(line, now) {
            info!(line = double_tap.line, "Double tap; marking current position");
            effects.push(Effect::SetCurrentPosition {
                guide_id: self.guide_id.clone(),
                line: double_tap.line,
            });
        }
    }

    pub fn set_search_query(&mut self, query: String) {
        self.search_query = query;
        self.refresh_search();
    }

    fn refresh_search(&mut self) {
        self.search_results = search(self.lines.iter(), &self.search_query, self.search_limits);
        self.selected_search_result = None;
    }

    fn search_next(&mut self, now: Instant, events: &mut Vec<ScrollEvent>) {
        if self.search_results.is_empty() {
            self.selected_search_result = None;
            return;
        }
        let next = match self.selected_search_result {
            Some(current) => (current + 1) % self.search_results.len(),
            None => 0,
        };
        self.select_search_result(next, now, events);
    }

    fn search_prev(&mut self, now: Instant, events: &mut Vec<ScrollEvent>) {
        if self.search_results.is_empty() {
            self.selected_search_result = None;
            return;
        }
        let prev = match self.selected_search_result {
            Some(0) | None => self.search_results.len() - 1,
            Some(current) => current - 1,
        };
        self.select_search_result(prev, now, events);
    }

    fn select_search_result(&mut self, idx: usize, now: Instant, events: &mut Vec<ScrollEvent>) {
        self.selected_search_result = Some(idx);
        if let Some(result) = self.search_results.get(idx) {
            let line = result.line;
            self.scroll.goto_line(line, now, events);
        }
    }

    fn set_bookmarks(&mut self, bookmarks: Vec<Bookmark>) {
        let guide_id = &self.guide_id;
        self.bookmarks = bookmarks
            .into_iter()
            .filter(|bookmark| &bookmark.guide_id == guide_id)
            .collect();
    }

    fn goto_bookmark(
        &mut self,
        id: &str,
        now: Instant,
        events: &mut Vec<ScrollEvent>,
        effects: &mut Vec<Effect>,
    ) {
        match self.bookmarks.iter().find(|bookmark| bookmark.id == id) {
            Some(bookmark) => {
                let line = bookmark.line;
                self.scroll.goto_line(line, now, events);
            }
            None => {
                let err = ReaderError::NotFound(id.to_string());
                effects.push(Effect::Notify(Notification::failed("goto_bookmark", &err)));
            }
        }
    }

    fn teardown(&mut self) {
        self.scroll.teardown();
        self.gestures.reset();
        self.persistence.cancel();
        self.torn_down = true;
        info!(guide_id = %self.guide_id, "Reader session torn down");
    }
}
