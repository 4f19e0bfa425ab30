//! Terminal host for a [`ReaderSession`].
//!
//! Prompt lines and a fixed-rate tick drive the session; the effects it
//! returns are executed in `runtime.rs`.

mod commands;
mod render;
mod runtime;

use anyhow::{Context, Result};
use commands::Input;
use guide_core::{
    BookmarkEdit, BookmarkService, FileStore, GuideStore, NewBookmark, Notification,
    ReaderConfig, ReaderError, ReaderSession, SessionCommand, guide_id_for_path, persist_progress,
};
use std::path::Path;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

pub struct ReaderApp {
    session: ReaderSession,
    store: FileStore,
    config: ReaderConfig,
    /// Offset of the simulated scroll surface.
    surface_offset: f32,
}

impl ReaderApp {
    pub async fn open(path: &Path, config: ReaderConfig) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read guide {}", path.display()))?;
        let guide_id = guide_id_for_path(path);
        let store = FileStore::new(&config.cache_dir);

        let saved = match store.get_progress(&guide_id).await {
            Ok(saved) => saved,
            Err(err) => {
                warn!(%guide_id, "Failed to read saved progress: {err}");
                None
            }
        };
        if let Some(progress) = &saved {
            info!(line = progress.line, "Resuming from saved line");
        }

        let mut app = Self {
            session: ReaderSession::new(guide_id, &config),
            store,
            config,
            surface_offset: 0.0,
        };
        app.dispatch(SessionCommand::Load { content, saved }).await;
        if let Some(command) = app.fetch_bookmarks().await {
            app.dispatch(command).await;
        }
        info!(
            path = %path.display(),
            lines = app.session.total_lines(),
            "Opened guide"
        );
        Ok(app)
    }

    pub async fn run(mut self) -> Result<()> {
        let mut prompt = BufReader::new(tokio::io::stdin()).lines();
        let mut ticker = tokio::time::interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        println!("{}", commands::HELP);
        self.print_view();
        loop {
            tokio::select! {
                _ = ticker.tick() => self.dispatch(SessionCommand::Tick).await,
                line = prompt.next_line() => {
                    let Some(line) = line.context("Failed to read from stdin")? else {
                        break;
                    };
                    match commands::parse(&line) {
                        Ok(Input::Quit) => break,
                        Ok(input) => self.handle(input).await,
                        Err(err) => println!("{err:#}"),
                    }
                }
            }
        }
        self.shutdown().await;
        Ok(())
    }

    async fn handle(&mut self, input: Input) {
        let follow_up = match input {
            Input::Session(command) => {
                let redraw = !matches!(
                    command,
                    SessionCommand::Scrolled { .. } | SessionCommand::Tap { .. }
                );
                self.dispatch(command).await;
                if redraw {
                    self.print_view();
                }
                None
            }
            Input::Mark => {
                self.mark_current_position(self.session.logical_line())
                    .await
            }
            Input::AddBookmark { title } => self.add_bookmark(title).await,
            Input::Rename { id, title } => {
                let edit = BookmarkEdit {
                    title: Some(title),
                    ..BookmarkEdit::default()
                };
                self.update_bookmark(&id, edit).await
            }
            Input::Note { id, note } => {
                let edit = BookmarkEdit {
                    note: Some(note),
                    ..BookmarkEdit::default()
                };
                self.update_bookmark(&id, edit).await
            }
            Input::Move { id, line } => {
                let edit = BookmarkEdit {
                    line: Some(line),
                    ..BookmarkEdit::default()
                };
                self.update_bookmark(&id, edit).await
            }
            Input::Remove { id } => self.delete_bookmark(&id).await,
            Input::List => {
                self.print_bookmarks().await;
                None
            }
            Input::View => {
                self.print_view();
                None
            }
            Input::Json => {
                self.print_json();
                None
            }
            Input::Help => {
                println!("{}", commands::HELP);
                None
            }
            Input::Quit => None,
        };
        if let Some(command) = follow_up {
            self.dispatch(command).await;
        }
    }

    async fn add_bookmark(&self, title: String) -> Option<SessionCommand> {
        let draft = NewBookmark {
            guide_id: self.session.guide_id().to_string(),
            line: self.session.logical_line(),
            title,
            note: None,
        };
        let total = self.session.total_lines();
        let result = BookmarkService::new(&self.store).add(draft, total).await;
        self.report_bookmark_op("add_bookmark", result.map(|(_, note)| vec![note]))
            .await
    }

    async fn update_bookmark(&self, id: &str, edit: BookmarkEdit) -> Option<SessionCommand> {
        let total = self.session.total_lines();
        let result = BookmarkService::new(&self.store)
            .update(self.session.guide_id(), id, &edit, total)
            .await;
        self.report_bookmark_op("update_bookmark", result.map(|(_, note)| vec![note]))
            .await
    }

    async fn delete_bookmark(&self, id: &str) -> Option<SessionCommand> {
        let result = BookmarkService::new(&self.store)
            .delete(self.session.guide_id(), id)
            .await;
        self.report_bookmark_op("delete_bookmark", result.map(|note| vec![note]))
            .await
    }

    pub(super) async fn mark_current_position(&self, line: usize) -> Option<SessionCommand> {
        let total = self.session.total_lines();
        let result = BookmarkService::new(&self.store)
            .set_current_position(self.session.guide_id(), line, total)
            .await;
        self.report_bookmark_op("set_current_position", result)
            .await
    }

    /// Print the outcome. On success the refreshed bookmark list comes back
    /// as a command for the session.
    async fn report_bookmark_op(
        &self,
        operation: &str,
        result: Result<Vec<Notification>, ReaderError>,
    ) -> Option<SessionCommand> {
        match result {
            Ok(notifications) => {
                for notification in &notifications {
                    println!("{}", render::notification(notification));
                }
                self.fetch_bookmarks().await
            }
            Err(err) => {
                warn!(operation, code = err.code(), "Bookmark operation failed: {err}");
                println!("{}", render::notification(&Notification::failed(operation, &err)));
                None
            }
        }
    }

    async fn fetch_bookmarks(&self) -> Option<SessionCommand> {
        match self.store.get_bookmarks(self.session.guide_id()).await {
            Ok(bookmarks) => Some(SessionCommand::BookmarksLoaded { bookmarks }),
            Err(err) => {
                warn!("Failed to load bookmarks: {err}");
                None
            }
        }
    }

    async fn print_bookmarks(&self) {
        match BookmarkService::new(&self.store)
            .list_for_display(self.session.guide_id())
            .await
        {
            Ok((current, regular)) => println!("{}", render::bookmarks(current.as_ref(), &regular)),
            Err(err) => println!(
                "{}",
                render::notification(&Notification::failed("list_bookmarks", &err))
            ),
        }
    }

    fn visible_rows(&self) -> usize {
        ((self.config.viewport_height_px / self.config.line_height_px).floor() as usize).max(1)
    }

    fn print_view(&self) {
        let snapshot = self.session.snapshot(Instant::now());
        println!("{}", render::viewport(&snapshot, self.visible_rows()));
    }

    fn print_json(&self) {
        let snapshot = self.session.snapshot(Instant::now());
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(err) => warn!("Failed to serialize snapshot: {err}"),
        }
    }

    /// Save the final position, then stop every timer.
    async fn shutdown(&mut self) {
        if let Some(progress) = self.session.progress_now() {
            persist_progress(&self.store, &progress).await;
        }
        self.dispatch(SessionCommand::Teardown).await;
        info!("Reader closed");
    }
}
