use super::{ReaderApp, render};
use guide_core::{Effect, SessionCommand, persist_progress};
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, trace};

impl ReaderApp {
    /// Apply `command` and run its effects, feeding any follow-up commands
    /// back into the session until none remain.
    pub(super) async fn dispatch(&mut self, command: SessionCommand) {
        let mut queue = VecDeque::from([command]);
        while let Some(command) = queue.pop_front() {
            let effects = self.session.apply(command, Instant::now());
            for effect in effects {
                if let Some(follow_up) = self.run_effect(effect).await {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    async fn run_effect(&mut self, effect: Effect) -> Option<SessionCommand> {
        match effect {
            Effect::ScrollTo(request) => {
                debug!(
                    offset = request.offset,
                    animated = request.animated,
                    "Scrolling surface"
                );
                self.surface_offset = request.offset;
                // The surface reports its new offset like any other scroll.
                Some(SessionCommand::Scrolled {
                    offset: self.surface_offset,
                })
            }
            Effect::RangeChanged(range) => {
                trace!(start = range.start, end = range.end, "Materialized range updated");
                None
            }
            Effect::SaveProgress(progress) => {
                persist_progress(&self.store, &progress).await;
                None
            }
            Effect::SetCurrentPosition { line, .. } => self.mark_current_position(line).await,
            Effect::Notify(notification) => {
                println!("{}", render::notification(&notification));
                None
            }
        }
    }
}
