//! The built-in command handlers and their shared chapter-loading flow.

mod back_to_bookshelf;
mod jump_to_chapter;
mod next_chapter;
mod next_page;
mod previous_chapter;
mod previous_page;
mod refresh_bookshelf;
mod select_book;
mod toggle_reading_mode;

#[cfg(test)]
mod tests;

pub use back_to_bookshelf::BackToBookshelfHandler;
pub use jump_to_chapter::JumpToChapterHandler;
pub use next_chapter::NextChapterHandler;
pub use next_page::NextPageHandler;
pub use previous_chapter::PreviousChapterHandler;
pub use previous_page::PreviousPageHandler;
pub use refresh_bookshelf::RefreshBookshelfHandler;
pub use select_book::SelectBookHandler;
pub use toggle_reading_mode::ToggleReadingModeHandler;

use anyhow::{Result, bail};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, warn};

use super::{CommandHandlerRegistry, HandlerContext};
use crate::api::{BookProgress, Chapter};
use crate::event::{Direction, PaginationEvent, ReaderEvent, ReadingEvent};
use crate::session::{ReadingSession, SessionState};

/// Register every built-in handler.
pub fn register_default_handlers(registry: &CommandHandlerRegistry) {
    registry.register(Arc::new(RefreshBookshelfHandler));
    registry.register(Arc::new(SelectBookHandler));
    registry.register(Arc::new(JumpToChapterHandler));
    registry.register(Arc::new(NextChapterHandler));
    registry.register(Arc::new(PreviousChapterHandler));
    registry.register(Arc::new(NextPageHandler));
    registry.register(Arc::new(PreviousPageHandler));
    registry.register(Arc::new(BackToBookshelfHandler));
    registry.register(Arc::new(ToggleReadingModeHandler));
}

/// Shared chapter-navigation flow: claim the loading state, advance the
/// store optimistically, fetch, and on failure undo with the inverse
/// navigation.
///
/// The `Loading` transition is the gate: the store is touched only after
/// the claim succeeds, and only the claim holder ever applies `rollback`.
/// A concurrent command that loses the claim fails without mutating
/// anything. Exactly one reading event is published per outcome
/// (`ChapterLoaded` or `ChapterLoadFailed`), after the initial
/// `ChapterLoading`.
pub(crate) async fn load_chapter<A, R>(
    ctx: &HandlerContext,
    direction: Direction,
    advance: A,
    rollback: R,
) -> Result<()>
where
    A: FnOnce(&ReadingSession) -> ReadingSession,
    R: FnOnce(&ReadingSession) -> ReadingSession,
{
    if ctx.state.is_loading() {
        bail!("another chapter load is in progress");
    }
    if !ctx.state.transition(SessionState::Loading) {
        bail!("cannot start a chapter load from {:?}", ctx.state.state());
    }

    let Some(session) = ctx.store.update(advance) else {
        // Session vanished after the claim; hand it back.
        ctx.state.transition(SessionState::Idle);
        bail!("no active reading session");
    };
    let target_index = session.current_chapter_index;

    let chapter = session
        .current_chapter()
        .cloned()
        .unwrap_or_else(|| Chapter::placeholder(target_index));
    ctx.events.publish(ReaderEvent::Reading(ReadingEvent::chapter_loading(
        session.book.clone(),
        chapter.clone(),
        direction,
    )));

    match ctx
        .api
        .fetch_chapter_content(&session.book.book_url, target_index)
        .await
    {
        Ok(content) => {
            let loaded = ctx.store.set_content(content.clone());
            ctx.state.transition(SessionState::Reading);
            ctx.events.publish(ReaderEvent::Reading(ReadingEvent::chapter_loaded(
                session.book.clone(),
                chapter,
                content.clone(),
                direction,
                0,
            )));
            publish_paginated(ctx, &content);
            if let Some(loaded) = loaded {
                sync_progress(ctx, &loaded, 0);
            }
            Ok(())
        }
        Err(err) => {
            ctx.store.update(rollback);
            ctx.state.transition(SessionState::Reading);
            if ctx.config.error_logging {
                error!(
                    book = %session.book.name,
                    chapter = target_index,
                    "Chapter load failed: {err}"
                );
            } else {
                warn!(chapter = target_index, "Chapter load failed: {err}");
            }
            ctx.events.publish(ReaderEvent::Reading(ReadingEvent::chapter_load_failed(
                Some(session.book.clone()),
                Some(chapter),
                direction,
                err.to_string(),
            )));
            bail!("chapter load failed: {err}");
        }
    }
}

/// Re-slice the loaded content and announce the page count.
pub(crate) fn publish_paginated(ctx: &HandlerContext, content: &str) {
    let total = {
        let mut paginator = ctx
            .paginator
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        paginator.paginate(content);
        paginator.total_pages()
    };
    let current = if total == 0 { 0 } else { 1 };
    ctx.events
        .publish(ReaderEvent::Pagination(PaginationEvent::paginated(current, total)));
}

/// Push the session's position to the server on a background task.
/// Failures are logged and dropped; progress sync never blocks reading.
/// `chapter_position` is in UTF-16 code units; plain chapter navigation
/// always starts from 0, a re-opened book carries its saved position.
pub(crate) fn sync_progress(ctx: &HandlerContext, session: &ReadingSession, chapter_position: usize) {
    let api = Arc::clone(&ctx.api);
    let title = session
        .current_chapter()
        .map(|chapter| chapter.title.clone())
        .unwrap_or_default();
    let progress = BookProgress {
        name: session.book.name.clone(),
        author: session.book.author.clone(),
        url: session.book.book_url.clone(),
        index: session.current_chapter_index,
        dur_chapter_index: session.current_chapter_index,
        dur_chapter_title: title,
        dur_chapter_pos: chapter_position,
        dur_chapter_time: Utc::now().timestamp_millis(),
    };
    tokio::spawn(async move {
        if let Err(err) = api.save_progress(progress).await {
            warn!("Progress sync failed: {err}");
        }
    });
}
