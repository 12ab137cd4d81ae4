use anyhow::{Result, bail};
use async_trait::async_trait;
use tracing::{error, info, warn};

use super::{publish_paginated, sync_progress};
use crate::command::{Command, CommandHandler, CommandPayload, CommandType, HandlerContext};
use crate::event::{Direction, ReaderEvent, ReadingEvent};
use crate::session::{ReadingSession, SessionState};

/// Opens a book from the bookshelf: fetches its chapter list and the first
/// chapter to show, then establishes the reading session.
///
/// There is no prior chapter to fall back to here, so a failed open lands
/// in the error state rather than rolling back.
pub struct SelectBookHandler;

#[async_trait]
impl CommandHandler for SelectBookHandler {
    fn supported_type(&self) -> CommandType {
        CommandType::SelectBook
    }

    async fn handle(&self, command: &Command, ctx: &HandlerContext) -> Result<()> {
        let Some(CommandPayload::SelectBook {
            book,
            chapter_index,
        }) = command.payload.clone()
        else {
            bail!("select_book requires a book payload");
        };

        if ctx.state.is_loading() {
            bail!("another chapter load is in progress");
        }
        if !ctx.state.transition(SessionState::Loading) {
            bail!("cannot open a book from {:?}", ctx.state.state());
        }

        info!(book = %book.name, chapter = chapter_index, "Opening book");

        let opened = async {
            let chapters = ctx.api.fetch_chapter_list(&book.book_url).await?;
            if chapter_index >= chapters.len() && !chapters.is_empty() {
                return Err(anyhow::anyhow!(
                    "chapter index {chapter_index} out of range ({} chapters)",
                    chapters.len()
                ));
            }
            let chapter = chapters
                .get(chapter_index)
                .cloned()
                .unwrap_or_else(|| crate::api::Chapter::placeholder(chapter_index));
            ctx.events.publish(ReaderEvent::Reading(ReadingEvent::chapter_loading(
                book.clone(),
                chapter.clone(),
                Direction::Jump,
            )));
            let content = ctx
                .api
                .fetch_chapter_content(&book.book_url, chapter_index)
                .await?;
            Ok::<_, anyhow::Error>((chapters, chapter, content))
        }
        .await;

        match opened {
            Ok((chapters, chapter, content)) => {
                // Re-opening the chapter the server last saw restores the
                // saved in-chapter position; any other chapter starts at 0.
                let chapter_position = if chapter_index == book.dur_chapter_index {
                    book.dur_chapter_pos
                } else {
                    0
                };
                let session = ReadingSession::new(book.clone(), chapters, chapter_index)
                    .with_content(content.clone());
                ctx.store.set_session(session.clone());
                ctx.state.transition(SessionState::Reading);
                ctx.events.publish(ReaderEvent::Reading(ReadingEvent::chapter_loaded(
                    book,
                    chapter,
                    content.clone(),
                    Direction::Jump,
                    chapter_position,
                )));
                publish_paginated(ctx, &content);
                sync_progress(ctx, &session, chapter_position);
                Ok(())
            }
            Err(err) => {
                ctx.state.transition(SessionState::Error);
                if ctx.config.error_logging {
                    error!(book = %book.name, "Failed to open book: {err}");
                } else {
                    warn!(book = %book.name, "Failed to open book: {err}");
                }
                ctx.events.publish(ReaderEvent::Reading(ReadingEvent::chapter_load_failed(
                    Some(book),
                    None,
                    Direction::Jump,
                    err.to_string(),
                )));
                bail!("failed to open book: {err}");
            }
        }
    }
}
