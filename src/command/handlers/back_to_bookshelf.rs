use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::command::{Command, CommandHandler, CommandType, HandlerContext};
use crate::event::{ReaderEvent, ReadingEvent};

/// Ends the reading session and returns to the bookshelf: announces the
/// end, drops the session and pages, and resets the lifecycle to idle.
pub struct BackToBookshelfHandler;

#[async_trait]
impl CommandHandler for BackToBookshelfHandler {
    fn supported_type(&self) -> CommandType {
        CommandType::BackToBookshelf
    }

    async fn handle(&self, _command: &Command, ctx: &HandlerContext) -> Result<()> {
        let book = ctx.store.current_book();
        if let Some(ref book) = book {
            info!(book = %book.name, "Ending reading session");
        }
        ctx.events
            .publish(ReaderEvent::Reading(ReadingEvent::session_ended(book)));
        ctx.store.clear();
        ctx.paginator
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
        ctx.state.reset();
        Ok(())
    }
}
