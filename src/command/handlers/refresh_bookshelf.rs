use anyhow::{Result, bail};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::command::{Command, CommandHandler, CommandPayload, CommandType, HandlerContext};
use crate::event::{BookshelfEvent, ReaderEvent};

/// Re-fetches the bookshelf from the content server.
///
/// A payload may name a different remote address; pointing the client there
/// is the embedder's job, so the request is logged and the wired API is
/// used either way.
pub struct RefreshBookshelfHandler;

#[async_trait]
impl CommandHandler for RefreshBookshelfHandler {
    fn supported_type(&self) -> CommandType {
        CommandType::RefreshBookshelf
    }

    async fn handle(&self, command: &Command, ctx: &HandlerContext) -> Result<()> {
        if let Some(CommandPayload::RefreshBookshelf {
            address: Some(ref address),
        }) = command.payload
        {
            info!(%address, "Bookshelf refresh requested for explicit address");
        }

        ctx.events
            .publish(ReaderEvent::Bookshelf(BookshelfEvent::loading()));

        match ctx.api.fetch_bookshelf().await {
            Ok(books) => {
                info!(count = books.len(), "Bookshelf refreshed");
                ctx.events
                    .publish(ReaderEvent::Bookshelf(BookshelfEvent::loaded(books)));
                Ok(())
            }
            Err(err) => {
                warn!("Bookshelf refresh failed: {err}");
                ctx.events.publish(ReaderEvent::Bookshelf(BookshelfEvent::load_failed(
                    err.to_string(),
                )));
                bail!("bookshelf refresh failed: {err}");
            }
        }
    }
}
