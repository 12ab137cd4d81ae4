use anyhow::{Result, bail};
use async_trait::async_trait;

use super::load_chapter;
use crate::command::{Command, CommandHandler, CommandType, HandlerContext};
use crate::event::Direction;
use crate::session::ReadingSession;

/// Steps back to the preceding chapter, fetching its content.
pub struct PreviousChapterHandler;

#[async_trait]
impl CommandHandler for PreviousChapterHandler {
    fn supported_type(&self) -> CommandType {
        CommandType::PreviousChapter
    }

    async fn handle(&self, _command: &Command, ctx: &HandlerContext) -> Result<()> {
        let Some(session) = ctx.store.session() else {
            bail!("no active reading session");
        };
        if session.is_first_chapter() {
            bail!("already at the first chapter");
        }
        load_chapter(
            ctx,
            Direction::Previous,
            ReadingSession::previous_chapter,
            ReadingSession::next_chapter,
        )
        .await
    }
}
