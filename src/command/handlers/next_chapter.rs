use anyhow::{Result, bail};
use async_trait::async_trait;

use super::load_chapter;
use crate::command::{Command, CommandHandler, CommandType, HandlerContext};
use crate::event::Direction;
use crate::session::ReadingSession;

/// Advances to the following chapter, fetching its content.
pub struct NextChapterHandler;

#[async_trait]
impl CommandHandler for NextChapterHandler {
    fn supported_type(&self) -> CommandType {
        CommandType::NextChapter
    }

    async fn handle(&self, _command: &Command, ctx: &HandlerContext) -> Result<()> {
        let Some(session) = ctx.store.session() else {
            bail!("no active reading session");
        };
        if session.is_last_chapter() {
            bail!("already at the last chapter");
        }
        load_chapter(
            ctx,
            Direction::Next,
            ReadingSession::next_chapter,
            ReadingSession::previous_chapter,
        )
        .await
    }
}
