use anyhow::{Result, bail};
use async_trait::async_trait;

use super::load_chapter;
use crate::command::{Command, CommandHandler, CommandPayload, CommandType, HandlerContext};
use crate::event::Direction;

/// Jumps to an arbitrary chapter from the table of contents.
pub struct JumpToChapterHandler;

#[async_trait]
impl CommandHandler for JumpToChapterHandler {
    fn supported_type(&self) -> CommandType {
        CommandType::JumpToChapter
    }

    async fn handle(&self, command: &Command, ctx: &HandlerContext) -> Result<()> {
        let Some(CommandPayload::JumpToChapter { chapter_index }) = command.payload else {
            bail!("jump_to_chapter requires a chapter-index payload");
        };
        let Some(session) = ctx.store.session() else {
            bail!("no active reading session");
        };
        if chapter_index >= session.chapters.len() {
            bail!(
                "chapter index {chapter_index} out of range ({} chapters)",
                session.chapters.len()
            );
        }
        let origin = session.current_chapter_index;
        load_chapter(
            ctx,
            Direction::Jump,
            move |session| session.with_chapter_index(chapter_index),
            move |session| session.with_chapter_index(origin),
        )
        .await
    }
}
