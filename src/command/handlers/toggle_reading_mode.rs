use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::command::{Command, CommandHandler, CommandType, HandlerContext};

/// Flips the reading-mode flag (e.g. scroll vs. paged presentation).
pub struct ToggleReadingModeHandler;

#[async_trait]
impl CommandHandler for ToggleReadingModeHandler {
    fn supported_type(&self) -> CommandType {
        CommandType::ToggleReadingMode
    }

    async fn handle(&self, _command: &Command, ctx: &HandlerContext) -> Result<()> {
        let enabled = ctx.toggle_reading_mode();
        info!(enabled, "Reading mode toggled");
        Ok(())
    }
}
