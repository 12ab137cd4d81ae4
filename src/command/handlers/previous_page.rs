use anyhow::{Result, bail};
use async_trait::async_trait;
use tracing::debug;

use crate::command::{Command, CommandHandler, CommandType, HandlerContext};
use crate::event::{PaginationEvent, ReaderEvent};
use crate::session::SessionState;

/// Turns back one page, or chains into a previous-chapter load when the
/// cursor is already on the first page.
pub struct PreviousPageHandler;

#[async_trait]
impl CommandHandler for PreviousPageHandler {
    fn supported_type(&self) -> CommandType {
        CommandType::PreviousPage
    }

    async fn handle(&self, _command: &Command, ctx: &HandlerContext) -> Result<()> {
        if !ctx.store.has_session() {
            bail!("no active reading session");
        }

        let turned = {
            let mut paginator = ctx
                .paginator
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if paginator.is_first_page() {
                None
            } else if !ctx.state.transition(SessionState::Paging) {
                bail!("cannot turn pages from {:?}", ctx.state.state());
            } else {
                let page = paginator.previous_page().map(|page| page.content.clone());
                let event = page.as_ref().map(|content| {
                    PaginationEvent::page_changed(
                        paginator.current_index() + 1,
                        paginator.total_pages(),
                        content.clone(),
                    )
                });
                ctx.state.transition(SessionState::Reading);
                event
            }
        };

        match turned {
            Some(event) => {
                ctx.events.publish(ReaderEvent::Pagination(event));
                Ok(())
            }
            None => {
                debug!("First page reached; stepping back a chapter");
                let Some(bus) = ctx.command_bus() else {
                    bail!("already at the first page");
                };
                bus.dispatch_async(Command::of(CommandType::PreviousChapter));
                Ok(())
            }
        }
    }
}
