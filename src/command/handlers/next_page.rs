use anyhow::{Result, bail};
use async_trait::async_trait;
use tracing::debug;

use crate::command::{Command, CommandHandler, CommandType, HandlerContext};
use crate::event::{PaginationEvent, ReaderEvent};
use crate::session::SessionState;

/// Turns to the next page, or chains into a next-chapter load when the
/// cursor is already on the last page.
pub struct NextPageHandler;

#[async_trait]
impl CommandHandler for NextPageHandler {
    fn supported_type(&self) -> CommandType {
        CommandType::NextPage
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
            if paginator.is_last_page() {
                None
            } else if !ctx.state.transition(SessionState::Paging) {
                bail!("cannot turn pages from {:?}", ctx.state.state());
            } else {
                let page = paginator.next_page().map(|page| page.content.clone());
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
                debug!("Last page reached; advancing to the next chapter");
                let Some(bus) = ctx.command_bus() else {
                    bail!("already at the last page");
                };
                bus.dispatch_async(Command::of(CommandType::NextChapter));
                Ok(())
            }
        }
    }
}
