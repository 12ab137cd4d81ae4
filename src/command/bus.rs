//! Command dispatch.

use std::sync::Arc;
use tracing::{error, info, warn};

use super::{Command, CommandHandlerRegistry, HandlerContext};
use crate::event::{CommandEvent, EventBus, ReaderEvent};

/// Routes commands to their handlers and frames each dispatch with command
/// events: one `Started`, then exactly one of `Success` or `Failed`.
pub struct CommandBus {
    registry: Arc<CommandHandlerRegistry>,
    events: Arc<EventBus>,
    ctx: Arc<HandlerContext>,
}

impl CommandBus {
    pub fn new(
        registry: Arc<CommandHandlerRegistry>,
        events: Arc<EventBus>,
        ctx: Arc<HandlerContext>,
    ) -> Self {
        CommandBus {
            registry,
            events,
            ctx,
        }
    }

    pub fn registry(&self) -> &CommandHandlerRegistry {
        &self.registry
    }

    pub fn context(&self) -> &HandlerContext {
        &self.ctx
    }

    /// Dispatch and wait for the handler to finish.
    pub async fn dispatch(&self, command: Command) {
        let Some(handler) = self.registry.get(command.kind) else {
            warn!(kind = %command.kind, id = %command.id, "No handler registered");
            self.events.publish(ReaderEvent::Command(CommandEvent::failed(
                command.id,
                command.kind,
                format!("no handler registered for {}", command.kind),
            )));
            return;
        };

        if !handler.can_handle(&command) {
            warn!(kind = %command.kind, id = %command.id, "Handler refused command");
            self.events.publish(ReaderEvent::Command(CommandEvent::failed(
                command.id,
                command.kind,
                format!("handler cannot process {}", command.kind),
            )));
            return;
        }

        info!(kind = %command.kind, id = %command.id, "Dispatching command");
        self.events.publish(ReaderEvent::Command(CommandEvent::started(
            command.id,
            command.kind,
        )));

        match handler.handle(&command, &self.ctx).await {
            Ok(()) => {
                self.events.publish(ReaderEvent::Command(CommandEvent::success(
                    command.id,
                    command.kind,
                )));
            }
            Err(err) => {
                error!(kind = %command.kind, id = %command.id, "Command failed: {err:#}");
                self.events.publish(ReaderEvent::Command(CommandEvent::failed(
                    command.id,
                    command.kind,
                    err.to_string(),
                )));
            }
        }
    }

    /// Fire-and-forget dispatch on a background task.
    pub fn dispatch_async(self: &Arc<Self>, command: Command) {
        let bus = Arc::clone(self);
        tokio::spawn(async move {
            bus.dispatch(command).await;
        });
    }
}
