//! Handler contract and the shared context handlers run against.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use super::bus::CommandBus;
use super::{Command, CommandType};
use crate::api::ContentApi;
use crate::config::CoreConfig;
use crate::event::EventBus;
use crate::pagination::Paginator;
use crate::session::{SessionStateMachine, SessionStore};

/// One unit of command-processing behavior.
///
/// A handler owns everything between the started and terminal command
/// events: guard checks, state transitions, store updates, fetches, and the
/// domain events in between. Returning `Err` makes the bus publish the
/// failed event with the error's message; `Ok` yields the success event.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// The single command type this handler accepts.
    fn supported_type(&self) -> CommandType;

    /// Final say on whether the handler will take this command.
    fn can_handle(&self, command: &Command) -> bool {
        command.kind == self.supported_type()
    }

    async fn handle(&self, command: &Command, ctx: &HandlerContext) -> Result<()>;
}

/// Shared collaborators handed to every handler.
///
/// Wired once by the runtime; nothing here is a process-wide global. The
/// command bus back-reference is weak to break the bus -> context -> bus
/// cycle, and is attached after the bus exists.
pub struct HandlerContext {
    pub events: Arc<EventBus>,
    pub store: Arc<SessionStore>,
    pub state: Arc<SessionStateMachine>,
    pub paginator: Arc<Mutex<Paginator>>,
    pub api: Arc<dyn ContentApi>,
    pub config: CoreConfig,
    reading_mode: AtomicBool,
    bus: OnceLock<Weak<CommandBus>>,
}

impl HandlerContext {
    pub fn new(
        events: Arc<EventBus>,
        store: Arc<SessionStore>,
        state: Arc<SessionStateMachine>,
        paginator: Arc<Mutex<Paginator>>,
        api: Arc<dyn ContentApi>,
        config: CoreConfig,
    ) -> Self {
        HandlerContext {
            events,
            store,
            state,
            paginator,
            api,
            config,
            reading_mode: AtomicBool::new(false),
            bus: OnceLock::new(),
        }
    }

    /// Give handlers a way to dispatch follow-up commands. Called once
    /// during runtime wiring; later calls are ignored.
    pub fn attach_bus(&self, bus: &Arc<CommandBus>) {
        let _ = self.bus.set(Arc::downgrade(bus));
    }

    /// The command bus, if wiring has completed and the bus is still alive.
    pub fn command_bus(&self) -> Option<Arc<CommandBus>> {
        self.bus.get().and_then(Weak::upgrade)
    }

    /// Flip the reading-mode flag and return the new value.
    pub fn toggle_reading_mode(&self) -> bool {
        !self.reading_mode.fetch_xor(true, Ordering::AcqRel)
    }

    pub fn reading_mode(&self) -> bool {
        self.reading_mode.load(Ordering::Acquire)
    }
}
