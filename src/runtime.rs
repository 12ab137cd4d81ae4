//! Explicit wiring of the core's components.

use std::sync::{Arc, Mutex};
use tracing::info;

use crate::api::ContentApi;
use crate::command::handlers::register_default_handlers;
use crate::command::{Command, CommandBus, CommandHandlerRegistry, HandlerContext};
use crate::config::CoreConfig;
use crate::event::{EventBus, ReaderEvent, SubscriberId};
use crate::pagination::Paginator;
use crate::session::{SessionStateMachine, SessionStore};

/// Owns one fully wired instance of the reading core.
///
/// Construction builds every component, registers the built-in handlers,
/// and hands the handler context a weak back-reference to the command bus
/// so page handlers can chain chapter commands. Nothing here is global;
/// two runtimes in one process do not share state.
pub struct ReaderRuntime {
    bus: Arc<CommandBus>,
    events: Arc<EventBus>,
    store: Arc<SessionStore>,
    state: Arc<SessionStateMachine>,
    registry: Arc<CommandHandlerRegistry>,
}

impl ReaderRuntime {
    pub fn new(api: Arc<dyn ContentApi>, config: CoreConfig) -> Self {
        let config = config.normalized();
        let events = Arc::new(EventBus::new());
        let store = Arc::new(SessionStore::new());
        let state = Arc::new(SessionStateMachine::new());
        let paginator = Arc::new(Mutex::new(Paginator::new(config.page_size)));

        let ctx = Arc::new(HandlerContext::new(
            Arc::clone(&events),
            Arc::clone(&store),
            Arc::clone(&state),
            paginator,
            api,
            config,
        ));

        let registry = Arc::new(CommandHandlerRegistry::new());
        register_default_handlers(&registry);

        let bus = Arc::new(CommandBus::new(
            Arc::clone(&registry),
            Arc::clone(&events),
            Arc::clone(&ctx),
        ));
        ctx.attach_bus(&bus);

        info!(handlers = registry.len(), "Reader runtime wired");

        ReaderRuntime {
            bus,
            events,
            store,
            state,
            registry,
        }
    }

    /// Dispatch a command and wait for its terminal event.
    pub async fn dispatch(&self, command: Command) {
        self.bus.dispatch(command).await;
    }

    /// Dispatch a command on a background task.
    pub fn dispatch_async(&self, command: Command) {
        self.bus.dispatch_async(command);
    }

    pub fn subscribe<F>(&self, subscriber: F) -> SubscriberId
    where
        F: Fn(&ReaderEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(subscriber)
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.events.unsubscribe(id);
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn state(&self) -> &Arc<SessionStateMachine> {
        &self.state
    }

    pub fn registry(&self) -> &Arc<CommandHandlerRegistry> {
        &self.registry
    }

    pub fn command_bus(&self) -> &Arc<CommandBus> {
        &self.bus
    }
}
