//! Orchestration core for a remote-bookshelf reading client.
//!
//! The surrounding application (panels, keybindings, painting) is a thin
//! shell; everything stateful lives here:
//! - A command bus routes user intents to handlers.
//! - An event bus fans lifecycle notifications out to observers.
//! - A guarded state machine enforces legal session-lifecycle transitions.
//! - A session store holds the current book/chapter/content atomically.
//! - A pagination engine slices chapter text into navigable pages.
//!
//! Construct a [`ReaderRuntime`] with a [`ContentApi`] implementation and a
//! [`CoreConfig`], subscribe to its event bus, and dispatch commands. No
//! component is a process-wide singleton; everything is wired explicitly.

pub mod api;
pub mod command;
pub mod config;
pub mod event;
pub mod pagination;
pub mod runtime;
pub mod session;

pub use api::{ApiError, Book, Chapter, ContentApi, HttpContentApi};
pub use command::{
    Command, CommandBus, CommandHandler, CommandHandlerRegistry, CommandPayload, CommandType,
    HandlerContext,
};
pub use config::{CoreConfig, LogLevel, load_config};
pub use event::{
    BookshelfEvent, BookshelfEventKind, CommandEvent, CommandStatus, Direction, EventBus,
    PaginationEvent, PaginationEventKind, ReaderEvent, ReadingEvent, ReadingEventKind,
    SubscriberId,
};
pub use pagination::{Page, Paginator};
pub use runtime::ReaderRuntime;
pub use session::{ReadingSession, SessionState, SessionStateMachine, SessionStore};

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize tracing for embedders that have no subscriber of their own.
///
/// Level defaults to `info` and can be overridden with `RUST_LOG`. Safe to
/// call when a subscriber is already installed.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_filter(env_filter))
        .try_init();
    if let Err(err) = result {
        warn!("Tracing subscriber already installed: {err}");
    }
}
