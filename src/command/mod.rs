//! User intents and their dispatch machinery.
//!
//! A [`Command`] names an intent; the [`CommandBus`] looks up the matching
//! [`CommandHandler`] in the [`CommandHandlerRegistry`] and runs it, framing
//! each dispatch with exactly one started and one terminal command event.

mod bus;
mod handler;
pub mod handlers;
mod registry;

pub use bus::CommandBus;
pub use handler::{CommandHandler, HandlerContext};
pub use registry::CommandHandlerRegistry;

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

use crate::api::Book;

/// The closed set of intents the core accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    RefreshBookshelf,
    SelectBook,
    JumpToChapter,
    NextChapter,
    PreviousChapter,
    NextPage,
    PreviousPage,
    BackToBookshelf,
    ToggleReadingMode,
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandType::RefreshBookshelf => "refresh_bookshelf",
            CommandType::SelectBook => "select_book",
            CommandType::JumpToChapter => "jump_to_chapter",
            CommandType::NextChapter => "next_chapter",
            CommandType::PreviousChapter => "previous_chapter",
            CommandType::NextPage => "next_page",
            CommandType::PreviousPage => "previous_page",
            CommandType::BackToBookshelf => "back_to_bookshelf",
            CommandType::ToggleReadingMode => "toggle_reading_mode",
        };
        f.write_str(name)
    }
}

/// Typed payloads; only the commands that need arguments carry one.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandPayload {
    SelectBook { book: Book, chapter_index: usize },
    JumpToChapter { chapter_index: usize },
    RefreshBookshelf { address: Option<String> },
}

/// One user intent, stamped with an id and creation time for tracing
/// dispatch outcomes back to their origin.
#[derive(Debug, Clone)]
pub struct Command {
    pub id: Uuid,
    pub kind: CommandType,
    pub payload: Option<CommandPayload>,
    pub timestamp: DateTime<Utc>,
}

impl Command {
    /// A payload-less command.
    pub fn of(kind: CommandType) -> Self {
        Self::with_payload(kind, None)
    }

    pub fn select_book(book: Book, chapter_index: usize) -> Self {
        Self::with_payload(
            CommandType::SelectBook,
            Some(CommandPayload::SelectBook {
                book,
                chapter_index,
            }),
        )
    }

    pub fn jump_to_chapter(chapter_index: usize) -> Self {
        Self::with_payload(
            CommandType::JumpToChapter,
            Some(CommandPayload::JumpToChapter { chapter_index }),
        )
    }

    pub fn refresh_bookshelf(address: Option<String>) -> Self {
        Self::with_payload(
            CommandType::RefreshBookshelf,
            Some(CommandPayload::RefreshBookshelf { address }),
        )
    }

    fn with_payload(kind: CommandType, payload: Option<CommandPayload>) -> Self {
        Command {
            id: Uuid::new_v4(),
            kind,
            payload,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_get_unique_ids() {
        let a = Command::of(CommandType::NextChapter);
        let b = Command::of(CommandType::NextChapter);
        assert_ne!(a.id, b.id);
        assert!(a.payload.is_none());
    }

    #[test]
    fn typed_factories_attach_the_matching_payload() {
        let command = Command::jump_to_chapter(7);
        assert_eq!(command.kind, CommandType::JumpToChapter);
        assert_eq!(
            command.payload,
            Some(CommandPayload::JumpToChapter { chapter_index: 7 })
        );

        let command = Command::refresh_bookshelf(Some("http://10.0.0.2:1122".into()));
        assert!(matches!(
            command.payload,
            Some(CommandPayload::RefreshBookshelf { address: Some(_) })
        ));
    }
}
