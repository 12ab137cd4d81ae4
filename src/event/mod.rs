//! Lifecycle events published by the core.
//!
//! Every event family is a struct with a fresh id and timestamp, grouped
//! under the closed [`ReaderEvent`] union. Subscribers match on the union;
//! there is no open event hierarchy to extend.

mod bus;

pub use bus::{EventBus, SubscriberId};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::api::{Book, Chapter};
use crate::command::CommandType;

/// Everything the core can tell its observers.
#[derive(Debug, Clone)]
pub enum ReaderEvent {
    Command(CommandEvent),
    Reading(ReadingEvent),
    Bookshelf(BookshelfEvent),
    Pagination(PaginationEvent),
}

/// Outcome of one command dispatch. Exactly one `Started` and one terminal
/// (`Success` or `Failed`) event are published per dispatched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Started,
    Success,
    Failed,
}

#[derive(Debug, Clone)]
pub struct CommandEvent {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub command_id: Uuid,
    pub command_type: CommandType,
    pub status: CommandStatus,
    /// Human-readable failure reason; `None` for started/success.
    pub message: Option<String>,
}

impl CommandEvent {
    pub fn started(command_id: Uuid, command_type: CommandType) -> Self {
        Self::new(command_id, command_type, CommandStatus::Started, None)
    }

    pub fn success(command_id: Uuid, command_type: CommandType) -> Self {
        Self::new(command_id, command_type, CommandStatus::Success, None)
    }

    pub fn failed(command_id: Uuid, command_type: CommandType, message: impl Into<String>) -> Self {
        Self::new(
            command_id,
            command_type,
            CommandStatus::Failed,
            Some(message.into()),
        )
    }

    fn new(
        command_id: Uuid,
        command_type: CommandType,
        status: CommandStatus,
        message: Option<String>,
    ) -> Self {
        CommandEvent {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            command_id,
            command_type,
            status,
            message,
        }
    }
}

/// Which way a chapter change is headed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
    Jump,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingEventKind {
    ChapterLoading,
    ChapterLoaded,
    ChapterLoadFailed,
    SessionEnded,
}

#[derive(Debug, Clone)]
pub struct ReadingEvent {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: ReadingEventKind,
    pub book: Option<Book>,
    pub chapter: Option<Chapter>,
    pub direction: Option<Direction>,
    /// Chapter text; present only on `ChapterLoaded`.
    pub content: Option<String>,
    /// In-chapter cursor position in UTF-16 code units; present only on
    /// `ChapterLoaded`. Non-zero when a saved position was restored.
    pub chapter_position: Option<usize>,
    pub error: Option<String>,
}

impl ReadingEvent {
    pub fn chapter_loading(book: Book, chapter: Chapter, direction: Direction) -> Self {
        ReadingEvent {
            kind: ReadingEventKind::ChapterLoading,
            book: Some(book),
            chapter: Some(chapter),
            direction: Some(direction),
            ..Self::blank()
        }
    }

    pub fn chapter_loaded(
        book: Book,
        chapter: Chapter,
        content: String,
        direction: Direction,
        chapter_position: usize,
    ) -> Self {
        ReadingEvent {
            kind: ReadingEventKind::ChapterLoaded,
            book: Some(book),
            chapter: Some(chapter),
            direction: Some(direction),
            content: Some(content),
            chapter_position: Some(chapter_position),
            ..Self::blank()
        }
    }

    pub fn chapter_load_failed(
        book: Option<Book>,
        chapter: Option<Chapter>,
        direction: Direction,
        error: impl Into<String>,
    ) -> Self {
        ReadingEvent {
            kind: ReadingEventKind::ChapterLoadFailed,
            book,
            chapter,
            direction: Some(direction),
            error: Some(error.into()),
            ..Self::blank()
        }
    }

    pub fn session_ended(book: Option<Book>) -> Self {
        ReadingEvent {
            kind: ReadingEventKind::SessionEnded,
            book,
            ..Self::blank()
        }
    }

    fn blank() -> Self {
        ReadingEvent {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind: ReadingEventKind::SessionEnded,
            book: None,
            chapter: None,
            direction: None,
            content: None,
            chapter_position: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookshelfEventKind {
    Loading,
    Loaded,
    LoadFailed,
}

#[derive(Debug, Clone)]
pub struct BookshelfEvent {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: BookshelfEventKind,
    pub books: Option<Vec<Book>>,
    pub error: Option<String>,
}

impl BookshelfEvent {
    pub fn loading() -> Self {
        Self::new(BookshelfEventKind::Loading, None, None)
    }

    pub fn loaded(books: Vec<Book>) -> Self {
        Self::new(BookshelfEventKind::Loaded, Some(books), None)
    }

    pub fn load_failed(error: impl Into<String>) -> Self {
        Self::new(BookshelfEventKind::LoadFailed, None, Some(error.into()))
    }

    fn new(kind: BookshelfEventKind, books: Option<Vec<Book>>, error: Option<String>) -> Self {
        BookshelfEvent {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            books,
            error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationEventKind {
    /// A chapter's text was (re)sliced into pages.
    Paginated,
    /// The page cursor moved within the current chapter.
    PageChanged,
}

#[derive(Debug, Clone)]
pub struct PaginationEvent {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: PaginationEventKind,
    /// 1-based for display.
    pub current_page: usize,
    pub total_pages: usize,
    pub content: Option<String>,
}

impl PaginationEvent {
    pub fn paginated(current_page: usize, total_pages: usize) -> Self {
        Self::new(PaginationEventKind::Paginated, current_page, total_pages, None)
    }

    pub fn page_changed(current_page: usize, total_pages: usize, content: String) -> Self {
        Self::new(
            PaginationEventKind::PageChanged,
            current_page,
            total_pages,
            Some(content),
        )
    }

    fn new(
        kind: PaginationEventKind,
        current_page: usize,
        total_pages: usize,
        content: Option<String>,
    ) -> Self {
        PaginationEvent {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            current_page,
            total_pages,
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_events_carry_fresh_ids() {
        let command_id = Uuid::new_v4();
        let started = CommandEvent::started(command_id, CommandType::NextChapter);
        let failed = CommandEvent::failed(command_id, CommandType::NextChapter, "boom");
        assert_ne!(started.event_id, failed.event_id);
        assert_eq!(started.command_id, failed.command_id);
        assert_eq!(started.status, CommandStatus::Started);
        assert_eq!(failed.status, CommandStatus::Failed);
        assert_eq!(failed.message.as_deref(), Some("boom"));
    }

    #[test]
    fn loaded_event_carries_content_and_direction() {
        let event = ReadingEvent::chapter_loaded(
            Book::default(),
            Chapter::placeholder(2),
            "text".to_string(),
            Direction::Next,
            120,
        );
        assert_eq!(event.kind, ReadingEventKind::ChapterLoaded);
        assert_eq!(event.content.as_deref(), Some("text"));
        assert_eq!(event.direction, Some(Direction::Next));
        assert_eq!(event.chapter_position, Some(120));
        assert!(event.error.is_none());
    }
}
