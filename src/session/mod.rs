//! Reading-session state: the immutable session value, its store, and the
//! lifecycle state machine.

mod state_machine;
mod store;

pub use state_machine::{SessionState, SessionStateMachine};
pub use store::SessionStore;

use crate::api::{Book, Chapter};

/// A snapshot of what the user is reading.
///
/// The session is a value type: every navigation method returns a new
/// session and leaves the receiver untouched. Changing the chapter index
/// always drops the cached content, because content belongs to exactly one
/// chapter.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingSession {
    pub book: Book,
    pub chapters: Vec<Chapter>,
    pub current_chapter_index: usize,
    pub current_content: Option<String>,
}

impl ReadingSession {
    pub fn new(book: Book, chapters: Vec<Chapter>, current_chapter_index: usize) -> Self {
        ReadingSession {
            book,
            chapters,
            current_chapter_index,
            current_content: None,
        }
    }

    /// Advance one chapter. Inverse of [`previous_chapter`](Self::previous_chapter).
    pub fn next_chapter(&self) -> Self {
        self.with_chapter_index(self.current_chapter_index + 1)
    }

    /// Step back one chapter, saturating at the first.
    pub fn previous_chapter(&self) -> Self {
        self.with_chapter_index(self.current_chapter_index.saturating_sub(1))
    }

    pub fn with_chapter_index(&self, index: usize) -> Self {
        ReadingSession {
            book: self.book.clone(),
            chapters: self.chapters.clone(),
            current_chapter_index: index,
            current_content: None,
        }
    }

    pub fn with_content(&self, content: impl Into<String>) -> Self {
        ReadingSession {
            current_content: Some(content.into()),
            ..self.clone()
        }
    }

    /// The chapter the index points at, if the list is long enough.
    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.chapters.get(self.current_chapter_index)
    }

    pub fn is_last_chapter(&self) -> bool {
        self.chapters.is_empty() || self.current_chapter_index + 1 >= self.chapters.len()
    }

    pub fn is_first_chapter(&self) -> bool {
        self.current_chapter_index == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_chapters(count: usize, index: usize) -> ReadingSession {
        let chapters = (0..count)
            .map(|i| Chapter {
                index: i,
                title: format!("Chapter {}", i + 1),
                ..Chapter::default()
            })
            .collect();
        ReadingSession::new(Book::default(), chapters, index)
    }

    #[test]
    fn next_then_previous_restores_the_index() {
        let session = session_with_chapters(5, 2);
        let advanced = session.next_chapter();
        assert_eq!(advanced.current_chapter_index, 3);
        let restored = advanced.previous_chapter();
        assert_eq!(restored.current_chapter_index, session.current_chapter_index);
    }

    #[test]
    fn previous_saturates_at_the_first_chapter() {
        let session = session_with_chapters(5, 0);
        assert_eq!(session.previous_chapter().current_chapter_index, 0);
    }

    #[test]
    fn changing_chapter_drops_content() {
        let session = session_with_chapters(5, 1).with_content("old text");
        assert!(session.current_content.is_some());
        assert!(session.next_chapter().current_content.is_none());
        assert!(session.with_chapter_index(1).current_content.is_none());
    }

    #[test]
    fn navigation_leaves_the_original_untouched() {
        let session = session_with_chapters(3, 1);
        let _ = session.next_chapter();
        assert_eq!(session.current_chapter_index, 1);
    }

    #[test]
    fn boundary_queries() {
        assert!(session_with_chapters(3, 2).is_last_chapter());
        assert!(!session_with_chapters(3, 1).is_last_chapter());
        assert!(session_with_chapters(3, 0).is_first_chapter());
        assert!(session_with_chapters(0, 0).is_last_chapter());
    }

    #[test]
    fn current_chapter_is_none_past_the_list() {
        let session = session_with_chapters(2, 5);
        assert!(session.current_chapter().is_none());
    }
}
