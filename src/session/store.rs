//! Atomic holder of the current reading session.

use std::sync::RwLock;
use tracing::debug;

use super::ReadingSession;
use crate::api::{Book, Chapter};

/// Owns the one live [`ReadingSession`], if any.
///
/// Updates run as a closure under the write lock, so a read never observes
/// a half-applied change. Update methods on an absent session are silent
/// no-ops; callers that need to distinguish check [`session`](Self::session)
/// first.
#[derive(Default)]
pub struct SessionStore {
    current: RwLock<Option<ReadingSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the session wholesale.
    pub fn set_session(&self, session: ReadingSession) {
        debug!(
            book = %session.book.name,
            chapter = session.current_chapter_index,
            "Session replaced"
        );
        *self.write_guard() = Some(session);
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Option<ReadingSession> {
        self.read_guard().clone()
    }

    pub fn has_session(&self) -> bool {
        self.read_guard().is_some()
    }

    /// Apply `update` to the session, if one exists, and return the result.
    pub fn update<F>(&self, update: F) -> Option<ReadingSession>
    where
        F: FnOnce(&ReadingSession) -> ReadingSession,
    {
        let mut guard = self.write_guard();
        let updated = guard.as_ref().map(update);
        if let Some(ref session) = updated {
            *guard = Some(session.clone());
        }
        updated
    }

    pub fn next_chapter(&self) -> Option<ReadingSession> {
        self.update(ReadingSession::next_chapter)
    }

    pub fn previous_chapter(&self) -> Option<ReadingSession> {
        self.update(ReadingSession::previous_chapter)
    }

    pub fn set_chapter_index(&self, index: usize) -> Option<ReadingSession> {
        self.update(|session| session.with_chapter_index(index))
    }

    pub fn set_content(&self, content: String) -> Option<ReadingSession> {
        self.update(|session| session.with_content(content))
    }

    pub fn current_chapter_index(&self) -> Option<usize> {
        self.read_guard()
            .as_ref()
            .map(|session| session.current_chapter_index)
    }

    pub fn current_book(&self) -> Option<Book> {
        self.read_guard()
            .as_ref()
            .map(|session| session.book.clone())
    }

    pub fn current_chapter(&self) -> Option<Chapter> {
        self.read_guard()
            .as_ref()
            .and_then(|session| session.current_chapter().cloned())
    }

    /// Drop the session, if any.
    pub fn clear(&self) {
        let previous = self.write_guard().take();
        if previous.is_some() {
            debug!("Session cleared");
        }
    }

    fn read_guard(&self) -> std::sync::RwLockReadGuard<'_, Option<ReadingSession>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, Option<ReadingSession>> {
        self.current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
