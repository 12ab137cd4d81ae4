//! Guarded lifecycle state machine for the reading session.

use std::sync::atomic::{AtomicU8, Ordering};
use tracing::{debug, warn};

/// Lifecycle phase of the reading session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// No book open.
    Idle = 0,
    /// A chapter fetch is in flight.
    Loading = 1,
    /// Content is on screen.
    Reading = 2,
    /// A page turn within the loaded chapter.
    Paging = 3,
    /// A load failed with no prior chapter to fall back to.
    Error = 4,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionState::Idle,
            1 => SessionState::Loading,
            2 => SessionState::Reading,
            3 => SessionState::Paging,
            _ => SessionState::Error,
        }
    }

    /// Legal successor states.
    fn allows(self, target: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, target),
            (Idle, Loading)
                | (Loading, Reading)
                | (Loading, Error)
                | (Loading, Idle)
                | (Reading, Loading)
                | (Reading, Paging)
                | (Reading, Idle)
                | (Paging, Reading)
                | (Paging, Loading)
                | (Error, Idle)
                | (Error, Loading)
        )
    }
}

/// Lock-free transition guard.
///
/// `transition` checks the target against the table under a
/// compare-exchange loop, so two racing callers cannot both claim the same
/// transition; the loser re-reads and re-validates from the new state.
pub struct SessionStateMachine {
    state: AtomicU8,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStateMachine {
    pub fn new() -> Self {
        SessionStateMachine {
            state: AtomicU8::new(SessionState::Idle as u8),
        }
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Attempt the transition; returns whether it took effect. Illegal
    /// transitions are rejected, logged, and leave the state unchanged.
    pub fn transition(&self, target: SessionState) -> bool {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let from = SessionState::from_u8(current);
            if !from.allows(target) {
                warn!(?from, to = ?target, "Rejected illegal session transition");
                return false;
            }
            match self.state.compare_exchange(
                current,
                target as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    debug!(?from, to = ?target, "Session state transition");
                    return true;
                }
                Err(observed) => current = observed,
            }
        }
    }

    /// Jump straight to `Idle`, bypassing the table. Used when the session
    /// ends wholesale.
    pub fn reset(&self) {
        let previous = self.state.swap(SessionState::Idle as u8, Ordering::AcqRel);
        debug!(from = ?SessionState::from_u8(previous), "Session state reset to Idle");
    }

    /// Set the state unconditionally. Always logged at warn level; intended
    /// for recovery paths only.
    pub fn force_set(&self, target: SessionState) {
        let previous = self.state.swap(target as u8, Ordering::AcqRel);
        warn!(
            from = ?SessionState::from_u8(previous),
            to = ?target,
            "Session state forced"
        );
    }

    pub fn is_idle(&self) -> bool {
        self.state() == SessionState::Idle
    }

    pub fn is_loading(&self) -> bool {
        self.state() == SessionState::Loading
    }

    pub fn is_reading(&self) -> bool {
        self.state() == SessionState::Reading
    }

    pub fn is_error(&self) -> bool {
        self.state() == SessionState::Error
    }
}
