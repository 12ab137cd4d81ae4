//! Command-type to handler lookup table.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

use super::{CommandHandler, CommandType};

/// Maps each command type to at most one handler.
///
/// Registering over an existing entry replaces it with a warning; dispatch
/// for an unmapped type fails at the bus, not here.
#[derive(Default)]
pub struct CommandHandlerRegistry {
    handlers: RwLock<HashMap<CommandType, Arc<dyn CommandHandler>>>,
}

impl CommandHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handler: Arc<dyn CommandHandler>) {
        let kind = handler.supported_type();
        let previous = self.write_guard().insert(kind, handler);
        if previous.is_some() {
            warn!(%kind, "Replacing previously registered command handler");
        } else {
            debug!(%kind, "Command handler registered");
        }
    }

    pub fn get(&self, kind: CommandType) -> Option<Arc<dyn CommandHandler>> {
        self.read_guard().get(&kind).cloned()
    }

    pub fn unregister(&self, kind: CommandType) -> bool {
        self.write_guard().remove(&kind).is_some()
    }

    pub fn clear(&self) {
        self.write_guard().clear();
    }

    pub fn len(&self) -> usize {
        self.read_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_guard().is_empty()
    }

    fn read_guard(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<CommandType, Arc<dyn CommandHandler>>> {
        self.handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_guard(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<CommandType, Arc<dyn CommandHandler>>> {
        self.handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
