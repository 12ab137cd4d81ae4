//! Synchronous in-process event bus.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

use super::ReaderEvent;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Subscriber = std::sync::Arc<dyn Fn(&ReaderEvent) + Send + Sync>;

/// Fans each published event out to every subscriber, in subscription
/// order, on the publisher's thread. Publish returns only after all
/// subscribers have run, so handlers observe their own events in order.
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<(SubscriberId, Subscriber)>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, subscriber: F) -> SubscriberId
    where
        F: Fn(&ReaderEvent) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.push((id, std::sync::Arc::new(subscriber)));
        trace!(subscriber = id.0, "Event subscriber registered");
        id
    }

    /// Remove a subscriber. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriberId) {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.retain(|(existing, _)| *existing != id);
    }

    /// Deliver `event` to every current subscriber, synchronously.
    pub fn publish(&self, event: ReaderEvent) {
        let subscribers = {
            let guard = self
                .subscribers
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.clone()
        };
        debug!(
            subscribers = subscribers.len(),
            event = ?event_label(&event),
            "Publishing event"
        );
        for (_, subscriber) in &subscribers {
            subscriber(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

fn event_label(event: &ReaderEvent) -> &'static str {
    match event {
        ReaderEvent::Command(_) => "command",
        ReaderEvent::Reading(_) => "reading",
        ReaderEvent::Bookshelf(_) => "bookshelf",
        ReaderEvent::Pagination(_) => "pagination",
    }
}
