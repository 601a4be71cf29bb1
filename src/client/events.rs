//! Notification fan-out.
//!
//! The server pushes unsolicited notifications (device added/removed,
//! scanning finished, log lines); each kind has its own [`EventEmitter`]
//! with an independent subscriber list. Handlers run in subscription
//! order, and a panicking handler is isolated so it never blocks later
//! handlers or future events.

// ============================================================================
// Imports
// ============================================================================

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::warn;

// ============================================================================
// HandlerId
// ============================================================================

/// Token returned by a subscription, used to remove the handler again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

// ============================================================================
// LogEntry
// ============================================================================

/// One server log line delivered to log subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Level the line was emitted at.
    pub level: String,
    /// The log line itself.
    pub message: String,
}

// ============================================================================
// EventEmitter
// ============================================================================

/// Handler callback type.
type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// One event kind's subscriber list.
pub(crate) struct EventEmitter<T> {
    /// Subscribed handlers in subscription order.
    handlers: Mutex<Vec<(HandlerId, Handler<T>)>>,
    /// Next handler token.
    next_id: AtomicU64,
}

impl<T> EventEmitter<T> {
    /// Creates an emitter with no subscribers.
    pub(crate) fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Adds a handler; returns the token that removes it.
    pub(crate) fn subscribe(&self, handler: impl Fn(&T) + Send + Sync + 'static) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.lock().push((id, Arc::new(handler)));
        id
    }

    /// Removes a handler by token. Returns `true` if it was subscribed.
    pub(crate) fn unsubscribe(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.lock();
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }

    /// Delivers an event to every handler in subscription order.
    ///
    /// Handlers run outside the list lock, so a handler may subscribe or
    /// unsubscribe without deadlocking. A panicking handler is caught and
    /// logged; delivery continues with the next handler.
    pub(crate) fn emit(&self, value: &T) {
        let snapshot: Vec<Handler<T>> = self
            .handlers
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in snapshot {
            if catch_unwind(AssertUnwindSafe(|| handler(value))).is_err() {
                warn!("event handler panicked; continuing delivery");
            }
        }
    }

    /// Returns the number of subscribed handlers.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.handlers.lock().len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let emitter = EventEmitter::<u32>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            emitter.subscribe(move |_| order.lock().push(tag));
        }

        emitter.emit(&0);
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_handler() {
        let emitter = EventEmitter::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let keep = Arc::clone(&calls);
        emitter.subscribe(move |_| {
            keep.fetch_add(1, Ordering::Relaxed);
        });
        let removed = emitter.subscribe(|_| panic!("should not run"));

        assert!(emitter.unsubscribe(removed));
        assert!(!emitter.unsubscribe(removed));
        assert_eq!(emitter.len(), 1);

        emitter.emit(&0);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_panicking_handler_does_not_block_delivery() {
        let emitter = EventEmitter::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        emitter.subscribe(|_| panic!("boom"));
        let counter = Arc::clone(&calls);
        emitter.subscribe(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        emitter.emit(&0);
        emitter.emit(&1);
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_handler_may_subscribe_during_emit() {
        let emitter = Arc::new(EventEmitter::<u32>::new());
        let inner = Arc::clone(&emitter);
        emitter.subscribe(move |_| {
            inner.subscribe(|_| {});
        });

        emitter.emit(&0);
        assert_eq!(emitter.len(), 2);
    }
}
