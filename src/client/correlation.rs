//! Request/reply correlation.
//!
//! Turns the fire-and-forget message stream into awaitable request/reply
//! pairs. Each outbound request gets a freshly allocated identifier and a
//! pending slot; the inbound path resolves the slot whose identifier
//! matches a reply. Messages with no matching slot are unsolicited and
//! belong to the notification path.
//!
//! Identifiers are allocated monotonically and never reused while a
//! request with that identifier is outstanding. Replies match strictly by
//! identifier, so out-of-order replies resolve the right caller.

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{DEFAULT_ID, Message};

// ============================================================================
// Types
// ============================================================================

/// Map of message identifiers to reply slots.
type PendingMap = FxHashMap<u32, oneshot::Sender<Result<Message>>>;

// ============================================================================
// Correlation
// ============================================================================

/// Identifier allocator and pending-reply map.
///
/// Safe under concurrent senders: multiple requests may be in flight
/// simultaneously (the protocol allows pipelining), each resolving
/// independently when its matching reply arrives.
pub(crate) struct Correlation {
    /// Next identifier to hand out; starts at [`DEFAULT_ID`].
    counter: AtomicU32,
    /// Outstanding reply slots keyed by identifier.
    pending: Mutex<PendingMap>,
    /// Replies that arrived after their slot was removed.
    strays: AtomicU64,
}

impl Correlation {
    /// Creates an empty correlation map.
    pub(crate) fn new() -> Self {
        Self {
            counter: AtomicU32::new(DEFAULT_ID),
            pending: Mutex::new(PendingMap::default()),
            strays: AtomicU64::new(0),
        }
    }

    /// Allocates the next message identifier.
    #[inline]
    pub(crate) fn next_id(&self) -> u32 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Registers a pending slot for an identifier.
    ///
    /// The returned receiver completes exactly once: with the matching
    /// reply, or with an error when the slot is failed on teardown.
    pub(crate) fn register(&self, id: u32) -> oneshot::Receiver<Result<Message>> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);
        rx
    }

    /// Removes a pending slot without resolving it.
    ///
    /// Used for timeout and cancellation cleanup. Returns `true` if a slot
    /// was present.
    pub(crate) fn remove(&self, id: u32) -> bool {
        self.pending.lock().remove(&id).is_some()
    }

    /// Delivers an inbound message to its pending slot.
    ///
    /// The slot is removed atomically with resolution, so a reply is never
    /// delivered twice. Returns the message back when no slot matches —
    /// the unsolicited path.
    pub(crate) fn resolve(&self, message: Message) -> Option<Message> {
        let sender = self.pending.lock().remove(&message.id());
        match sender {
            Some(tx) => {
                if let Err(unsent) = tx.send(Ok(message)) {
                    // Caller gave up (timed out or cancelled) between slot
                    // removal and delivery.
                    self.record_stray();
                    if let Ok(msg) = unsent {
                        debug!(name = msg.name(), id = msg.id(), "reply arrived for abandoned request");
                    }
                }
                None
            }
            None => Some(message),
        }
    }

    /// Fails every outstanding slot with [`Error::ConnectionClosed`].
    ///
    /// Called on connection teardown; sweeps the whole map, not just the
    /// request in flight at close time.
    pub(crate) fn fail_all(&self) {
        let pending: Vec<_> = self.pending.lock().drain().collect();
        let count = pending.len();

        for (_, tx) in pending {
            let _ = tx.send(Err(Error::ConnectionClosed));
        }

        if count > 0 {
            debug!(count, "failed pending requests on teardown");
        }
    }

    /// Records a reply that arrived with no live slot.
    #[inline]
    pub(crate) fn record_stray(&self) {
        self.strays.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns how many replies arrived too late to be delivered.
    #[inline]
    pub(crate) fn stray_count(&self) -> u64 {
        self.strays.load(Ordering::Relaxed)
    }

    /// Returns the number of outstanding requests.
    #[inline]
    pub(crate) fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_ids_start_at_default_and_increase() {
        let correlation = Correlation::new();
        assert_eq!(correlation.next_id(), DEFAULT_ID);
        assert_eq!(correlation.next_id(), 2);
        assert_eq!(correlation.next_id(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_allocation_is_unique() {
        let correlation = Arc::new(Correlation::new());
        let mut tasks = Vec::new();
        for _ in 0..64 {
            let correlation = Arc::clone(&correlation);
            tasks.push(tokio::spawn(async move { correlation.next_id() }));
        }

        let mut seen = HashSet::new();
        for task in tasks {
            assert!(seen.insert(task.await.expect("join")));
        }
        assert_eq!(seen.len(), 64);
    }

    #[tokio::test]
    async fn test_resolve_matches_by_id_not_send_order() {
        let correlation = Correlation::new();
        let first = correlation.next_id();
        let second = correlation.next_id();
        let rx_first = correlation.register(first);
        let rx_second = correlation.register(second);

        // Replies arrive out of order.
        assert!(correlation.resolve(Message::Ok { id: second }).is_none());
        assert!(correlation.resolve(Message::Ok { id: first }).is_none());

        let reply = rx_first.await.expect("slot resolved").expect("ok");
        assert_eq!(reply.id(), first);
        let reply = rx_second.await.expect("slot resolved").expect("ok");
        assert_eq!(reply.id(), second);
    }

    #[test]
    fn test_unmatched_message_is_returned() {
        let correlation = Correlation::new();
        let msg = Message::ScanningFinished { id: 0 };
        let returned = correlation.resolve(msg.clone());
        assert_eq!(returned, Some(msg));
    }

    #[tokio::test]
    async fn test_fail_all_sweeps_every_slot() {
        let correlation = Correlation::new();
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let id = correlation.next_id();
            receivers.push(correlation.register(id));
        }
        assert_eq!(correlation.pending_count(), 3);

        correlation.fail_all();
        assert_eq!(correlation.pending_count(), 0);

        for rx in receivers {
            let result = rx.await.expect("slot failed, not dropped");
            assert!(matches!(result, Err(Error::ConnectionClosed)));
        }
    }

    #[test]
    fn test_remove_drops_slot() {
        let correlation = Correlation::new();
        let id = correlation.next_id();
        let _rx = correlation.register(id);

        assert!(correlation.remove(id));
        assert!(!correlation.remove(id));
        assert_eq!(correlation.pending_count(), 0);

        // A late reply now takes the unsolicited path.
        assert!(correlation.resolve(Message::Ok { id }).is_some());
    }

    #[test]
    fn test_resolve_after_receiver_dropped_counts_stray() {
        let correlation = Correlation::new();
        let id = correlation.next_id();
        let rx = correlation.register(id);
        drop(rx);

        assert!(correlation.resolve(Message::Ok { id }).is_none());
        assert_eq!(correlation.stray_count(), 1);
    }
}
