//! Session internals shared between the client and its device handles.
//!
//! [`Session`] owns the pieces every send path needs: the installed
//! transport connector, the request correlation map, the connection state,
//! and the optional request timeout. Device handles keep a non-owning
//! reference to it, so a device outliving its client degrades into
//! not-connected errors instead of dangling.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time;
use tracing::trace;

use crate::error::{Error, Result};
use crate::protocol::{Message, codec};
use crate::transport::Connector;

use super::correlation::Correlation;

// ============================================================================
// SessionState
// ============================================================================

/// Connection lifecycle states.
///
/// The session cycles `Disconnected → Connecting → Handshaking → Ready →
/// Disconnected`; a failed handshake also falls back to `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transport.
    Disconnected,
    /// Transport being opened.
    Connecting,
    /// Identifying with the server and enumerating devices.
    Handshaking,
    /// Handshake complete; commands and scanning available.
    Ready,
}

// ============================================================================
// Session
// ============================================================================

/// Shared sending core of a client connection.
pub(crate) struct Session {
    /// Installed transport, present while connected.
    connector: Mutex<Option<Arc<dyn Connector>>>,
    /// Identifier allocator and pending-reply map.
    correlation: Correlation,
    /// Current lifecycle state.
    state: Mutex<SessionState>,
    /// Optional reply timeout applied to every request.
    request_timeout: Mutex<Option<Duration>>,
}

impl Session {
    /// Creates a disconnected session.
    pub(crate) fn new() -> Self {
        Self {
            connector: Mutex::new(None),
            correlation: Correlation::new(),
            state: Mutex::new(SessionState::Disconnected),
            request_timeout: Mutex::new(None),
        }
    }

    // ========================================================================
    // State
    // ========================================================================

    /// Returns the current lifecycle state.
    #[inline]
    pub(crate) fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Sets the lifecycle state.
    pub(crate) fn set_state(&self, state: SessionState) {
        *self.state.lock() = state;
    }

    /// Moves `Disconnected → Connecting`; fails if a connection exists.
    pub(crate) fn begin_connect(&self) -> Result<()> {
        let mut state = self.state.lock();
        if *state != SessionState::Disconnected {
            return Err(Error::connector("already connected"));
        }
        *state = SessionState::Connecting;
        Ok(())
    }

    /// Returns `true` while a transport is installed.
    #[inline]
    pub(crate) fn is_connected(&self) -> bool {
        self.connector.lock().is_some()
    }

    // ========================================================================
    // Connector Slot
    // ========================================================================

    /// Installs the transport after a successful open.
    pub(crate) fn install_connector(&self, connector: Arc<dyn Connector>) {
        *self.connector.lock() = Some(connector);
    }

    /// Removes and returns the installed transport, if any.
    pub(crate) fn take_connector(&self) -> Option<Arc<dyn Connector>> {
        self.connector.lock().take()
    }

    /// Returns the correlation layer.
    #[inline]
    pub(crate) fn correlation(&self) -> &Correlation {
        &self.correlation
    }

    /// Sets the reply timeout applied to every request; `None` waits
    /// indefinitely.
    pub(crate) fn set_request_timeout(&self, timeout: Option<Duration>) {
        *self.request_timeout.lock() = timeout;
    }

    // ========================================================================
    // Send Paths
    // ========================================================================

    /// Sends a request and suspends until the correlated reply arrives.
    ///
    /// Allocates the next identifier, stamps the message, registers a
    /// pending slot, and hands the encoded frame to the transport. The
    /// reply must be of the `expected` variant; an `Error` reply is
    /// translated to its typed failure, any other variant is a protocol
    /// violation.
    ///
    /// # Errors
    ///
    /// - [`Error::Connector`] immediately when not connected, without
    ///   allocating an identifier.
    /// - [`Error::RequestTimeout`] when a configured timeout expires; the
    ///   pending slot is removed and a late reply is discarded.
    /// - [`Error::ConnectionClosed`] when the connection goes away while
    ///   the request is outstanding.
    /// - The translated server failure for an `Error` reply.
    pub(crate) async fn send_expect_reply(
        &self,
        mut message: Message,
        expected: &'static str,
    ) -> Result<Message> {
        let connector = self
            .connector
            .lock()
            .clone()
            .ok_or_else(|| Error::connector("not connected to a server"))?;

        let id = self.correlation.next_id();
        message.set_id(id);
        let frame = codec::encode_message(&message)?;

        let rx = self.correlation.register(id);
        // Removes the slot when this future is dropped (timeout or caller
        // cancellation); removal after normal resolution is a no-op.
        let _slot = SlotGuard {
            correlation: &self.correlation,
            id,
        };

        trace!(name = message.name(), id, "sending request");
        connector.send(frame).await?;

        let timeout = *self.request_timeout.lock();
        let received = match timeout {
            Some(limit) => match time::timeout(limit, rx).await {
                Ok(received) => received,
                Err(_) => {
                    return Err(Error::request_timeout(id, limit.as_millis() as u64));
                }
            },
            None => rx.await,
        };
        let reply = received??;

        if reply.name() == expected {
            return Ok(reply);
        }
        match reply {
            Message::Error {
                error_message,
                error_code,
                ..
            } => Err(Error::from_server_error(error_message, error_code)),
            other => Err(Error::message(format!(
                "unexpected {} reply to {}",
                other.name(),
                message.name()
            ))),
        }
    }

    /// Sends a request and expects a bare `Ok` acknowledgment.
    pub(crate) async fn send_expect_ok(&self, message: Message) -> Result<()> {
        self.send_expect_reply(message, "Ok").await.map(|_| ())
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Returns the number of outstanding requests.
    #[inline]
    pub(crate) fn pending_count(&self) -> usize {
        self.correlation.pending_count()
    }

    /// Returns how many replies arrived too late to be delivered.
    #[inline]
    pub(crate) fn stray_count(&self) -> u64 {
        self.correlation.stray_count()
    }
}

// ============================================================================
// SlotGuard
// ============================================================================

/// Removes a pending slot when dropped.
///
/// Keeps the pending map leak-free when the awaiting future is dropped
/// mid-flight; the already-sent wire message is not recalled.
struct SlotGuard<'a> {
    correlation: &'a Correlation,
    id: u32,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.correlation.remove(self.id);
    }
}

// ============================================================================
// Tests
// ============================================================================
