//! Transport layer.
//!
//! The protocol engine consumes the transport through the narrow
//! [`Connector`] seam: open, write a text frame, deliver inbound text
//! frames, close. The transport is assumed to deliver discrete text
//! frames in order, without loss; everything above that (batching,
//! correlation, notification routing) lives in the client.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `websocket` | [`WebsocketConnector`] over `tokio-tungstenite` |

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket transport.
pub mod websocket;

// ============================================================================
// Re-exports
// ============================================================================

pub use websocket::WebsocketConnector;

// ============================================================================
// Connector
// ============================================================================

/// A duplex text-frame transport to a server.
///
/// Implementations spawn their own read loop on [`Connector::connect`]
/// and hand inbound frames to the caller through the returned channel;
/// the channel closing signals that the transport went away.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens the transport and returns the inbound frame stream.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Connector`] if the transport cannot be
    /// established.
    async fn connect(&self) -> Result<mpsc::UnboundedReceiver<String>>;

    /// Writes one text frame.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the transport is not open.
    async fn send(&self, frame: String) -> Result<()>;

    /// Closes the transport. Idempotent.
    async fn close(&self) -> Result<()>;

    /// Returns `true` while the transport is open.
    fn is_connected(&self) -> bool;
}
