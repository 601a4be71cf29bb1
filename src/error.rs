//! Error types for the Intiface client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use intiface_client::{Result, Error};
//!
//! async fn example(device: &ClientDevice) -> Result<()> {
//!     device.send_vibrate_cmd(0.5).await?;
//!     device.send_stop_device_cmd().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Connection | [`Error::Connector`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`] |
//! | Server-reported | [`Error::Handshake`], [`Error::Ping`], [`Error::Message`], [`Error::Device`], [`Error::Unknown`] |
//! | Wire | [`Error::Decode`], [`Error::Json`] |
//! | Execution | [`Error::RequestTimeout`] |
//! | External | [`Error::WebSocket`], [`Error::ChannelClosed`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::protocol::ErrorCode;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging. Variants in the
/// server-reported category correspond one-to-one with the protocol's
/// numeric error codes (see [`Error::from_server_error`]).
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Transport-level failure.
    ///
    /// Returned when connecting, sending, or closing fails, or when an
    /// operation is attempted while not connected.
    #[error("Connector error: {message}")]
    Connector {
        /// Description of the transport failure.
        message: String,
    },

    /// Connection timeout.
    ///
    /// Returned when the transport does not come up within the timeout.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Connection closed while an operation was outstanding.
    ///
    /// Every pending request is failed with this when the transport goes
    /// away.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Server-Reported Errors
    // ========================================================================
    /// Server rejected the identification handshake.
    #[error("Handshake error: {message}")]
    Handshake {
        /// Error message from the server.
        message: String,
    },

    /// Server-reported ping timeout.
    #[error("Ping error: {message}")]
    Ping {
        /// Error message from the server.
        message: String,
    },

    /// Malformed message, or a reply of an unexpected variant.
    #[error("Message error: {message}")]
    Message {
        /// Description of the protocol violation.
        message: String,
    },

    /// Device failure: missing capability, unknown device index, or a
    /// server-reported device fault.
    #[error("Device error: {message}")]
    Device {
        /// Description of the device failure.
        message: String,
    },

    /// Server error with an unrecognized error code.
    #[error("Unknown server error: {message}")]
    Unknown {
        /// Error message from the server.
        message: String,
    },

    // ========================================================================
    // Wire Errors
    // ========================================================================
    /// Wire payload unparsable or naming an unknown message variant.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decode failure.
        message: String,
    },

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// Request reply not received within the caller-supplied timeout.
    ///
    /// The pending slot is removed on timeout; a late reply is discarded.
    #[error("Request {id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The message identifier that timed out.
        id: u32,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a connector error.
    #[inline]
    pub fn connector(message: impl Into<String>) -> Self {
        Self::Connector {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a handshake error.
    #[inline]
    pub fn handshake(message: impl Into<String>) -> Self {
        Self::Handshake {
            message: message.into(),
        }
    }

    /// Creates a ping error.
    #[inline]
    pub fn ping(message: impl Into<String>) -> Self {
        Self::Ping {
            message: message.into(),
        }
    }

    /// Creates a message error.
    #[inline]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    /// Creates a device error.
    #[inline]
    pub fn device(message: impl Into<String>) -> Self {
        Self::Device {
            message: message.into(),
        }
    }

    /// Creates an unknown server error.
    #[inline]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    #[inline]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(id: u32, timeout_ms: u64) -> Self {
        Self::RequestTimeout { id, timeout_ms }
    }

    /// Translates a server `Error` reply into its typed failure.
    ///
    /// The mapping is total: every numeric code maps to a variant, with
    /// unrecognized codes falling back to [`Error::Unknown`].
    #[must_use]
    pub fn from_server_error(message: impl Into<String>, code: u32) -> Self {
        match ErrorCode::from_code(code) {
            ErrorCode::Init => Self::handshake(message),
            ErrorCode::Ping => Self::ping(message),
            ErrorCode::Message => Self::message(message),
            ErrorCode::Device => Self::device(message),
            ErrorCode::Unknown => Self::unknown(message),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::RequestTimeout { .. }
        )
    }

    /// Returns `true` if this is a connection-level error.
    #[inline]
    #[must_use]
    pub fn is_connector_error(&self) -> bool {
        matches!(
            self,
            Self::Connector { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this is a device error.
    #[inline]
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::Device { .. })
    }

    /// Returns `true` if the server reported this error.
    #[inline]
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Handshake { .. }
                | Self::Ping { .. }
                | Self::Message { .. }
                | Self::Device { .. }
                | Self::Unknown { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::connector("failed to connect");
        assert_eq!(err.to_string(), "Connector error: failed to connect");
    }

    #[test]
    fn test_from_server_error_device() {
        let err = Error::from_server_error("no such device", 4);
        assert!(matches!(err, Error::Device { .. }));
    }

    #[test]
    fn test_from_server_error_ping() {
        let err = Error::from_server_error("ping timeout", 2);
        assert!(matches!(err, Error::Ping { .. }));
    }

    #[test]
    fn test_from_server_error_handshake() {
        let err = Error::from_server_error("bad client", 1);
        assert!(matches!(err, Error::Handshake { .. }));
    }

    #[test]
    fn test_from_server_error_message() {
        let err = Error::from_server_error("bad message", 3);
        assert!(matches!(err, Error::Message { .. }));
    }

    #[test]
    fn test_from_server_error_unrecognized_code() {
        let err = Error::from_server_error("???", 9000);
        assert!(matches!(err, Error::Unknown { .. }));

        let err = Error::from_server_error("???", 0);
        assert!(matches!(err, Error::Unknown { .. }));
    }

    #[test]
    fn test_is_timeout() {
        let timeout_err = Error::request_timeout(3, 5000);
        let other_err = Error::connector("test");

        assert!(timeout_err.is_timeout());
        assert!(!other_err.is_timeout());
    }

    #[test]
    fn test_is_connector_error() {
        assert!(Error::connector("test").is_connector_error());
        assert!(Error::ConnectionClosed.is_connector_error());
        assert!(Error::connection_timeout(1000).is_connector_error());
        assert!(!Error::device("test").is_connector_error());
    }

    #[test]
    fn test_is_server_error() {
        assert!(Error::from_server_error("x", 4).is_server_error());
        assert!(!Error::ConnectionClosed.is_server_error());
        assert!(!Error::decode("bad json").is_server_error());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
