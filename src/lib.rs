//! Intiface Client - Async client for the Buttplug device-control protocol.
//!
//! This library connects to an Intiface/Buttplug server over a WebSocket,
//! enumerates the peripherals attached to it, and exposes typed command
//! builders for controlling them.
//!
//! # Architecture
//!
//! The client follows the protocol's client-server model:
//!
//! - **Client (Rust)**: identifies itself, sends commands, receives
//!   replies and notifications over one persistent connection
//! - **Server**: owns the hardware, answers commands, pushes device
//!   lifecycle notifications
//!
//! Key design points:
//!
//! - Messages batch into JSON-array frames; each message carries an
//!   integer `Id` used to correlate replies with pending requests
//! - Requests pipeline: multiple may be in flight, each resolving
//!   independently when its matching reply arrives
//! - Unsolicited notifications (device added/removed, scanning finished,
//!   log lines) fan out to per-kind subscriber lists
//! - One background task per connection: the transport read loop
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use intiface_client::{Client, Result, WebsocketConnector};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::new("Example Client");
//!     client.on_device_added(|device| {
//!         println!("device found: {}", device.name());
//!     });
//!
//!     // Connect and handshake; already-attached devices are enumerated.
//!     let connector = Arc::new(WebsocketConnector::new("ws://127.0.0.1:12345")?);
//!     client.connect(connector).await?;
//!
//!     // Look for more devices.
//!     client.start_scanning().await?;
//!
//!     // Command a device, if one showed up.
//!     if let Some(device) = client.devices().into_iter().next() {
//!         device.send_vibrate_cmd(0.5).await?;
//!         device.send_stop_device_cmd().await?;
//!     }
//!
//!     client.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`Client`], [`ClientDevice`], events, session state |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`protocol`] | Message catalog and wire codec |
//! | [`transport`] | [`Connector`] seam and WebSocket implementation |

// ============================================================================
// Modules
// ============================================================================

/// Client, devices, and notification fan-out.
///
/// The protocol engine proper: handshake state machine, request
/// correlation, device registry.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Protocol message types and wire codec.
pub mod protocol;

/// Transport layer.
///
/// The [`Connector`] trait is the seam for alternative transports; tests
/// drive the whole client through an in-memory implementation.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{
    Client, ClientDevice, HandlerId, IntoLinearSubcommands, IntoRotateSubcommands,
    IntoSpeedSubcommands, LogEntry, SessionState,
};

// Error types
pub use error::{Error, Result};

// Protocol types
pub use protocol::{
    DeviceInfo, ErrorCode, LinearSubcommand, LogLevel, Message, MessageAttributes,
    RotateSubcommand, SpeedSubcommand,
};

// Transport types
pub use transport::{Connector, WebsocketConnector};
