//! Client module: session state machine, correlation, devices, events.
//!
//! This module contains the protocol engine proper:
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | [`Client`]: handshake, registry, public operations |
//! | `correlation` | Identifier allocation and pending-reply slots |
//! | `session` | Shared sending core and lifecycle state |
//! | `device` | [`ClientDevice`] handles and command builders |
//! | `events` | Notification fan-out to subscribers |

// ============================================================================
// Submodules
// ============================================================================

/// Core client and device registry.
pub mod core;

/// Request/reply correlation.
mod correlation;

/// Device handles and command builders.
pub mod device;

/// Notification fan-out.
pub mod events;

/// Session internals.
mod session;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::Client;
pub use device::{
    ClientDevice, IntoLinearSubcommands, IntoRotateSubcommands, IntoSpeedSubcommands,
};
pub use events::{HandlerId, LogEntry};
pub use session::SessionState;
