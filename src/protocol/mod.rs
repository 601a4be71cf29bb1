//! Protocol message types and wire codec.
//!
//! This module defines the message format spoken with the server.
//!
//! # Protocol Overview
//!
//! | Concept | Shape |
//! |---------|-------|
//! | Frame | UTF-8 JSON text, an array of message objects |
//! | Message | `{"<VariantName>": {<PascalCase fields incl. "Id">}}` |
//! | Reply correlation | Integer `Id`, allocated per outbound request |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `message` | The typed message catalog |
//! | `codec` | Frame encoding/decoding with per-element isolation |

// ============================================================================
// Submodules
// ============================================================================

/// Frame encoding and decoding.
pub mod codec;

/// The typed message catalog.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use message::{
    DEFAULT_ID, DeviceInfo, ErrorCode, LinearSubcommand, LogLevel, Message, MessageAttributes,
    PROTOCOL_MESSAGE_VERSION, RotateSubcommand, SYSTEM_ID, SpeedSubcommand,
};
