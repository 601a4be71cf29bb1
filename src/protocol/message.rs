//! The protocol message catalog.
//!
//! Every exchange with the server is one of the variants of [`Message`].
//! On the wire a message is a JSON object with exactly one key — the
//! variant name — whose value holds the variant's fields in PascalCase,
//! always including the correlation identifier `Id`:
//!
//! ```json
//! {"RequestServerInfo": {"ClientName": "Test Client", "MessageVersion": 1, "Id": 1}}
//! ```
//!
//! That shape is serde's externally tagged enum representation, so the
//! derive is the tag→decoder registry: dispatch is a static match on the
//! key, with no runtime type lookup.
//!
//! # Identifier Namespace
//!
//! | Value | Meaning |
//! |-------|---------|
//! | [`SYSTEM_ID`] (0) | Server-originated, no request counterpart |
//! | [`DEFAULT_ID`] (1) | First message sent on a fresh connection |
//! | 2.. | Allocated per outbound request |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Identifier reserved for system-originated messages with no request
/// counterpart (unsolicited notifications).
pub const SYSTEM_ID: u32 = 0;

/// Identifier of the first message sent before correlation is established.
pub const DEFAULT_ID: u32 = 1;

/// Protocol message schema version spoken by this client.
pub const PROTOCOL_MESSAGE_VERSION: u32 = 1;

// ============================================================================
// Message
// ============================================================================

/// The closed set of protocol message variants.
///
/// Direction is noted per variant: `client → server`, `server → client`,
/// or both. Every variant carries an `id`; see the module docs for the
/// reserved values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all_fields = "PascalCase")]
pub enum Message {
    /// Generic acknowledgment reply (`server → client`).
    Ok {
        /// Correlation identifier.
        id: u32,
    },

    /// Server-reported failure reply (`server → client`).
    ///
    /// `error_code` maps onto [`ErrorCode`]; the translation to a typed
    /// failure lives in [`crate::Error::from_server_error`].
    Error {
        /// Human-readable description from the server.
        error_message: String,
        /// Numeric error class.
        error_code: u32,
        /// Correlation identifier.
        id: u32,
    },

    /// Keepalive request (`client → server`).
    Ping {
        /// Correlation identifier.
        id: u32,
    },

    /// Client identification, the first message of the handshake
    /// (`client → server`).
    RequestServerInfo {
        /// Name the server may display for this client.
        client_name: String,
        /// Message schema version the client speaks.
        message_version: u32,
        /// Correlation identifier.
        id: u32,
    },

    /// Server identification reply (`server → client`).
    ServerInfo {
        /// Name of the server implementation.
        server_name: String,
        /// Server major version.
        major_version: u32,
        /// Server minor version.
        minor_version: u32,
        /// Server build version.
        build_version: u32,
        /// Message schema version the server speaks.
        message_version: u32,
        /// Maximum ping interval in milliseconds; 0 disables ping checks.
        max_ping_time: u32,
        /// Correlation identifier.
        id: u32,
    },

    /// Request for the currently connected device set (`client → server`).
    RequestDeviceList {
        /// Correlation identifier.
        id: u32,
    },

    /// Bulk device enumeration reply (`server → client`).
    DeviceList {
        /// Currently connected devices.
        devices: Vec<DeviceInfo>,
        /// Correlation identifier.
        id: u32,
    },

    /// Unsolicited notification of a newly connected device
    /// (`server → client`). Carries the same shape as [`DeviceInfo`].
    DeviceAdded {
        /// Name of the device.
        device_name: String,
        /// Server-assigned device index.
        device_index: u32,
        /// Supported command messages and their attributes.
        device_messages: FxHashMap<String, MessageAttributes>,
        /// Correlation identifier.
        id: u32,
    },

    /// Unsolicited notification of a disconnected device
    /// (`server → client`).
    DeviceRemoved {
        /// Index of the removed device.
        device_index: u32,
        /// Correlation identifier.
        id: u32,
    },

    /// Ask the server to start scanning for devices (`client → server`).
    StartScanning {
        /// Correlation identifier.
        id: u32,
    },

    /// Ask the server to stop scanning for devices (`client → server`).
    StopScanning {
        /// Correlation identifier.
        id: u32,
    },

    /// Unsolicited notification that scanning ended (`server → client`).
    ScanningFinished {
        /// Correlation identifier.
        id: u32,
    },

    /// Subscribe to server log lines at a level (`client → server`).
    ///
    /// Send [`LogLevel::Off`] to cancel a prior subscription.
    RequestLog {
        /// Requested level, one of the [`LogLevel`] string forms.
        log_level: String,
        /// Correlation identifier.
        id: u32,
    },

    /// Unsolicited server log line (`server → client`).
    Log {
        /// Level the line was emitted at.
        log_level: String,
        /// The log line itself.
        log_message: String,
        /// Correlation identifier.
        id: u32,
    },

    /// Set vibration speed on one or more actuators (`client → server`).
    VibrateCmd {
        /// Target device index.
        device_index: u32,
        /// Per-actuator speeds.
        speeds: Vec<SpeedSubcommand>,
        /// Correlation identifier.
        id: u32,
    },

    /// Set rotation speed/direction on one or more actuators
    /// (`client → server`).
    RotateCmd {
        /// Target device index.
        device_index: u32,
        /// Per-actuator rotations.
        rotations: Vec<RotateSubcommand>,
        /// Correlation identifier.
        id: u32,
    },

    /// Move one or more linear actuators to a position over a duration
    /// (`client → server`).
    LinearCmd {
        /// Target device index.
        device_index: u32,
        /// Per-actuator movement vectors.
        vectors: Vec<LinearSubcommand>,
        /// Correlation identifier.
        id: u32,
    },

    /// Stop all activity on one device (`client → server`).
    StopDeviceCmd {
        /// Target device index.
        device_index: u32,
        /// Correlation identifier.
        id: u32,
    },

    /// Stop all activity on every device (`client → server`).
    StopAllDevices {
        /// Correlation identifier.
        id: u32,
    },
}

// ============================================================================
// Message - Accessors
// ============================================================================

impl Message {
    /// Returns the wire name of this variant (the single JSON key).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ok { .. } => "Ok",
            Self::Error { .. } => "Error",
            Self::Ping { .. } => "Ping",
            Self::RequestServerInfo { .. } => "RequestServerInfo",
            Self::ServerInfo { .. } => "ServerInfo",
            Self::RequestDeviceList { .. } => "RequestDeviceList",
            Self::DeviceList { .. } => "DeviceList",
            Self::DeviceAdded { .. } => "DeviceAdded",
            Self::DeviceRemoved { .. } => "DeviceRemoved",
            Self::StartScanning { .. } => "StartScanning",
            Self::StopScanning { .. } => "StopScanning",
            Self::ScanningFinished { .. } => "ScanningFinished",
            Self::RequestLog { .. } => "RequestLog",
            Self::Log { .. } => "Log",
            Self::VibrateCmd { .. } => "VibrateCmd",
            Self::RotateCmd { .. } => "RotateCmd",
            Self::LinearCmd { .. } => "LinearCmd",
            Self::StopDeviceCmd { .. } => "StopDeviceCmd",
            Self::StopAllDevices { .. } => "StopAllDevices",
        }
    }

    /// Returns the correlation identifier.
    #[must_use]
    pub const fn id(&self) -> u32 {
        match self {
            Self::Ok { id }
            | Self::Error { id, .. }
            | Self::Ping { id }
            | Self::RequestServerInfo { id, .. }
            | Self::ServerInfo { id, .. }
            | Self::RequestDeviceList { id }
            | Self::DeviceList { id, .. }
            | Self::DeviceAdded { id, .. }
            | Self::DeviceRemoved { id, .. }
            | Self::StartScanning { id }
            | Self::StopScanning { id }
            | Self::ScanningFinished { id }
            | Self::RequestLog { id, .. }
            | Self::Log { id, .. }
            | Self::VibrateCmd { id, .. }
            | Self::RotateCmd { id, .. }
            | Self::LinearCmd { id, .. }
            | Self::StopDeviceCmd { id, .. }
            | Self::StopAllDevices { id } => *id,
        }
    }

    /// Stamps the correlation identifier.
    pub fn set_id(&mut self, new_id: u32) {
        match self {
            Self::Ok { id }
            | Self::Error { id, .. }
            | Self::Ping { id }
            | Self::RequestServerInfo { id, .. }
            | Self::ServerInfo { id, .. }
            | Self::RequestDeviceList { id }
            | Self::DeviceList { id, .. }
            | Self::DeviceAdded { id, .. }
            | Self::DeviceRemoved { id, .. }
            | Self::StartScanning { id }
            | Self::StopScanning { id }
            | Self::ScanningFinished { id }
            | Self::RequestLog { id, .. }
            | Self::Log { id, .. }
            | Self::VibrateCmd { id, .. }
            | Self::RotateCmd { id, .. }
            | Self::LinearCmd { id, .. }
            | Self::StopDeviceCmd { id, .. }
            | Self::StopAllDevices { id } => *id = new_id,
        }
    }
}

// ============================================================================
// DeviceInfo
// ============================================================================

/// One device entry of a `DeviceList`, and the record shape shared with
/// `DeviceAdded`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceInfo {
    /// Name of the device.
    pub device_name: String,
    /// Server-assigned device index, unique among currently known devices.
    pub device_index: u32,
    /// Supported command messages and their attributes.
    pub device_messages: FxHashMap<String, MessageAttributes>,
}

impl DeviceInfo {
    /// Creates a new device info record.
    #[must_use]
    pub fn new(
        device_name: impl Into<String>,
        device_index: u32,
        device_messages: FxHashMap<String, MessageAttributes>,
    ) -> Self {
        Self {
            device_name: device_name.into(),
            device_index,
            device_messages,
        }
    }
}

// ============================================================================
// MessageAttributes
// ============================================================================

/// Attributes of one supported command message on a device.
///
/// Currently only the feature count — the number of independently
/// addressable actuators of that kind. Messages without a feature count
/// (e.g. `StopDeviceCmd`) serialize as an empty object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageAttributes {
    /// Number of actuators addressable by this message type.
    #[serde(
        rename = "FeatureCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub feature_count: Option<u32>,
}

impl MessageAttributes {
    /// Creates attributes with a feature count.
    #[inline]
    #[must_use]
    pub const fn with_feature_count(count: u32) -> Self {
        Self {
            feature_count: Some(count),
        }
    }
}

// ============================================================================
// Subcommands
// ============================================================================

/// Vibration speed for one actuator of a `VibrateCmd`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpeedSubcommand {
    /// Actuator index, less than the device's vibrate feature count.
    pub index: u32,
    /// Speed in `[0.0, 1.0]`.
    pub speed: f64,
}

impl SpeedSubcommand {
    /// Creates a speed subcommand.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, speed: f64) -> Self {
        Self { index, speed }
    }
}

/// Rotation speed and direction for one actuator of a `RotateCmd`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RotateSubcommand {
    /// Actuator index, less than the device's rotate feature count.
    pub index: u32,
    /// Speed in `[0.0, 1.0]`.
    pub speed: f64,
    /// `true` rotates clockwise, `false` counterclockwise.
    pub clockwise: bool,
}

impl RotateSubcommand {
    /// Creates a rotate subcommand.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, speed: f64, clockwise: bool) -> Self {
        Self {
            index,
            speed,
            clockwise,
        }
    }
}

/// Position and movement duration for one actuator of a `LinearCmd`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LinearSubcommand {
    /// Actuator index, less than the device's linear feature count.
    pub index: u32,
    /// Movement duration in milliseconds.
    pub duration: u32,
    /// Target position in `[0.0, 1.0]`.
    pub position: f64,
}

impl LinearSubcommand {
    /// Creates a linear subcommand.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, duration: u32, position: f64) -> Self {
        Self {
            index,
            duration,
            position,
        }
    }
}

// ============================================================================
// LogLevel
// ============================================================================

/// Log levels accepted by `RequestLog`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// Cancel a prior log subscription.
    Off,
    /// Fatal errors only.
    Fatal,
    /// Errors and above.
    Error,
    /// Warnings and above.
    Warn,
    /// Informational and above.
    Info,
    /// Debug and above.
    Debug,
    /// Everything.
    Trace,
}

impl LogLevel {
    /// Returns the wire string for this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Fatal => "Fatal",
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ErrorCode
// ============================================================================

/// Numeric error classes carried by server `Error` replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Unclassified failure; also the fallback for unrecognized codes.
    Unknown,
    /// Failure during the identification handshake.
    Init,
    /// Ping timeout.
    Ping,
    /// Malformed message.
    Message,
    /// Device failure.
    Device,
}

impl ErrorCode {
    /// Converts a wire code into its class.
    ///
    /// Total: unrecognized codes map to [`ErrorCode::Unknown`].
    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Init,
            2 => Self::Ping,
            3 => Self::Message,
            4 => Self::Device,
            _ => Self::Unknown,
        }
    }

    /// Returns the wire code for this class.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::Init => 1,
            Self::Ping => 2,
            Self::Message => 3,
            Self::Device => 4,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn to_value(msg: &Message) -> serde_json::Value {
        serde_json::to_value(msg).expect("serialize")
    }

    fn roundtrip(msg: Message) -> Message {
        let text = serde_json::to_string(&msg).expect("serialize");
        serde_json::from_str(&text).expect("deserialize")
    }

    #[test]
    fn test_ok_wire_shape() {
        let msg = Message::Ok { id: 1 };
        assert_eq!(to_value(&msg), json!({"Ok": {"Id": 1}}));
        assert_eq!(roundtrip(msg.clone()), msg);
    }

    #[test]
    fn test_error_wire_shape() {
        let msg = Message::Error {
            error_message: "Test".into(),
            error_code: 3,
            id: 1,
        };
        assert_eq!(
            to_value(&msg),
            json!({"Error": {"ErrorMessage": "Test", "ErrorCode": 3, "Id": 1}})
        );
        assert_eq!(roundtrip(msg.clone()), msg);
    }

    #[test]
    fn test_request_server_info_wire_shape() {
        let msg = Message::RequestServerInfo {
            client_name: "Test Client".into(),
            message_version: 1,
            id: 1,
        };
        assert_eq!(
            to_value(&msg),
            json!({"RequestServerInfo": {
                "ClientName": "Test Client",
                "MessageVersion": 1,
                "Id": 1
            }})
        );
        assert_eq!(roundtrip(msg.clone()), msg);
    }

    #[test]
    fn test_server_info_decodes() {
        let text = r#"{"ServerInfo": {"ServerName": "Intiface", "MajorVersion": 1,
            "MinorVersion": 0, "BuildVersion": 0, "MessageVersion": 1,
            "MaxPingTime": 0, "Id": 1}}"#;
        let msg: Message = serde_json::from_str(text).expect("parse");
        assert_eq!(
            msg,
            Message::ServerInfo {
                server_name: "Intiface".into(),
                major_version: 1,
                minor_version: 0,
                build_version: 0,
                message_version: 1,
                max_ping_time: 0,
                id: 1,
            }
        );
    }

    #[test]
    fn test_device_added_wire_shape() {
        let mut messages = FxHashMap::default();
        messages.insert(
            "VibrateCmd".to_string(),
            MessageAttributes::with_feature_count(1),
        );
        let msg = Message::DeviceAdded {
            device_name: "Test Device".into(),
            device_index: 1,
            device_messages: messages,
            id: 1,
        };
        assert_eq!(
            to_value(&msg),
            json!({"DeviceAdded": {
                "DeviceName": "Test Device",
                "DeviceIndex": 1,
                "DeviceMessages": {"VibrateCmd": {"FeatureCount": 1}},
                "Id": 1
            }})
        );
        assert_eq!(roundtrip(msg.clone()), msg);
    }

    #[test]
    fn test_device_removed_wire_shape() {
        let msg = Message::DeviceRemoved {
            device_index: 1,
            id: 1,
        };
        assert_eq!(
            to_value(&msg),
            json!({"DeviceRemoved": {"DeviceIndex": 1, "Id": 1}})
        );
        assert_eq!(roundtrip(msg.clone()), msg);
    }

    #[test]
    fn test_device_list_wire_shape() {
        let mut first = FxHashMap::default();
        first.insert(
            "VibrateCmd".to_string(),
            MessageAttributes::with_feature_count(2),
        );
        first.insert("StopDeviceCmd".to_string(), MessageAttributes::default());
        let mut second = FxHashMap::default();
        second.insert(
            "LinearCmd".to_string(),
            MessageAttributes::with_feature_count(1),
        );
        let msg = Message::DeviceList {
            devices: vec![
                DeviceInfo::new("TestDevice1", 0, first),
                DeviceInfo::new("TestDevice2", 1, second),
            ],
            id: 1,
        };
        assert_eq!(
            to_value(&msg),
            json!({"DeviceList": {
                "Devices": [
                    {
                        "DeviceName": "TestDevice1",
                        "DeviceIndex": 0,
                        "DeviceMessages": {
                            "VibrateCmd": {"FeatureCount": 2},
                            "StopDeviceCmd": {}
                        }
                    },
                    {
                        "DeviceName": "TestDevice2",
                        "DeviceIndex": 1,
                        "DeviceMessages": {"LinearCmd": {"FeatureCount": 1}}
                    }
                ],
                "Id": 1
            }})
        );
        assert_eq!(roundtrip(msg.clone()), msg);
    }

    #[test]
    fn test_vibrate_cmd_wire_shape() {
        let msg = Message::VibrateCmd {
            device_index: 0,
            speeds: vec![
                SpeedSubcommand::new(0, 0.0),
                SpeedSubcommand::new(1, 0.5),
            ],
            id: 1,
        };
        assert_eq!(
            to_value(&msg),
            json!({"VibrateCmd": {
                "DeviceIndex": 0,
                "Speeds": [
                    {"Index": 0, "Speed": 0.0},
                    {"Index": 1, "Speed": 0.5}
                ],
                "Id": 1
            }})
        );
        assert_eq!(roundtrip(msg.clone()), msg);
    }

    #[test]
    fn test_rotate_cmd_wire_shape() {
        let msg = Message::RotateCmd {
            device_index: 0,
            rotations: vec![
                RotateSubcommand::new(0, 0.0, false),
                RotateSubcommand::new(1, 0.5, true),
            ],
            id: 1,
        };
        assert_eq!(
            to_value(&msg),
            json!({"RotateCmd": {
                "DeviceIndex": 0,
                "Rotations": [
                    {"Index": 0, "Speed": 0.0, "Clockwise": false},
                    {"Index": 1, "Speed": 0.5, "Clockwise": true}
                ],
                "Id": 1
            }})
        );
        assert_eq!(roundtrip(msg.clone()), msg);
    }

    #[test]
    fn test_linear_cmd_wire_shape() {
        let msg = Message::LinearCmd {
            device_index: 0,
            vectors: vec![
                LinearSubcommand::new(0, 100, 1.0),
                LinearSubcommand::new(1, 500, 0.5),
            ],
            id: 1,
        };
        assert_eq!(
            to_value(&msg),
            json!({"LinearCmd": {
                "DeviceIndex": 0,
                "Vectors": [
                    {"Index": 0, "Duration": 100, "Position": 1.0},
                    {"Index": 1, "Duration": 500, "Position": 0.5}
                ],
                "Id": 1
            }})
        );
        assert_eq!(roundtrip(msg.clone()), msg);
    }

    #[test]
    fn test_empty_field_variants_roundtrip() {
        for msg in [
            Message::Ok { id: 1 },
            Message::Ping { id: 2 },
            Message::RequestDeviceList { id: 3 },
            Message::StartScanning { id: 4 },
            Message::StopScanning { id: 5 },
            Message::ScanningFinished { id: SYSTEM_ID },
            Message::StopAllDevices { id: 6 },
        ] {
            assert_eq!(roundtrip(msg.clone()), msg);
        }
    }

    #[test]
    fn test_log_messages_roundtrip() {
        let request = Message::RequestLog {
            log_level: LogLevel::Info.as_str().to_string(),
            id: 2,
        };
        assert_eq!(
            to_value(&request),
            json!({"RequestLog": {"LogLevel": "Info", "Id": 2}})
        );

        let line = Message::Log {
            log_level: "Debug".into(),
            log_message: "scanning started".into(),
            id: SYSTEM_ID,
        };
        assert_eq!(roundtrip(line.clone()), line);
    }

    #[test]
    fn test_numeric_speed_normalization() {
        // Servers may send integer literals where floats are expected.
        let text = r#"{"VibrateCmd": {"DeviceIndex": 0,
            "Speeds": [{"Index": 0, "Speed": 1}], "Id": 1}}"#;
        let msg: Message = serde_json::from_str(text).expect("parse");
        match msg {
            Message::VibrateCmd { speeds, .. } => {
                assert!((speeds[0].speed - 1.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected variant {}", other.name()),
        }
    }

    #[test]
    fn test_unknown_variant_fails() {
        let text = r#"{"WarpDriveCmd": {"Id": 1}}"#;
        assert!(serde_json::from_str::<Message>(text).is_err());
    }

    #[test]
    fn test_missing_required_field_fails() {
        let text = r#"{"Error": {"ErrorMessage": "Test", "Id": 1}}"#;
        assert!(serde_json::from_str::<Message>(text).is_err());
    }

    #[test]
    fn test_name_and_id_accessors() {
        let mut msg = Message::StartScanning { id: DEFAULT_ID };
        assert_eq!(msg.name(), "StartScanning");
        assert_eq!(msg.id(), 1);

        msg.set_id(7);
        assert_eq!(msg.id(), 7);
    }

    #[test]
    fn test_message_attributes_empty_object() {
        let attrs: MessageAttributes = serde_json::from_str("{}").expect("parse");
        assert_eq!(attrs.feature_count, None);
        assert_eq!(
            serde_json::to_string(&attrs).expect("serialize"),
            "{}"
        );
    }

    #[test]
    fn test_error_code_mapping_is_total() {
        assert_eq!(ErrorCode::from_code(0), ErrorCode::Unknown);
        assert_eq!(ErrorCode::from_code(1), ErrorCode::Init);
        assert_eq!(ErrorCode::from_code(2), ErrorCode::Ping);
        assert_eq!(ErrorCode::from_code(3), ErrorCode::Message);
        assert_eq!(ErrorCode::from_code(4), ErrorCode::Device);
        assert_eq!(ErrorCode::from_code(u32::MAX), ErrorCode::Unknown);
    }

    #[test]
    fn test_log_level_strings() {
        assert_eq!(LogLevel::Off.as_str(), "Off");
        assert_eq!(LogLevel::Trace.to_string(), "Trace");
    }
}
