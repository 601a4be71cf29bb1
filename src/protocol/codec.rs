//! Wire frame encoding and decoding.
//!
//! A transport frame is UTF-8 JSON text containing an array of message
//! objects; the protocol batches multiple messages per frame. Outbound
//! sends wrap a single message in a one-element array.
//!
//! Decoding isolates failures per element: one element naming an unknown
//! variant or missing a field never drops its siblings. The caller decides
//! how to report per-element failures (the client logs them via `tracing`).

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use crate::error::{Error, Result};

use super::Message;

// ============================================================================
// Encoding
// ============================================================================

/// Encodes a batch of messages into one wire frame.
///
/// # Errors
///
/// Returns [`Error::Json`] if serialization fails.
pub fn encode_frame(messages: &[Message]) -> Result<String> {
    Ok(serde_json::to_string(messages)?)
}

/// Encodes a single message as a one-element frame, the outbound shape.
///
/// # Errors
///
/// Returns [`Error::Json`] if serialization fails.
pub fn encode_message(message: &Message) -> Result<String> {
    encode_frame(std::slice::from_ref(message))
}

// ============================================================================
// Decoding
// ============================================================================

/// Decodes a wire frame into its messages, one result per element.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the frame is not a JSON array at all.
/// Elements that fail to decode yield a per-element [`Error::Decode`]
/// without affecting the rest of the frame.
pub fn decode_frame(text: &str) -> Result<Vec<Result<Message>>> {
    let elements: Vec<Value> = serde_json::from_str(text)
        .map_err(|e| Error::decode(format!("frame is not a JSON array: {e}")))?;

    Ok(elements
        .into_iter()
        .map(|element| {
            serde_json::from_value(element)
                .map_err(|e| Error::decode(format!("bad frame element: {e}")))
        })
        .collect())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::protocol::{DEFAULT_ID, SpeedSubcommand};

    #[test]
    fn test_encode_message_wraps_in_array() {
        let frame = encode_message(&Message::Ok { id: 1 }).expect("encode");
        assert_eq!(frame, r#"[{"Ok":{"Id":1}}]"#);
    }

    #[test]
    fn test_decode_single_element_frame() {
        let frame = r#"[{"ServerInfo": {"ServerName": "Intiface",
            "MajorVersion": 1, "MinorVersion": 0, "BuildVersion": 0,
            "MessageVersion": 1, "MaxPingTime": 0, "Id": 1}}]"#;
        let decoded = decode_frame(frame).expect("decode");
        assert_eq!(decoded.len(), 1);
        let msg = decoded[0].as_ref().expect("element decodes");
        assert_eq!(msg.name(), "ServerInfo");
        assert_eq!(msg.id(), 1);
    }

    #[test]
    fn test_decode_batched_frame() {
        let frame = r#"[{"Ok":{"Id":2}},{"ScanningFinished":{"Id":0}}]"#;
        let decoded = decode_frame(frame).expect("decode");
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].as_ref().expect("ok").name(), "Ok");
        assert_eq!(
            decoded[1].as_ref().expect("ok").name(),
            "ScanningFinished"
        );
    }

    #[test]
    fn test_bad_element_does_not_drop_siblings() {
        let frame = r#"[{"Ok":{"Id":2}},{"WarpDriveCmd":{"Id":3}},{"Ok":{"Id":4}}]"#;
        let decoded = decode_frame(frame).expect("outer decode");
        assert_eq!(decoded.len(), 3);
        assert!(decoded[0].is_ok());
        assert!(matches!(decoded[1], Err(Error::Decode { .. })));
        assert!(decoded[2].is_ok());
        assert_eq!(decoded[2].as_ref().expect("ok").id(), 4);
    }

    #[test]
    fn test_non_array_frame_fails_whole() {
        assert!(matches!(
            decode_frame(r#"{"Ok":{"Id":1}}"#),
            Err(Error::Decode { .. })
        ));
        assert!(matches!(decode_frame("not json"), Err(Error::Decode { .. })));
    }

    #[test]
    fn test_roundtrip_through_frame() {
        let msg = Message::VibrateCmd {
            device_index: 2,
            speeds: vec![SpeedSubcommand::new(0, 0.75)],
            id: DEFAULT_ID,
        };
        let frame = encode_message(&msg).expect("encode");
        let decoded = decode_frame(&frame).expect("decode");
        assert_eq!(decoded.len(), 1);
        assert_eq!(*decoded[0].as_ref().expect("element"), msg);
    }
}
