//! Raw link messages
//!
//! The device sends one message per line in the form `KIND:payload`, where
//! `KIND` is one of `DATA`, `SETTING` or `ERR`. Everything after the first
//! `:` is the payload, so `SETTING:rate:500` carries the payload `rate:500`.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Kind of message received over the link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageKind {
    /// A telemetry reading
    Data,
    /// A device setting report (e.g. refresh rate)
    Setting,
    /// A corrupted or error frame
    Error,
}

impl MessageKind {
    /// All message kinds, in wire order
    pub const ALL: [MessageKind; 3] = [MessageKind::Data, MessageKind::Setting, MessageKind::Error];

    /// Returns the wire name of the kind
    pub fn name(&self) -> &'static str {
        match self {
            MessageKind::Data => "DATA",
            MessageKind::Setting => "SETTING",
            MessageKind::Error => "ERR",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MessageKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        match s.trim() {
            "DATA" => Ok(MessageKind::Data),
            "SETTING" => Ok(MessageKind::Setting),
            "ERR" => Ok(MessageKind::Error),
            other => Err(ParseError::UnknownKind(other.to_string())),
        }
    }
}

/// A message as received from the device link
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawMessage {
    /// Message kind
    pub kind: MessageKind,
    /// Payload text (numeric text for `DATA`)
    pub payload: String,
    /// Label for the time the message was received
    pub time_received: String,
}

impl RawMessage {
    /// Create a new message
    pub fn new(kind: MessageKind, payload: impl Into<String>, time_received: impl Into<String>) -> Self {
        Self {
            kind,
            payload: payload.into(),
            time_received: time_received.into(),
        }
    }

    /// Create a `DATA` message
    pub fn data(payload: impl Into<String>, time_received: impl Into<String>) -> Self {
        Self::new(MessageKind::Data, payload, time_received)
    }

    /// Create a `SETTING` message
    pub fn setting(payload: impl Into<String>, time_received: impl Into<String>) -> Self {
        Self::new(MessageKind::Setting, payload, time_received)
    }

    /// Create an `ERR` message
    pub fn err(payload: impl Into<String>, time_received: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, payload, time_received)
    }

    /// Encode the message back to its line form (without terminator)
    pub fn encode_line(&self) -> String {
        format!("{}:{}", self.kind, self.payload)
    }
}

/// Decode a single link line into a message
///
/// Lines that lack a separator or carry an unknown kind become `ERR`
/// messages holding the whole line, so they are never mistaken for data.
pub fn decode_line(line: &str, time_received: impl Into<String>) -> RawMessage {
    let line = line.trim_end_matches(['\r', '\n']);

    match line.split_once(':') {
        Some((kind, payload)) => match kind.parse::<MessageKind>() {
            Ok(kind) => RawMessage::new(kind, payload.trim(), time_received),
            Err(e) => {
                tracing::debug!("Undecodable link line {:?}: {}", line, e);
                RawMessage::err(line, time_received)
            }
        },
        None => RawMessage::err(line, time_received),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in MessageKind::ALL {
            assert_eq!(kind.name().parse::<MessageKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(
            "TEMP".parse::<MessageKind>(),
            Err(ParseError::UnknownKind("TEMP".to_string()))
        );
    }

    #[test]
    fn test_decode_data_line() {
        let msg = decode_line("DATA:23.5\r\n", "12:00:01");
        assert_eq!(msg.kind, MessageKind::Data);
        assert_eq!(msg.payload, "23.5");
        assert_eq!(msg.time_received, "12:00:01");
    }

    #[test]
    fn test_decode_setting_keeps_inner_separator() {
        let msg = decode_line("SETTING:rate:500", "t");
        assert_eq!(msg.kind, MessageKind::Setting);
        assert_eq!(msg.payload, "rate:500");
    }

    #[test]
    fn test_decode_garbage_becomes_err() {
        let msg = decode_line("\u{fffd}\u{fffd}23", "t");
        assert_eq!(msg.kind, MessageKind::Error);
        assert_eq!(msg.payload, "\u{fffd}\u{fffd}23");

        let msg = decode_line("TEMP:21", "t");
        assert_eq!(msg.kind, MessageKind::Error);
        assert_eq!(msg.payload, "TEMP:21");
    }

    #[test]
    fn test_decode_empty_payload() {
        let msg = decode_line("DATA:", "t");
        assert_eq!(msg.kind, MessageKind::Data);
        assert!(msg.payload.is_empty());
    }

    #[test]
    fn test_encode_line() {
        assert_eq!(RawMessage::setting("rate:250", "t").encode_line(), "SETTING:rate:250");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn unknown_prefix_never_decodes_as_data(prefix in "[a-z#~]{1,6}", rest in ".{0,20}") {
                let line = format!("{}:{}", prefix, rest);
                let msg = decode_line(&line, "t");
                prop_assert_eq!(msg.kind, MessageKind::Error);
            }

            #[test]
            fn data_lines_keep_trimmed_payload(payload in "[0-9.\\-]{0,12}") {
                let msg = decode_line(&format!("DATA:{}\r\n", payload), "t");
                prop_assert_eq!(msg.kind, MessageKind::Data);
                prop_assert_eq!(msg.payload, payload);
            }
        }
    }
}
