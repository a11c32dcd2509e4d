//! Telemetry samples

use scope_link::{MessageKind, RawMessage};

use crate::error::ScopeError;

/// One parsed reading with the label of the time it arrived
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    value: f64,
    timestamp_label: String,
}

impl Sample {
    /// Create a sample directly
    pub fn new(value: f64, timestamp_label: impl Into<String>) -> Self {
        Self {
            value,
            timestamp_label: timestamp_label.into(),
        }
    }

    /// Convert a `DATA` message into a sample
    ///
    /// The payload must parse as a finite floating point number.
    pub fn from_message(message: &RawMessage) -> Result<Self, ScopeError> {
        let payload = message.payload.trim();
        let value = payload
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ScopeError::MalformedSample {
                payload: message.payload.clone(),
            })?;

        Ok(Self::new(value, message.time_received.clone()))
    }

    /// The reading
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The arrival time label
    pub fn timestamp_label(&self) -> &str {
        &self.timestamp_label
    }
}

impl TryFrom<&RawMessage> for Sample {
    type Error = ScopeError;

    fn try_from(message: &RawMessage) -> Result<Self, Self::Error> {
        Self::from_message(message)
    }
}

/// Whether a message must be discarded before conversion
///
/// Empty payloads and `ERR` frames never become samples.
pub fn is_dropped(message: &RawMessage) -> bool {
    message.payload.is_empty() || message.kind == MessageKind::Error
}
