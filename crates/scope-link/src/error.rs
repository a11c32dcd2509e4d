//! Error types for the telemetry device link

use thiserror::Error;

/// Errors that can occur while interpreting link payloads
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Message kind prefix is not one the link knows about
    #[error("unknown message kind: {0}")]
    UnknownKind(String),

    /// Payload is missing the `name:value` separator
    #[error("missing ':' separator in {0:?}")]
    MissingSeparator(String),

    /// Setting value could not be interpreted
    #[error("invalid setting value: {0:?}")]
    InvalidSetting(String),
}

/// Errors raised by a message source
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The source has been closed and accepts no more messages
    #[error("message source closed")]
    Closed,

    /// The source failed to supply messages
    #[error("read fault: {0}")]
    ReadFault(String),
}
