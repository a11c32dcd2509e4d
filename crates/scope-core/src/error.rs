//! Error types for the scope pipeline

use scope_link::{LinkError, ParseError};
use thiserror::Error;

/// Errors that can occur in the scope pipeline
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScopeError {
    /// A `DATA` payload was not a finite number
    ///
    /// Fatal to the ingestion context.
    #[error("malformed sample payload: {payload:?}")]
    MalformedSample {
        /// The offending payload
        payload: String,
    },

    /// The message source failed to supply messages
    ///
    /// Fatal to the ingestion context.
    #[error("source read error: {0}")]
    SourceRead(#[from] LinkError),

    /// A `SETTING` payload did not match the expected format
    ///
    /// Never fatal: the refresh tick skips the label update.
    #[error("setting parse error: {0}")]
    SettingParse(#[from] ParseError),

    /// The sample queue's consumer has been dropped
    #[error("sample queue closed")]
    QueueClosed,

    /// Configuration is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The ingestion task panicked or was cancelled
    #[error("ingestion task failed: {0}")]
    Task(String),
}
