//! Telemetry Link Library
//!
//! This crate describes the boundary between a telemetry device link and
//! the scope pipeline:
//!
//! - **Messages**: `DATA`, `SETTING` and `ERR` frames decoded from `KIND:payload` lines
//! - **Sources**: the [`MessageSource`] trait the pipeline pulls messages through
//! - **Buffer**: [`MessageBuffer`], a thread-safe in-memory source with per-kind queues
//! - **Settings**: [`SettingReport`] parsing for the device's refresh rate reports
//!
//! # Example
//!
//! ```rust
//! use scope_link::{MessageBuffer, MessageKind, MessageSource, SettingReport};
//!
//! let buffer = MessageBuffer::new();
//! buffer.push_line("DATA:21.5", "12:00:00").unwrap();
//! buffer.push_line("SETTING:rate:500", "12:00:00").unwrap();
//!
//! let data = buffer.pop_next(MessageKind::Data).unwrap().unwrap();
//! assert_eq!(data.payload, "21.5");
//!
//! let setting = buffer.pop_latest(MessageKind::Setting).unwrap().unwrap();
//! assert_eq!(SettingReport::parse(&setting.payload).unwrap().refresh_ms, 500);
//! ```

pub mod buffer;
pub mod error;
pub mod message;
pub mod setting;

pub use buffer::MessageBuffer;
pub use error::{LinkError, ParseError};
pub use message::{decode_line, MessageKind, RawMessage};
pub use setting::SettingReport;

/// A pull-based source of link messages
///
/// Implementations must be safe to share between the ingestion context
/// (which pops `DATA`) and the refresh context (which pops `SETTING`).
pub trait MessageSource: Send + Sync {
    /// Remove and return the next pending message of `kind`
    fn pop_next(&self, kind: MessageKind) -> Result<Option<RawMessage>, LinkError>;

    /// Return the most recent pending message of `kind`, discarding older ones
    fn pop_latest(&self, kind: MessageKind) -> Result<Option<RawMessage>, LinkError>;

    /// Whether the source will never produce further messages
    fn is_closed(&self) -> bool {
        false
    }
}

impl<T: MessageSource + ?Sized> MessageSource for std::sync::Arc<T> {
    fn pop_next(&self, kind: MessageKind) -> Result<Option<RawMessage>, LinkError> {
        (**self).pop_next(kind)
    }

    fn pop_latest(&self, kind: MessageKind) -> Result<Option<RawMessage>, LinkError> {
        (**self).pop_latest(kind)
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}
