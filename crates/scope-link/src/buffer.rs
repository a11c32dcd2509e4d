//! In-memory message source
//!
//! `MessageBuffer` holds pending link messages in one FIFO per kind. A
//! device reader (or the simulator) pushes messages in; the scope pipeline
//! pops them back out through [`MessageSource`].

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::LinkError;
use crate::message::{decode_line, MessageKind, RawMessage};
use crate::MessageSource;

#[derive(Debug, Default)]
struct Inner {
    queues: HashMap<MessageKind, VecDeque<RawMessage>>,
    closed: bool,
    read_fault: Option<String>,
}

/// Thread-safe per-kind message store
#[derive(Debug, Default)]
pub struct MessageBuffer {
    inner: Mutex<Inner>,
}

impl MessageBuffer {
    /// Create an empty, open buffer
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Every mutation leaves Inner consistent, so a poisoned lock is still usable
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a message
    pub fn push(&self, message: RawMessage) -> Result<(), LinkError> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(LinkError::Closed);
        }
        inner.queues.entry(message.kind).or_default().push_back(message);
        Ok(())
    }

    /// Decode a link line and queue the resulting message
    pub fn push_line(&self, line: &str, time_received: impl Into<String>) -> Result<(), LinkError> {
        self.push(decode_line(line, time_received))
    }

    /// Number of pending messages of a kind
    pub fn pending(&self, kind: MessageKind) -> usize {
        self.lock().queues.get(&kind).map_or(0, VecDeque::len)
    }

    /// Close the buffer; already queued messages can still be popped
    pub fn close(&self) {
        self.lock().closed = true;
    }

    /// Make every subsequent read fail with the given reason
    ///
    /// Models a device link that has gone bad (unplugged cable, driver error).
    pub fn set_read_fault(&self, reason: impl Into<String>) {
        self.lock().read_fault = Some(reason.into());
    }

    /// Clear a previously set read fault
    pub fn clear_read_fault(&self) {
        self.lock().read_fault = None;
    }

    fn check_fault(inner: &Inner) -> Result<(), LinkError> {
        match &inner.read_fault {
            Some(reason) => Err(LinkError::ReadFault(reason.clone())),
            None => Ok(()),
        }
    }
}

impl MessageSource for MessageBuffer {
    fn pop_next(&self, kind: MessageKind) -> Result<Option<RawMessage>, LinkError> {
        let mut inner = self.lock();
        Self::check_fault(&inner)?;
        Ok(inner.queues.get_mut(&kind).and_then(VecDeque::pop_front))
    }

    fn pop_latest(&self, kind: MessageKind) -> Result<Option<RawMessage>, LinkError> {
        let mut inner = self.lock();
        Self::check_fault(&inner)?;
        Ok(inner.queues.get_mut(&kind).and_then(|queue| {
            let latest = queue.pop_back();
            queue.clear();
            latest
        }))
    }

    fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_next_is_fifo_per_kind() {
        let buffer = MessageBuffer::new();
        buffer.push(RawMessage::data("1", "t1")).unwrap();
        buffer.push(RawMessage::setting("rate:100", "t2")).unwrap();
        buffer.push(RawMessage::data("2", "t3")).unwrap();

        let first = buffer.pop_next(MessageKind::Data).unwrap().unwrap();
        let second = buffer.pop_next(MessageKind::Data).unwrap().unwrap();
        assert_eq!(first.payload, "1");
        assert_eq!(second.payload, "2");
        assert_eq!(buffer.pop_next(MessageKind::Data).unwrap(), None);
        assert_eq!(buffer.pending(MessageKind::Setting), 1);
    }

    #[test]
    fn test_pop_latest_discards_older() {
        let buffer = MessageBuffer::new();
        buffer.push(RawMessage::setting("rate:100", "t1")).unwrap();
        buffer.push(RawMessage::setting("rate:200", "t2")).unwrap();
        buffer.push(RawMessage::setting("rate:300", "t3")).unwrap();

        let latest = buffer.pop_latest(MessageKind::Setting).unwrap().unwrap();
        assert_eq!(latest.payload, "rate:300");
        assert_eq!(buffer.pending(MessageKind::Setting), 0);
        assert_eq!(buffer.pop_latest(MessageKind::Setting).unwrap(), None);
    }

    #[test]
    fn test_push_line_routes_by_kind() {
        let buffer = MessageBuffer::new();
        buffer.push_line("DATA:21.5", "t").unwrap();
        buffer.push_line("SETTING:rate:500", "t").unwrap();
        buffer.push_line("garbage", "t").unwrap();

        assert_eq!(buffer.pending(MessageKind::Data), 1);
        assert_eq!(buffer.pending(MessageKind::Setting), 1);
        assert_eq!(buffer.pending(MessageKind::Error), 1);
    }

    #[test]
    fn test_closed_rejects_push_but_drains() {
        let buffer = MessageBuffer::new();
        buffer.push(RawMessage::data("1", "t")).unwrap();
        buffer.close();

        assert!(buffer.is_closed());
        assert_eq!(buffer.push(RawMessage::data("2", "t")), Err(LinkError::Closed));
        assert!(buffer.pop_next(MessageKind::Data).unwrap().is_some());
    }

    #[test]
    fn test_read_fault() {
        let buffer = MessageBuffer::new();
        buffer.push(RawMessage::data("1", "t")).unwrap();
        buffer.set_read_fault("cable unplugged");

        assert_eq!(
            buffer.pop_next(MessageKind::Data),
            Err(LinkError::ReadFault("cable unplugged".to_string()))
        );

        buffer.clear_read_fault();
        assert!(buffer.pop_next(MessageKind::Data).unwrap().is_some());
    }
}
