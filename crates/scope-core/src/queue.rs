//! Sample queue between the ingestion and refresh contexts
//!
//! Backed by an unbounded tokio channel: appends never block and never
//! reject while the consumer is alive. There is no backpressure, so if the
//! refresh context stops draining while ingestion keeps running the queue
//! grows without limit. Callers that need bounded memory have to throttle
//! ingestion themselves.

use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::error::ScopeError;
use crate::sample::Sample;

/// Create a connected sender/queue pair
pub fn sample_queue() -> (SampleSender, SampleQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SampleSender { tx }, SampleQueue { rx })
}

/// Producer side of the sample queue
#[derive(Debug, Clone)]
pub struct SampleSender {
    tx: mpsc::UnboundedSender<Sample>,
}

impl SampleSender {
    /// Append a sample
    ///
    /// Fails only if the consuming side has been dropped.
    pub fn append(&self, sample: Sample) -> Result<(), ScopeError> {
        self.tx.send(sample).map_err(|_| ScopeError::QueueClosed)
    }

    /// Whether the consuming side has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side of the sample queue
#[derive(Debug)]
pub struct SampleQueue {
    rx: mpsc::UnboundedReceiver<Sample>,
}

impl SampleQueue {
    /// Snapshot check for pending samples
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Number of pending samples
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Remove up to `max` samples in arrival order
    pub fn drain_up_to(&mut self, max: usize) -> Vec<Sample> {
        let mut drained = Vec::with_capacity(max.min(self.rx.len()));
        while drained.len() < max {
            match self.rx.try_recv() {
                Ok(sample) => drained.push(sample),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(samples: &[Sample]) -> Vec<f64> {
        samples.iter().map(Sample::value).collect()
    }

    #[test]
    fn test_drain_is_fifo_and_bounded() {
        let (tx, mut queue) = sample_queue();
        for i in 0..5 {
            tx.append(Sample::new(i as f64, format!("t{}", i))).unwrap();
        }

        assert_eq!(queue.len(), 5);
        assert_eq!(values(&queue.drain_up_to(3)), vec![0.0, 1.0, 2.0]);
        assert_eq!(values(&queue.drain_up_to(3)), vec![3.0, 4.0]);
        assert!(queue.is_empty());
        assert!(queue.drain_up_to(3).is_empty());
    }

    #[test]
    fn test_drain_zero() {
        let (tx, mut queue) = sample_queue();
        tx.append(Sample::new(1.0, "t")).unwrap();
        assert!(queue.drain_up_to(0).is_empty());
        assert!(!queue.is_empty());
    }

    #[test]
    fn test_append_after_consumer_dropped() {
        let (tx, queue) = sample_queue();
        drop(queue);
        assert!(tx.is_closed());
        assert_eq!(tx.append(Sample::new(1.0, "t")), Err(ScopeError::QueueClosed));
    }

    #[test]
    fn test_drain_survives_dropped_sender() {
        let (tx, mut queue) = sample_queue();
        tx.append(Sample::new(7.0, "t")).unwrap();
        drop(tx);
        assert_eq!(values(&queue.drain_up_to(10)), vec![7.0]);
    }

    #[test]
    fn test_concurrent_producers() {
        let (tx, mut queue) = sample_queue();
        let handles: Vec<_> = (0..4)
            .map(|p| {
                let tx = tx.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        tx.append(Sample::new(i as f64, format!("p{}", p))).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(queue.drain_up_to(1000).len(), 400);
    }
}
