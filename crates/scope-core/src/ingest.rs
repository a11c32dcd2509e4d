//! Sample ingestion
//!
//! The ingestor pulls `DATA` messages from the link, discards empty and
//! error frames, converts the rest to samples and appends them to the
//! sample queue. A malformed payload or a failing source aborts ingestion
//! for good; the refresh side keeps running on whatever was already queued.

use std::sync::Arc;
use std::time::Duration;

use scope_link::{MessageKind, MessageSource, RawMessage};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::error::ScopeError;
use crate::queue::SampleSender;
use crate::sample::{is_dropped, Sample};

/// Default pause between ingestion batches
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Message counts for one or more ingestion batches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Samples appended to the queue
    pub accepted: u64,
    /// Messages discarded by the drop policy
    pub dropped: u64,
}

/// Lifecycle of the ingestion task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestStatus {
    /// Still polling the source
    Running { samples: u64, dropped: u64 },
    /// Source closed and fully drained
    Finished { samples: u64, dropped: u64 },
    /// Stopped permanently on an error
    Failed {
        samples: u64,
        dropped: u64,
        reason: String,
    },
}

impl IngestStatus {
    /// Whether the task has ended, successfully or not
    pub fn is_terminal(&self) -> bool {
        !matches!(self, IngestStatus::Running { .. })
    }

    /// Short label for status displays
    pub fn label(&self) -> String {
        match self {
            IngestStatus::Running { samples, .. } => format!("Ingesting ({} samples)", samples),
            IngestStatus::Finished { samples, .. } => format!("Source closed ({} samples)", samples),
            IngestStatus::Failed { reason, .. } => format!("Ingestion stopped: {}", reason),
        }
    }
}

/// Producer half of the pipeline
pub struct Ingestor {
    source: Arc<dyn MessageSource>,
    sender: SampleSender,
    totals: BatchReport,
}

impl std::fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("source", &"<source>")
            .field("sender", &self.sender)
            .field("totals", &self.totals)
            .finish()
    }
}

impl Ingestor {
    /// Create an ingestor feeding `sender` from `source`
    pub fn new(source: Arc<dyn MessageSource>, sender: SampleSender) -> Self {
        Self {
            source,
            sender,
            totals: BatchReport::default(),
        }
    }

    /// Counts accumulated over every batch run so far
    pub fn totals(&self) -> BatchReport {
        self.totals
    }

    /// Whether the source will produce nothing further
    pub fn source_closed(&self) -> bool {
        self.source.is_closed()
    }

    /// Pull every currently available `DATA` message
    ///
    /// Pending `ERR` frames are discarded first and counted as dropped.
    /// Ends normally when the source has nothing left. Any conversion or
    /// read error ends the batch immediately; samples appended before the
    /// failure stay queued.
    pub fn run_batch(&mut self) -> Result<BatchReport, ScopeError> {
        let mut batch = BatchReport::default();

        while let Some(message) = self.source.pop_next(MessageKind::Error)? {
            self.record_drop(&message, &mut batch);
        }

        while let Some(message) = self.source.pop_next(MessageKind::Data)? {
            if is_dropped(&message) {
                self.record_drop(&message, &mut batch);
                continue;
            }

            let sample = Sample::from_message(&message)?;
            self.sender.append(sample)?;
            batch.accepted += 1;
            self.totals.accepted += 1;
        }

        Ok(batch)
    }

    fn record_drop(&mut self, message: &RawMessage, batch: &mut BatchReport) {
        debug!(
            "Dropping {} message received at {}",
            message.kind, message.time_received
        );
        batch.dropped += 1;
        self.totals.dropped += 1;
    }

    fn status(&self) -> IngestStatus {
        IngestStatus::Running {
            samples: self.totals.accepted,
            dropped: self.totals.dropped,
        }
    }
}

/// Run batches every `poll_interval` until the source closes or an error occurs
///
/// Status changes are published on `status_tx`. The task is never restarted:
/// once it returns, ingestion for this pipeline is over.
pub async fn run_ingestor(
    mut ingestor: Ingestor,
    poll_interval: Duration,
    status_tx: watch::Sender<IngestStatus>,
) -> Result<BatchReport, ScopeError> {
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Starting ingestion (poll every {:?})", poll_interval);

    loop {
        ticker.tick().await;

        // Sample the closed flag first so messages queued before the close are still drained
        let closed = ingestor.source_closed();

        match ingestor.run_batch() {
            Ok(batch) => {
                if batch.accepted > 0 || batch.dropped > 0 {
                    status_tx.send_replace(ingestor.status());
                }
            }
            Err(e) => {
                let totals = ingestor.totals();
                error!(
                    "Ingestion stopped after {} samples: {}",
                    totals.accepted, e
                );
                status_tx.send_replace(IngestStatus::Failed {
                    samples: totals.accepted,
                    dropped: totals.dropped,
                    reason: e.to_string(),
                });
                return Err(e);
            }
        }

        if closed {
            let totals = ingestor.totals();
            info!(
                "Source closed, ingestion finished ({} samples, {} dropped)",
                totals.accepted, totals.dropped
            );
            status_tx.send_replace(IngestStatus::Finished {
                samples: totals.accepted,
                dropped: totals.dropped,
            });
            return Ok(totals);
        }
    }
}

/// Handle to a spawned ingestion task
#[derive(Debug)]
pub struct IngestorHandle {
    status: watch::Receiver<IngestStatus>,
    task: JoinHandle<Result<BatchReport, ScopeError>>,
}

impl IngestorHandle {
    /// Latest published status
    pub fn status(&self) -> IngestStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to status changes
    pub fn subscribe(&self) -> watch::Receiver<IngestStatus> {
        self.status.clone()
    }

    /// Whether the task has returned
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the task to end
    pub async fn join(self) -> Result<BatchReport, ScopeError> {
        self.task
            .await
            .map_err(|e| ScopeError::Task(e.to_string()))?
    }
}

/// Spawn the ingestion task on `runtime`
pub fn spawn_ingestor(runtime: &Handle, ingestor: Ingestor, poll_interval: Duration) -> IngestorHandle {
    let (status_tx, status_rx) = watch::channel(ingestor.status());
    let task = runtime.spawn(run_ingestor(ingestor, poll_interval, status_tx));
    IngestorHandle {
        status: status_rx,
        task,
    }
}
