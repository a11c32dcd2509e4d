//! Telemetry Scope Engine
//!
//! This crate provides the streaming windowed-aggregation core behind a
//! real-time telemetry chart.
//!
//! # Architecture
//!
//! The pipeline is split across two independently scheduled contexts:
//!
//! - **Ingestion**: an [`Ingestor`] pulls `DATA` messages from a
//!   [`MessageSource`](scope_link::MessageSource), converts them to
//!   [`Sample`]s and appends them to the [`SampleQueue`]. It usually runs as
//!   a tokio task via [`spawn_ingestor`].
//! - **Refresh**: a [`RefreshLoop`] is ticked by an external frame or timer
//!   source. Each tick drains the queue into the bounded display window,
//!   recomputes the average and display range, and pushes the result to a
//!   [`RenderSurface`].
//!
//! The queue is the only state shared between the two. The window and the
//! zoom configuration belong to the refresh side alone.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use scope_core::{build_pipeline, ChartFrame, ScopeConfig};
//! use scope_link::{MessageBuffer, RawMessage};
//!
//! let buffer = Arc::new(MessageBuffer::new());
//! let (mut ingestor, mut refresh) = build_pipeline(&ScopeConfig::default(), buffer.clone()).unwrap();
//!
//! buffer.push(RawMessage::data("21.5", "12:00:00")).unwrap();
//! ingestor.run_batch().unwrap();
//!
//! let mut frame = ChartFrame::new();
//! refresh.start();
//! refresh.tick(&mut frame);
//! assert_eq!(frame.values(), vec![21.5]);
//! ```

use std::sync::Arc;

use scope_link::MessageSource;

pub mod config;
pub mod error;
pub mod ingest;
pub mod queue;
pub mod range;
pub mod refresh;
pub mod sample;
pub mod surface;
pub mod window;

pub use config::{ScopeConfig, ZoomLimits, DEFAULT_TITLE};
pub use error::ScopeError;
pub use ingest::{
    run_ingestor, spawn_ingestor, BatchReport, IngestStatus, Ingestor, IngestorHandle,
    DEFAULT_POLL_INTERVAL,
};
pub use queue::{sample_queue, SampleQueue, SampleSender};
pub use range::{DisplayRange, RangeController, ZoomDirection};
pub use refresh::{run_with_interval, RefreshLoop, RunState, ScopeSnapshot, StopHandle, TickOutcome};
pub use sample::{is_dropped, Sample};
pub use surface::{ChartFrame, RenderSurface};
pub use window::WindowManager;

/// Wire an ingestor and a refresh loop to the same source and queue
pub fn build_pipeline(
    config: &ScopeConfig,
    source: Arc<dyn MessageSource>,
) -> Result<(Ingestor, RefreshLoop), ScopeError> {
    let (sender, queue) = sample_queue();
    let refresh = RefreshLoop::new(config, source.clone(), queue)?;
    let ingestor = Ingestor::new(source, sender);
    Ok((ingestor, refresh))
}
