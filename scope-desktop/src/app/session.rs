//! Streaming session lifecycle
//!
//! A session owns one pipeline: the message buffer, the virtual thermometer
//! task feeding it, the ingestion task draining it and the refresh loop the
//! UI ticks. Sessions are never restarted; a reset tears the old one down
//! and builds a fresh one.

use std::sync::Arc;

use scope_core::{build_pipeline, spawn_ingestor, IngestStatus, IngestorHandle, RefreshLoop};
use scope_link::MessageBuffer;
use scope_sim::{
    run_thermometer_task, ThermometerCommand, ThermometerStateEvent, VirtualThermometer,
};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use crate::error::DesktopError;
use crate::settings::Settings;

/// One live pipeline
pub struct Session {
    pub(super) buffer: Arc<MessageBuffer>,
    pub(super) refresh: RefreshLoop,
    pub(super) ingest: IngestorHandle,
    thermo_tx: mpsc::Sender<ThermometerCommand>,
    thermo_rx: broadcast::Receiver<ThermometerStateEvent>,
    /// Latest thermometer state seen by the UI
    pub(super) thermometer: Option<ThermometerStateEvent>,
}

impl Session {
    /// Build the pipeline and spawn its background tasks
    ///
    /// The refresh loop is left idle.
    pub fn launch(rt: &Handle, settings: &Settings) -> Result<Self, DesktopError> {
        settings.validate()?;

        let buffer = Arc::new(MessageBuffer::new());
        let (ingestor, refresh) = build_pipeline(&settings.scope, buffer.clone())?;
        let thermo = VirtualThermometer::from_config(settings.thermometer.clone())?;

        let (thermo_tx, cmd_rx) = mpsc::channel(16);
        let (state_tx, thermo_rx) = broadcast::channel(64);
        let task_buffer = buffer.clone();
        rt.spawn(async move {
            if let Err(e) = run_thermometer_task(thermo, task_buffer, cmd_rx, state_tx).await {
                tracing::error!("Virtual thermometer task failed: {}", e);
            }
        });

        let ingest = spawn_ingestor(rt, ingestor, settings.ingest_poll_interval());

        info!("Session launched for {}", settings.thermometer.id);
        Ok(Self {
            buffer,
            refresh,
            ingest,
            thermo_tx,
            thermo_rx,
            thermometer: None,
        })
    }

    /// Send a command to the thermometer task, logging if it cannot be delivered
    pub fn send_thermometer(&self, cmd: ThermometerCommand) {
        if let Err(e) = self.thermo_tx.try_send(cmd) {
            warn!(
                source = "Thermometer",
                "Failed to send command: {} (channel full or closed)", e
            );
        }
    }

    /// Pull pending thermometer state events (non-blocking)
    pub fn process_thermometer_events(&mut self) {
        loop {
            match self.thermo_rx.try_recv() {
                Ok(event) => self.thermometer = Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::debug!("Skipped {} thermometer events", n);
                }
                Err(_) => break,
            }
        }
    }

    pub fn ingest_status(&self) -> IngestStatus {
        self.ingest.status()
    }

    /// Stop the feed and close the link
    ///
    /// The ingestion task drains what is left and finishes on its own.
    pub fn shutdown(&self) {
        self.refresh.stop();
        self.send_thermometer(ThermometerCommand::Shutdown);
        self.buffer.close();
        info!("Session shut down after {} ticks", self.refresh.ticks());
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Closing is idempotent
        self.buffer.close();
    }
}
