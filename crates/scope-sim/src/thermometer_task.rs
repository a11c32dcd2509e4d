//! Virtual thermometer actor task
//!
//! This module provides an async task that owns a VirtualThermometer and feeds
//! its output into a MessageBuffer. The task uses a select! loop to:
//! - Take a reading on every sample interval and push the resulting lines
//! - Handle control commands from a channel
//! - Emit state events via a broadcast channel

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use scope_link::{LinkError, MessageBuffer};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{SimError, VirtualThermometer};

/// Commands that can be sent to a virtual thermometer actor
#[derive(Debug, Clone)]
pub enum ThermometerCommand {
    /// Change the time between readings
    SetSampleInterval(u64),
    /// Change the fraction of readings replaced by faults
    SetFaultRate(f64),
    /// Emit one unparseable `DATA` line
    InjectMalformed,
    /// Stop reading and close the buffer
    Shutdown,
}

/// State event emitted after every reading
#[derive(Debug, Clone, PartialEq)]
pub struct ThermometerStateEvent {
    /// Most recent good reading, if any
    pub last_reading: Option<f64>,
    /// Readings taken so far
    pub samples: u64,
    /// Faults emitted so far
    pub faults: u64,
    /// Current sample interval in milliseconds
    pub sample_interval_ms: u64,
}

impl ThermometerStateEvent {
    fn of(thermo: &VirtualThermometer) -> Self {
        Self {
            last_reading: thermo.last_reading(),
            samples: thermo.steps(),
            faults: thermo.faults(),
            sample_interval_ms: thermo.sample_interval_ms(),
        }
    }
}

/// Wall-clock label attached to each pushed line
pub fn time_label() -> String {
    Local::now().format("%H:%M:%S%.3f").to_string()
}

fn reading_timer(ms: u64) -> Interval {
    let mut timer = interval(Duration::from_millis(ms));
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

/// Run the virtual thermometer actor task
///
/// Lines are pushed to `buffer` as the thermometer produces them. The task
/// ends on `Shutdown`, when the command channel closes, or when someone else
/// closes the buffer. On the way out the buffer is closed so the ingestion
/// side sees the end of the stream.
pub async fn run_thermometer_task(
    mut thermo: VirtualThermometer,
    buffer: Arc<MessageBuffer>,
    mut cmd_rx: mpsc::Receiver<ThermometerCommand>,
    state_tx: broadcast::Sender<ThermometerStateEvent>,
) -> Result<(), SimError> {
    info!(
        "Starting virtual thermometer task for {} ({}ms interval)",
        thermo.id(),
        thermo.sample_interval_ms()
    );

    let mut sample_timer = reading_timer(thermo.sample_interval_ms());
    let _ = state_tx.send(ThermometerStateEvent::of(&thermo));

    let result = loop {
        tokio::select! {
            _ = sample_timer.tick() => {
                thermo.advance();
                match flush(&mut thermo, &buffer) {
                    Ok(()) => {
                        let _ = state_tx.send(ThermometerStateEvent::of(&thermo));
                    }
                    Err(LinkError::Closed) => {
                        debug!("Buffer closed under virtual thermometer {}", thermo.id());
                        break Ok(());
                    }
                    Err(e) => break Err(SimError::from(e)),
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(ThermometerCommand::SetSampleInterval(ms)) => {
                        match thermo.set_sample_interval(ms) {
                            Ok(()) => {
                                info!("Virtual thermometer {} interval set to {}ms", thermo.id(), ms);
                                sample_timer = reading_timer(ms);
                                if let Err(e) = flush(&mut thermo, &buffer) {
                                    warn!("Failed to announce interval change: {}", e);
                                }
                            }
                            Err(e) => warn!("Ignoring interval change: {}", e),
                        }
                    }
                    Some(ThermometerCommand::SetFaultRate(rate)) => {
                        match thermo.set_fault_rate(rate) {
                            Ok(()) => info!("Virtual thermometer {} fault rate set to {}", thermo.id(), rate),
                            Err(e) => warn!("Ignoring fault rate change: {}", e),
                        }
                    }
                    Some(ThermometerCommand::InjectMalformed) => {
                        warn!("Injecting malformed reading on {}", thermo.id());
                        thermo.inject_malformed();
                        if let Err(e) = flush(&mut thermo, &buffer) {
                            warn!("Failed to push malformed reading: {}", e);
                        }
                    }
                    Some(ThermometerCommand::Shutdown) => {
                        info!("Shutdown requested for virtual thermometer {}", thermo.id());
                        break Ok(());
                    }
                    None => {
                        debug!("Command channel closed for virtual thermometer {}", thermo.id());
                        break Ok(());
                    }
                }
            }
        }
    };

    buffer.close();
    info!(
        "Virtual thermometer task ended for {} after {} readings",
        thermo.id(),
        thermo.steps()
    );
    result
}

/// Push every pending line into the buffer
fn flush(thermo: &mut VirtualThermometer, buffer: &MessageBuffer) -> Result<(), LinkError> {
    let label = time_label();
    while let Some(line) = thermo.take_output() {
        buffer.push_line(&line, label.clone())?;
    }
    Ok(())
}
