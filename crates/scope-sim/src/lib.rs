//! Thermometer Simulation Library
//!
//! This crate provides a simulated temperature sensor for driving the scope
//! without physical hardware. It includes:
//!
//! - **VirtualThermometer**: Produces link lines (`DATA`, `SETTING`, `ERR`)
//!   from a deterministic swing-plus-noise signal, with optional faults
//! - **run_thermometer_task**: Async actor that feeds a `MessageBuffer` on a
//!   timer until shut down
//!
//! # Example
//!
//! ```rust
//! use scope_sim::VirtualThermometer;
//!
//! let mut thermo = VirtualThermometer::new("attic");
//! thermo.advance();
//!
//! while let Some(line) = thermo.take_output() {
//!     println!("Thermometer output: {}", line);
//! }
//! ```

pub mod error;
pub mod thermometer;
pub mod thermometer_task;

pub use error::SimError;
pub use thermometer::{Fault, VirtualThermometer, VirtualThermometerConfig};
pub use thermometer_task::{run_thermometer_task, time_label, ThermometerCommand, ThermometerStateEvent};
