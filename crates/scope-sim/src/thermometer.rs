//! Virtual thermometer simulation
//!
//! Provides a simulated sensor that produces link-formatted output lines
//! (`DATA:<value>`, `SETTING:rate:<ms>`, `ERR:<text>`) as it is advanced.

use std::collections::VecDeque;
use std::f64::consts::PI;

use scope_link::{MessageKind, RawMessage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SimError;

/// Kinds of bad traffic the thermometer can emit instead of a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `DATA:` with nothing after the separator
    EmptyPayload,
    /// An `ERR:` report from the device
    DeviceError,
    /// A line with no recognizable kind prefix
    Garbled,
}

impl Fault {
    const ALL: [Fault; 3] = [Fault::EmptyPayload, Fault::DeviceError, Fault::Garbled];
}

/// A simulated thermometer that generates link lines
#[derive(Debug)]
pub struct VirtualThermometer {
    /// Unique identifier for this thermometer
    id: String,
    config: VirtualThermometerConfig,
    /// Number of readings taken so far
    step: u64,
    /// Number of faults emitted instead of readings
    faults: u64,
    /// Most recent good reading
    last_reading: Option<f64>,
    /// Pending output lines, oldest first
    pending_output: VecDeque<String>,
}

/// Configuration for creating a virtual thermometer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualThermometerConfig {
    /// Display name/identifier
    pub id: String,
    /// Temperature around which readings oscillate (°C)
    pub base_celsius: f64,
    /// Peak deviation of the slow swing (°C)
    pub swing_celsius: f64,
    /// Length of one full swing, in readings
    pub swing_period: u32,
    /// Peak deviation of the noise floor (°C)
    pub noise_celsius: f64,
    /// Time between readings
    pub sample_interval_ms: u64,
    /// Report the sample rate every this many readings (0 disables)
    pub setting_every: u32,
    /// Probability in `[0, 1]` that a reading is replaced by a fault
    pub fault_rate: f64,
}

impl Default for VirtualThermometerConfig {
    fn default() -> Self {
        Self {
            id: "Virtual Thermometer".to_string(),
            base_celsius: 21.0,
            swing_celsius: 4.0,
            swing_period: 240,
            noise_celsius: 0.4,
            sample_interval_ms: 100,
            setting_every: 50,
            fault_rate: 0.0,
        }
    }
}

impl VirtualThermometerConfig {
    /// Check the config for values the thermometer cannot run with
    pub fn validate(&self) -> Result<(), SimError> {
        if self.sample_interval_ms == 0 {
            return Err(SimError::InvalidConfig(
                "sample_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.swing_period == 0 {
            return Err(SimError::InvalidConfig(
                "swing_period must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.fault_rate) {
            return Err(SimError::InvalidConfig(format!(
                "fault_rate {} is outside [0, 1]",
                self.fault_rate
            )));
        }
        let amplitudes = [self.base_celsius, self.swing_celsius, self.noise_celsius];
        if amplitudes.iter().any(|v| !v.is_finite()) {
            return Err(SimError::InvalidConfig(
                "temperatures must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl VirtualThermometer {
    /// Create a virtual thermometer with default settings
    pub fn new(id: impl Into<String>) -> Self {
        let config = VirtualThermometerConfig {
            id: id.into(),
            ..Default::default()
        };
        Self::build(config)
    }

    /// Create a virtual thermometer from configuration
    pub fn from_config(config: VirtualThermometerConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: VirtualThermometerConfig) -> Self {
        Self {
            id: config.id.clone(),
            config,
            step: 0,
            faults: 0,
            last_reading: None,
            pending_output: VecDeque::new(),
        }
    }

    /// Get the thermometer's identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &VirtualThermometerConfig {
        &self.config
    }

    /// Readings taken so far, including ones replaced by faults
    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn faults(&self) -> u64 {
        self.faults
    }

    pub fn last_reading(&self) -> Option<f64> {
        self.last_reading
    }

    pub fn sample_interval_ms(&self) -> u64 {
        self.config.sample_interval_ms
    }

    /// Change the sample rate and announce it on the link
    pub fn set_sample_interval(&mut self, ms: u64) -> Result<(), SimError> {
        if ms == 0 {
            return Err(SimError::InvalidConfig(
                "sample_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.config.sample_interval_ms != ms {
            self.config.sample_interval_ms = ms;
            self.queue_setting();
        }
        Ok(())
    }

    /// Change how often readings are replaced by faults
    pub fn set_fault_rate(&mut self, rate: f64) -> Result<(), SimError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(SimError::InvalidConfig(format!(
                "fault_rate {} is outside [0, 1]",
                rate
            )));
        }
        self.config.fault_rate = rate;
        Ok(())
    }

    /// Queue a `DATA` line whose payload is not a number
    pub fn inject_malformed(&mut self) {
        self.faults += 1;
        self.queue(RawMessage::data("--.-", ""));
    }

    /// Temperature at reading `step`, before any fault is applied
    ///
    /// Deterministic: the same config and step always give the same value.
    pub fn reading_at(&self, step: u64) -> f64 {
        let c = &self.config;
        let phase = 2.0 * PI * (step % c.swing_period as u64) as f64 / c.swing_period as f64;
        let swing = c.swing_celsius * phase.sin();
        let noise = (unit_hash(step, 1) - 0.5) * 2.0 * c.noise_celsius;
        round_centi(c.base_celsius + swing + noise)
    }

    /// Take one reading and queue the resulting link lines
    ///
    /// The first reading, and every `setting_every`th after it, is preceded
    /// by a rate report.
    pub fn advance(&mut self) {
        let step = self.step;
        self.step += 1;

        let every = self.config.setting_every as u64;
        if every > 0 && step % every == 0 {
            self.queue_setting();
        }

        if unit_hash(step, 2) < self.config.fault_rate {
            let fault = Fault::ALL[(unit_hash(step, 3) * Fault::ALL.len() as f64) as usize % Fault::ALL.len()];
            self.emit_fault(fault);
            return;
        }

        let value = self.reading_at(step);
        self.last_reading = Some(value);
        self.queue(RawMessage::data(format!("{:.2}", value), ""));
    }

    /// Queue a specific fault
    pub fn emit_fault(&mut self, fault: Fault) {
        self.faults += 1;
        debug!("Virtual thermometer {} emitting {:?}", self.id, fault);
        match fault {
            Fault::EmptyPayload => self.queue(RawMessage::data("", "")),
            Fault::DeviceError => self.queue(RawMessage::err("sensor not responding", "")),
            Fault::Garbled => self.pending_output.push_back("#~\u{fffd}7.1".to_string()),
        }
    }

    /// Take the oldest pending output line
    pub fn take_output(&mut self) -> Option<String> {
        self.pending_output.pop_front()
    }

    pub fn has_output(&self) -> bool {
        !self.pending_output.is_empty()
    }

    fn queue_setting(&mut self) {
        let payload = format!("rate:{}", self.config.sample_interval_ms);
        self.queue(RawMessage::new(MessageKind::Setting, payload, ""));
    }

    fn queue(&mut self, message: RawMessage) {
        self.pending_output.push_back(message.encode_line());
    }
}

/// Deterministic value in `[0, 1)` for `(step, salt)`
fn unit_hash(step: u64, salt: u64) -> f64 {
    let x = step as f64 * 12.9898 + salt as f64 * 78.233;
    (x.sin() * 43_758.545_3).fract().abs()
}

fn round_centi(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use scope_link::decode_line;

    fn quiet() -> VirtualThermometerConfig {
        VirtualThermometerConfig {
            noise_celsius: 0.0,
            setting_every: 0,
            ..Default::default()
        }
    }

    fn drain(thermo: &mut VirtualThermometer) -> Vec<RawMessage> {
        std::iter::from_fn(|| thermo.take_output())
            .map(|line| decode_line(&line, "t"))
            .collect()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(VirtualThermometerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_config() {
        let bad = [
            VirtualThermometerConfig { sample_interval_ms: 0, ..Default::default() },
            VirtualThermometerConfig { swing_period: 0, ..Default::default() },
            VirtualThermometerConfig { fault_rate: 1.5, ..Default::default() },
            VirtualThermometerConfig { base_celsius: f64::NAN, ..Default::default() },
        ];
        for config in bad {
            assert!(matches!(
                VirtualThermometer::from_config(config),
                Err(SimError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_reading_follows_swing() {
        let thermo = VirtualThermometer::from_config(quiet()).unwrap();
        assert_eq!(thermo.reading_at(0), 21.0);
        assert_eq!(thermo.reading_at(60), 25.0);
        assert_eq!(thermo.reading_at(180), 17.0);
        assert_eq!(thermo.reading_at(240), 21.0);
    }

    #[test]
    fn test_noise_is_bounded_and_repeatable() {
        let config = VirtualThermometerConfig {
            swing_celsius: 0.0,
            noise_celsius: 0.5,
            ..Default::default()
        };
        let a = VirtualThermometer::from_config(config.clone()).unwrap();
        let b = VirtualThermometer::from_config(config).unwrap();
        for step in 0..500 {
            let v = a.reading_at(step);
            assert!((20.5..=21.5).contains(&v), "step {} gave {}", step, v);
            assert_eq!(v, b.reading_at(step));
        }
    }

    #[test]
    fn test_advance_emits_data_lines() {
        let mut thermo = VirtualThermometer::from_config(quiet()).unwrap();
        thermo.advance();
        thermo.advance();

        let messages = drain(&mut thermo);
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.kind == MessageKind::Data));
        assert_eq!(messages[0].payload, "21.00");
        assert_eq!(thermo.steps(), 2);
        assert!(thermo.last_reading().is_some());
    }

    #[test]
    fn test_rate_reported_periodically() {
        let config = VirtualThermometerConfig {
            setting_every: 3,
            sample_interval_ms: 250,
            ..quiet()
        };
        let mut thermo = VirtualThermometer::from_config(config).unwrap();
        for _ in 0..7 {
            thermo.advance();
        }

        let settings: Vec<_> = drain(&mut thermo)
            .into_iter()
            .filter(|m| m.kind == MessageKind::Setting)
            .collect();
        // steps 0, 3 and 6
        assert_eq!(settings.len(), 3);
        assert!(settings.iter().all(|m| m.payload == "rate:250"));
    }

    #[test]
    fn test_set_sample_interval_announces_change() {
        let mut thermo = VirtualThermometer::from_config(quiet()).unwrap();
        thermo.set_sample_interval(500).unwrap();
        thermo.set_sample_interval(500).unwrap();

        let messages = drain(&mut thermo);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].kind, MessageKind::Setting);
        assert_eq!(messages[0].payload, "rate:500");
        assert!(thermo.set_sample_interval(0).is_err());
    }

    #[test]
    fn test_full_fault_rate_replaces_every_reading() {
        let config = VirtualThermometerConfig {
            fault_rate: 1.0,
            ..quiet()
        };
        let mut thermo = VirtualThermometer::from_config(config).unwrap();
        for _ in 0..30 {
            thermo.advance();
        }

        assert_eq!(thermo.faults(), 30);
        assert_eq!(thermo.last_reading(), None);
        for m in drain(&mut thermo) {
            assert!(
                m.kind == MessageKind::Error || m.payload.is_empty(),
                "fault produced a usable reading: {:?}",
                m
            );
        }
    }

    #[test]
    fn test_fault_lines_decode_as_dropped_traffic() {
        let mut thermo = VirtualThermometer::new("probe");
        thermo.emit_fault(Fault::EmptyPayload);
        thermo.emit_fault(Fault::DeviceError);
        thermo.emit_fault(Fault::Garbled);

        let messages = drain(&mut thermo);
        assert_eq!(messages[0].kind, MessageKind::Data);
        assert_eq!(messages[0].payload, "");
        assert_eq!(messages[1].kind, MessageKind::Error);
        assert_eq!(messages[2].kind, MessageKind::Error);
    }

    #[test]
    fn test_inject_malformed() {
        let mut thermo = VirtualThermometer::new("probe");
        thermo.inject_malformed();

        let messages = drain(&mut thermo);
        assert_eq!(messages[0].kind, MessageKind::Data);
        assert!(messages[0].payload.parse::<f64>().is_err());
    }

    #[test]
    fn test_config_serde_fills_defaults() {
        let config: VirtualThermometerConfig =
            serde_json::from_str(r#"{"id": "attic", "fault_rate": 0.1}"#).unwrap();
        assert_eq!(config.id, "attic");
        assert_eq!(config.fault_rate, 0.1);
        assert_eq!(config.sample_interval_ms, 100);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn readings_stay_within_swing_and_noise(
                base in -20.0f64..60.0,
                swing in 0.0f64..10.0,
                noise in 0.0f64..2.0,
                step in 0u64..100_000
            ) {
                let config = VirtualThermometerConfig {
                    base_celsius: base,
                    swing_celsius: swing,
                    noise_celsius: noise,
                    ..Default::default()
                };
                let thermo = VirtualThermometer::from_config(config).unwrap();
                let v = thermo.reading_at(step);
                prop_assert!((v - base).abs() <= swing + noise + 0.01);
            }
        }
    }
}
