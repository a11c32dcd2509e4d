//! Application settings

use std::path::PathBuf;
use std::time::Duration;

use egui::Ui;
use scope_core::ScopeConfig;
use scope_sim::VirtualThermometerConfig;
use serde::{Deserialize, Serialize};

use crate::error::DesktopError;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Chart window and zoom configuration
    #[serde(default)]
    pub scope: ScopeConfig,
    /// Simulated sensor feeding the chart
    #[serde(default)]
    pub thermometer: VirtualThermometerConfig,
    /// Time between chart refresh ticks in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Time between ingestion batches in milliseconds
    #[serde(default = "default_ingest_poll_ms")]
    pub ingest_poll_ms: u64,
    /// Start streaming as soon as the window opens
    #[serde(default)]
    pub auto_start: bool,
}

fn default_tick_ms() -> u64 {
    100
}

fn default_ingest_poll_ms() -> u64 {
    20
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scope: ScopeConfig::default(),
            thermometer: VirtualThermometerConfig::default(),
            tick_ms: default_tick_ms(),
            ingest_poll_ms: default_ingest_poll_ms(),
            auto_start: false,
        }
    }
}

impl Settings {
    /// Get the XDG config directory for thermoscope
    /// Uses $XDG_CONFIG_HOME/thermoscope on Linux/macOS, falls back to ~/.config/thermoscope
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("thermoscope"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("thermoscope"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from disk
    ///
    /// Missing, unreadable or invalid files give the defaults.
    pub fn load() -> Self {
        let settings: Self = Self::settings_path()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                tracing::warn!("Ignoring saved settings: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<(), DesktopError> {
        let path = Self::settings_path()
            .ok_or_else(|| DesktopError::Settings("Could not determine settings path".to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DesktopError::Settings(format!("Failed to create settings directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DesktopError::Settings(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(&path, json)
            .map_err(|e| DesktopError::Settings(format!("Failed to write settings: {}", e)))?;

        Ok(())
    }

    /// Check every nested config
    pub fn validate(&self) -> Result<(), DesktopError> {
        self.scope.validate()?;
        self.thermometer.validate()?;
        if self.tick_ms == 0 || self.ingest_poll_ms == 0 {
            return Err(DesktopError::Settings(
                "tick and poll intervals must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn ingest_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ingest_poll_ms)
    }

    /// Check if settings have changed and auto-save if so
    fn auto_save_if_changed(&self, previous: &Settings) -> Option<DesktopError> {
        if self != previous {
            if let Err(e) = self.save() {
                return Some(e);
            }
        }
        None
    }

    /// Draw settings UI (auto-saves on change)
    /// Returns an error if save failed
    pub fn draw(&mut self, ui: &mut Ui) -> Option<DesktopError> {
        let previous = self.clone();

        ui.label(
            egui::RichText::new("Window and zoom changes apply on the next reset")
                .small()
                .color(egui::Color32::GRAY),
        );
        ui.add_space(8.0);

        egui::Grid::new("settings_grid")
            .num_columns(2)
            .spacing([10.0, 8.0])
            .show(ui, |ui| {
                let zoom = &mut self.scope.zoom;

                ui.label("Chart title:");
                ui.text_edit_singleline(&mut self.scope.title);
                ui.end_row();

                ui.label("Min points:");
                ui.add(egui::DragValue::new(&mut zoom.min_display).range(1..=zoom.max_display));
                ui.end_row();

                ui.label("Max points:");
                ui.add(egui::DragValue::new(&mut zoom.max_display).range(zoom.min_display..=10_000));
                ui.end_row();

                ui.label("Zoom step (points):");
                ui.add(egui::DragValue::new(&mut zoom.display_step).range(1..=1000));
                ui.end_row();

                ui.label("Min band (°C):");
                ui.add(egui::DragValue::new(&mut zoom.min_shift).range(0..=zoom.max_shift));
                ui.end_row();

                ui.label("Max band (°C):");
                ui.add(egui::DragValue::new(&mut zoom.max_shift).range(zoom.min_shift..=1000));
                ui.end_row();

                let (min_display, max_display) = (zoom.min_display, zoom.max_display);
                let (min_shift, max_shift) = (zoom.min_shift, zoom.max_shift);

                ui.label("Initial points:");
                ui.add(
                    egui::DragValue::new(&mut self.scope.initial_display_size)
                        .range(min_display..=max_display),
                );
                ui.end_row();

                ui.label("Initial band (°C):");
                ui.add(
                    egui::DragValue::new(&mut self.scope.initial_boundary_shift)
                        .range(min_shift..=max_shift),
                );
                ui.end_row();

                ui.label("Refresh tick (ms):");
                ui.add(egui::DragValue::new(&mut self.tick_ms).range(10..=5000));
                ui.end_row();

                ui.label("Ingest poll (ms):");
                ui.add(egui::DragValue::new(&mut self.ingest_poll_ms).range(1..=1000));
                ui.end_row();

                ui.label("Start on launch:");
                ui.checkbox(&mut self.auto_start, "");
                ui.end_row();
            });

        ui.add_space(16.0);
        ui.heading("Virtual Thermometer");

        egui::Grid::new("thermometer_grid")
            .num_columns(2)
            .spacing([10.0, 8.0])
            .show(ui, |ui| {
                let t = &mut self.thermometer;

                ui.label("Name:");
                ui.text_edit_singleline(&mut t.id);
                ui.end_row();

                ui.label("Base (°C):");
                ui.add(egui::DragValue::new(&mut t.base_celsius).speed(0.1).range(-50.0..=150.0));
                ui.end_row();

                ui.label("Swing (°C):");
                ui.add(egui::DragValue::new(&mut t.swing_celsius).speed(0.1).range(0.0..=50.0));
                ui.end_row();

                ui.label("Swing period (samples):");
                ui.add(egui::DragValue::new(&mut t.swing_period).range(1..=100_000));
                ui.end_row();

                ui.label("Noise (°C):");
                ui.add(egui::DragValue::new(&mut t.noise_celsius).speed(0.05).range(0.0..=10.0));
                ui.end_row();

                ui.label("Sample interval (ms):");
                ui.add(egui::DragValue::new(&mut t.sample_interval_ms).range(1..=10_000));
                ui.end_row();

                ui.label("Rate report every:");
                ui.add(egui::DragValue::new(&mut t.setting_every).range(0..=10_000));
                ui.end_row();

                ui.label("Fault rate:");
                ui.add(egui::Slider::new(&mut t.fault_rate, 0.0..=1.0));
                ui.end_row();
            });

        ui.add_space(16.0);

        // Show config file location
        if let Some(path) = Self::settings_path() {
            ui.label(
                egui::RichText::new(format!("Config: {}", path.display()))
                    .small()
                    .color(egui::Color32::GRAY),
            );
        }

        // Auto-save when settings change
        self.auto_save_if_changed(&previous)
    }
}
