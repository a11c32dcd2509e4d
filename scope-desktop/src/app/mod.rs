//! Main application state and UI
//!
//! This module contains the core `ScopeApp` struct and is organized into submodules:
//! - `session`: Pipeline and background task lifecycle
//! - `status`: Status messaging and settings save helpers
//! - `ui_panels`: UI panel drawing methods

mod session;
mod status;
mod ui_panels;

use std::time::{Duration, Instant};

use eframe::CreationContext;
use scope_core::RunState;

use crate::chart::ChartPanel;
use crate::settings::Settings;

use session::Session;

/// Main application state
pub struct ScopeApp {
    /// Settings
    pub(super) settings: Settings,
    /// Current pipeline, if one has been launched
    pub(super) session: Option<Session>,
    /// Chart surface the refresh loop renders into
    pub(super) chart: ChartPanel,
    /// Status message
    pub(super) status_message: Option<(String, Instant)>,
    /// Show settings panel
    pub(super) show_settings: bool,
    /// When the refresh loop was last ticked
    pub(super) last_tick: Instant,
    /// Tokio runtime handle for spawning async tasks
    pub(super) rt_handle: tokio::runtime::Handle,
    /// Tokio runtime (must be kept alive for async tasks)
    _runtime: Option<tokio::runtime::Runtime>,
}

impl ScopeApp {
    /// Create a new application
    pub fn new(_cc: &CreationContext<'_>, runtime: tokio::runtime::Runtime) -> Self {
        let rt_handle = runtime.handle().clone();
        let settings = Settings::load();

        let mut app = Self {
            chart: ChartPanel::new(settings.scope.title.clone()),
            session: None,
            status_message: None,
            show_settings: false,
            last_tick: Instant::now(),
            rt_handle,
            settings,
            _runtime: Some(runtime),
        };

        if app.settings.auto_start {
            app.start();
        }

        app
    }

    /// Start (or resume) streaming, launching a session if needed
    pub(super) fn start(&mut self) {
        if self.session.is_none() {
            match Session::launch(&self.rt_handle, &self.settings) {
                Ok(session) => {
                    self.chart.clear(self.settings.scope.title.clone());
                    self.session = Some(session);
                }
                Err(e) => {
                    self.report_err("Session", e.to_string());
                    return;
                }
            }
        }

        if let Some(session) = &mut self.session {
            if session.refresh.start() {
                self.last_tick = Instant::now();
                self.set_status("Streaming".to_string());
            }
        }
    }

    /// Request a stop; it takes effect on the next tick
    pub(super) fn stop(&mut self) {
        if let Some(session) = &self.session {
            session.refresh.stop();
            self.set_status("Stopping".to_string());
        }
    }

    /// Tear down the current session; the next start builds a fresh one
    pub(super) fn reset(&mut self) {
        if let Some(session) = self.session.take() {
            session.shutdown();
        }
        self.chart.clear(self.settings.scope.title.clone());
        self.set_status("Reset".to_string());
    }

    pub(super) fn run_state(&self) -> RunState {
        self.session
            .as_ref()
            .map(|s| s.refresh.state())
            .unwrap_or_default()
    }

    /// Tick the refresh loop if the tick interval has elapsed
    fn maybe_tick(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };
        if session.refresh.state() != RunState::Running {
            return;
        }
        if self.last_tick.elapsed() < self.settings.tick_interval() {
            return;
        }
        self.last_tick = Instant::now();

        let outcome = session.refresh.tick(&mut self.chart);
        if outcome.stopped {
            self.set_status("Stopped".to_string());
        }
    }

    /// Route scroll input over the chart to zoom
    fn handle_zoom(&mut self, hovered: bool, scroll_y: f32) {
        if !hovered || scroll_y == 0.0 {
            return;
        }
        if let Some(session) = &mut self.session {
            session.refresh.zoom(scroll_y as f64, &mut self.chart);
        }
    }
}

impl eframe::App for ScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(session) = &mut self.session {
            session.process_thermometer_events();
        }
        self.maybe_tick();

        // Clear old status messages
        if let Some((_, when)) = &self.status_message {
            if when.elapsed().as_secs() > 5 {
                self.status_message = None;
            }
        }

        // Top panel - toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        // Bottom panel - pipeline status
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.draw_status_bar(ui);
        });

        // Settings panel (side panel)
        if self.show_settings {
            egui::SidePanel::right("settings")
                .default_width(320.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        ui.heading("Settings");
                        ui.separator();
                        self.draw_settings_panel(ui);

                        ui.add_space(16.0);
                        ui.separator();
                        if ui.button("Close").clicked() {
                            self.show_settings = false;
                        }
                    });
                });
        }

        // Central panel - chart
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = self.chart.ui(ui);
            let scroll_y = ui.input(|i| i.raw_scroll_delta.y);
            self.handle_zoom(response.hovered(), scroll_y);
        });

        // Keep ticking while streaming
        if self.run_state() == RunState::Running {
            ctx.request_repaint_after(self.settings.tick_interval().min(Duration::from_millis(50)));
        }
    }
}

impl Drop for ScopeApp {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.shutdown();
        }
    }
}
