//! UI panel drawing methods

use egui::{Color32, RichText, Ui};
use scope_core::RunState;
use scope_sim::ThermometerCommand;

use super::ScopeApp;

impl ScopeApp {
    /// Draw the toolbar
    pub(super) fn draw_toolbar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("Thermoscope");
            ui.separator();

            let state = self.run_state();

            if ui
                .add_enabled(state != RunState::Running, egui::Button::new("▶ Start"))
                .clicked()
            {
                self.start();
            }
            if ui
                .add_enabled(state == RunState::Running, egui::Button::new("■ Stop"))
                .clicked()
            {
                self.stop();
            }
            if ui
                .add_enabled(self.session.is_some(), egui::Button::new("⟲ Reset"))
                .clicked()
            {
                self.reset();
            }

            ui.separator();
            self.draw_fault_menu(ui);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .selectable_label(self.show_settings, "⚙ Settings")
                    .clicked()
                {
                    self.show_settings = !self.show_settings;
                }
            });
        });
    }

    fn draw_fault_menu(&mut self, ui: &mut Ui) {
        ui.add_enabled_ui(self.session.is_some(), |ui| {
            ui.menu_button("Faults", |ui| {
                if ui.button("Send malformed reading").clicked() {
                    if let Some(session) = &self.session {
                        session.send_thermometer(ThermometerCommand::InjectMalformed);
                    }
                    self.report_warning("Faults", "Injected malformed reading");
                    ui.close();
                }
                if ui.button("Break link").clicked() {
                    if let Some(session) = &self.session {
                        session.buffer.set_read_fault("link fault injected from UI");
                    }
                    self.report_warning("Faults", "Link reads now fail");
                    ui.close();
                }
            });
        });
    }

    /// Draw the status bar
    pub(super) fn draw_status_bar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            let state = self.run_state();
            let (label, color) = match state {
                RunState::Idle => ("Idle", Color32::GRAY),
                RunState::Running => ("Running", Color32::from_rgb(39, 174, 96)),
                RunState::Stopped => ("Stopped", Color32::from_rgb(230, 126, 34)),
            };
            ui.label(RichText::new(label).color(color).strong());

            if let Some(session) = &self.session {
                let snapshot = session.refresh.snapshot();
                ui.separator();
                ui.label(format!(
                    "{}/{} points",
                    snapshot.samples.len(),
                    snapshot.display_size
                ));
                ui.separator();
                match snapshot.average {
                    Some(avg) => ui.label(format!("avg {} ±{}", avg, snapshot.boundary_shift)),
                    None => ui.label(format!("±{}", snapshot.boundary_shift)),
                };
                ui.separator();
                ui.label(format!("{} queued", session.refresh.pending()));

                if let Some(t) = &session.thermometer {
                    ui.separator();
                    let reading = t
                        .last_reading
                        .map(|v| format!("{:.2} °C", v))
                        .unwrap_or_else(|| "--".to_string());
                    ui.label(format!("{} ({} faults)", reading, t.faults));
                }
            }

            if let Some((summary, failed)) = self.ingest_summary() {
                ui.separator();
                if failed {
                    ui.colored_label(Color32::from_rgb(231, 76, 60), summary);
                } else {
                    ui.label(summary);
                }
            }

            if let Some((msg, _)) = &self.status_message {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(RichText::new(msg).color(Color32::GRAY));
                });
            }
        });
    }

    /// Draw the settings panel contents (auto-saves on change)
    pub(super) fn draw_settings_panel(&mut self, ui: &mut Ui) {
        let previous = self.settings.clone();
        if let Some(error) = self.settings.draw(ui) {
            self.handle_save_error(error);
        }
        if self.settings != previous {
            self.apply_live_settings(&previous);
        }
    }
}
