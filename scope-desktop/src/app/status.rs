//! Status messaging and save helpers

use std::time::Instant;

use scope_core::IngestStatus;
use scope_sim::ThermometerCommand;

use crate::error::DesktopError;
use crate::settings::Settings;

use super::ScopeApp;

impl ScopeApp {
    /// Set a status message (also logs as Info via tracing)
    pub(super) fn set_status(&mut self, msg: String) {
        self.status_message = Some((msg.clone(), Instant::now()));
        tracing::info!(source = "Status", "{}", msg);
    }

    /// Report a warning via tracing (shows in console and status bar)
    pub(super) fn report_warning(&mut self, source: &str, message: impl Into<String>) {
        let message = message.into();
        self.status_message = Some((format!("{}: {}", source, message), Instant::now()));
        tracing::warn!(source = source, "{}", message);
    }

    /// Report an error via tracing (shows in console and status bar)
    pub(super) fn report_err(&mut self, source: &str, message: impl Into<String>) {
        let message = message.into();
        self.status_message = Some((format!("{}: {}", source, message), Instant::now()));
        tracing::error!(source = source, "{}", message);
    }

    /// Handle a settings save error
    pub(super) fn handle_save_error(&mut self, error: DesktopError) {
        self.report_err("Settings", error.to_string());
    }

    /// Push thermometer settings that can change without a reset
    pub(super) fn apply_live_settings(&mut self, previous: &Settings) {
        let Some(session) = &self.session else {
            return;
        };
        let (old, new) = (&previous.thermometer, &self.settings.thermometer);

        if old.sample_interval_ms != new.sample_interval_ms {
            session.send_thermometer(ThermometerCommand::SetSampleInterval(new.sample_interval_ms));
        }
        if old.fault_rate != new.fault_rate {
            session.send_thermometer(ThermometerCommand::SetFaultRate(new.fault_rate));
        }
    }

    /// One-line ingestion summary, and whether it reports a failure
    pub(super) fn ingest_summary(&self) -> Option<(String, bool)> {
        let session = self.session.as_ref()?;
        let status = session.ingest_status();
        let failed = matches!(status, IngestStatus::Failed { .. });
        Some((status.label(), failed))
    }
}
