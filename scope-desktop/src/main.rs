//! Thermoscope Desktop Application
//!
//! A live chart of temperature samples streamed from a device link, with a
//! rolling window, average-centered vertical range and scroll-wheel zoom.

mod app;
mod chart;
mod error;
mod settings;

use app::ScopeApp;
use eframe::NativeOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Include all our crates in the default filter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "thermoscope=info,scope_link=info,scope_core=info,scope_sim=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Thermoscope");

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 640.0])
            .with_min_inner_size([640.0, 400.0])
            .with_title("Thermoscope"),
        ..Default::default()
    };

    eframe::run_native(
        "Thermoscope",
        options,
        Box::new(|cc| {
            let runtime = tokio::runtime::Runtime::new()?;
            Ok(Box::new(ScopeApp::new(cc, runtime)))
        }),
    )
}
