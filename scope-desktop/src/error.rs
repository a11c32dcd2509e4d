//! Desktop application errors

use scope_core::ScopeError;
use scope_sim::SimError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DesktopError {
    #[error("Pipeline error: {0}")]
    Scope(#[from] ScopeError),

    #[error("Simulator error: {0}")]
    Sim(#[from] SimError),

    #[error("Settings error: {0}")]
    Settings(String),
}
