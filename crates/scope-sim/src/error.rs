//! Simulator errors

use scope_link::LinkError;
use thiserror::Error;

/// Errors raised by the virtual thermometer
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid thermometer config: {0}")]
    InvalidConfig(String),

    #[error("Link error: {0}")]
    Link(#[from] LinkError),
}
