//! Scope configuration

use serde::{Deserialize, Serialize};

use crate::error::ScopeError;

/// Default chart title
pub const DEFAULT_TITLE: &str = "Temperature Samples";

/// Bounds and step sizes for the zoom control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomLimits {
    /// Smallest window size
    pub min_display: usize,
    /// Largest window size
    pub max_display: usize,
    /// Window size change per zoom step
    pub display_step: usize,
    /// Narrowest half-width of the display range
    pub min_shift: i64,
    /// Widest half-width of the display range
    pub max_shift: i64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_display: 10,
            max_display: 250,
            display_step: 10,
            min_shift: 1,
            max_shift: 25,
        }
    }
}

/// Scope pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// Zoom bounds
    #[serde(default)]
    pub zoom: ZoomLimits,
    /// Window size on startup
    pub initial_display_size: usize,
    /// Range half-width on startup
    pub initial_boundary_shift: i64,
    /// Base chart title
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl Default for ScopeConfig {
    fn default() -> Self {
        let zoom = ZoomLimits::default();
        Self {
            initial_display_size: zoom.max_display / 2,
            initial_boundary_shift: zoom.max_shift / 2,
            zoom,
            title: default_title(),
        }
    }
}

impl ScopeConfig {
    /// Check that bounds are ordered and initial values lie within them
    pub fn validate(&self) -> Result<(), ScopeError> {
        let z = &self.zoom;

        if z.min_display == 0 {
            return Err(ScopeError::InvalidConfig(
                "minimum display size must be at least 1".into(),
            ));
        }
        if z.min_display > z.max_display {
            return Err(ScopeError::InvalidConfig(format!(
                "display bounds inverted: {} > {}",
                z.min_display, z.max_display
            )));
        }
        if z.display_step == 0 {
            return Err(ScopeError::InvalidConfig("display step must be non-zero".into()));
        }
        if z.min_shift < 0 || z.min_shift > z.max_shift {
            return Err(ScopeError::InvalidConfig(format!(
                "boundary shift bounds invalid: {}..={}",
                z.min_shift, z.max_shift
            )));
        }
        if !(z.min_display..=z.max_display).contains(&self.initial_display_size) {
            return Err(ScopeError::InvalidConfig(format!(
                "initial display size {} outside {}..={}",
                self.initial_display_size, z.min_display, z.max_display
            )));
        }
        if !(z.min_shift..=z.max_shift).contains(&self.initial_boundary_shift) {
            return Err(ScopeError::InvalidConfig(format!(
                "initial boundary shift {} outside {}..={}",
                self.initial_boundary_shift, z.min_shift, z.max_shift
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScopeConfig::default();
        assert_eq!(config.initial_display_size, 125);
        assert_eq!(config.initial_boundary_shift, 12);
        assert_eq!(config.title, "Temperature Samples");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_display_bounds_rejected() {
        let mut config = ScopeConfig::default();
        config.zoom.min_display = 300;
        assert!(matches!(config.validate(), Err(ScopeError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_step_rejected() {
        let mut config = ScopeConfig::default();
        config.zoom.display_step = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_initial_out_of_bounds_rejected() {
        let config = ScopeConfig {
            initial_boundary_shift: 40,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ScopeConfig {
            initial_display_size: 5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_fills_missing_fields() {
        let json = r#"{ "initial_display_size": 40, "initial_boundary_shift": 4 }"#;
        let config: ScopeConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.zoom, ZoomLimits::default());
        assert_eq!(config.title, DEFAULT_TITLE);
        assert_eq!(config.initial_display_size, 40);
        assert!(config.validate().is_ok());
    }
}
