//! Display range and zoom control

use tracing::debug;

use crate::config::{ScopeConfig, ZoomLimits};

/// Vertical axis bounds for the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRange {
    /// Lower bound
    pub lower: i64,
    /// Upper bound
    pub upper: i64,
}

/// Direction of a zoom input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    /// Larger window, wider band
    In,
    /// Smaller window, tighter band
    Out,
}

impl ZoomDirection {
    /// Map a scroll delta to a direction
    ///
    /// Negative deltas zoom in, everything else (including zero) zooms out.
    pub fn from_delta(delta: f64) -> Self {
        if delta < 0.0 {
            ZoomDirection::In
        } else {
            ZoomDirection::Out
        }
    }
}

/// Holder of the window size and range half-width
#[derive(Debug, Clone)]
pub struct RangeController {
    limits: ZoomLimits,
    display_size: usize,
    boundary_shift: i64,
}

impl RangeController {
    /// Create from a validated configuration
    pub fn new(config: &ScopeConfig) -> Self {
        Self {
            limits: config.zoom,
            display_size: config.initial_display_size,
            boundary_shift: config.initial_boundary_shift,
        }
    }

    /// Current window size
    pub fn display_size(&self) -> usize {
        self.display_size
    }

    /// Current range half-width
    pub fn boundary_shift(&self) -> i64 {
        self.boundary_shift
    }

    /// Zoom limits in force
    pub fn limits(&self) -> &ZoomLimits {
        &self.limits
    }

    /// Range centred on `average`
    ///
    /// Bounds saturate at the `i64` limits for extreme averages.
    pub fn current_range(&self, average: i64) -> DisplayRange {
        DisplayRange {
            lower: average.saturating_sub(self.boundary_shift),
            upper: average.saturating_add(self.boundary_shift),
        }
    }

    /// Step both parameters in `direction`, clamping each independently
    ///
    /// Returns `true` if either parameter changed.
    pub fn zoom(&mut self, direction: ZoomDirection) -> bool {
        let before = (self.display_size, self.boundary_shift);
        let l = &self.limits;

        match direction {
            ZoomDirection::In => {
                self.display_size = (self.display_size + l.display_step).min(l.max_display);
                self.boundary_shift = (self.boundary_shift + 1).min(l.max_shift);
            }
            ZoomDirection::Out => {
                self.display_size = self
                    .display_size
                    .saturating_sub(l.display_step)
                    .max(l.min_display);
                self.boundary_shift = (self.boundary_shift - 1).max(l.min_shift);
            }
        }

        let changed = before != (self.display_size, self.boundary_shift);
        debug!(
            "Zoom {:?}: display {} -> {}, shift {} -> {}",
            direction, before.0, self.display_size, before.1, self.boundary_shift
        );
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(display: usize, shift: i64) -> RangeController {
        RangeController::new(&ScopeConfig {
            initial_display_size: display,
            initial_boundary_shift: shift,
            ..Default::default()
        })
    }

    #[test]
    fn test_range_is_symmetric() {
        let rc = controller(3, 5);
        assert_eq!(rc.current_range(16), DisplayRange { lower: 11, upper: 21 });
        assert_eq!(rc.current_range(-2), DisplayRange { lower: -7, upper: 3 });
    }

    #[test]
    fn test_range_saturates_at_extremes() {
        let rc = controller(3, 5);
        assert_eq!(
            rc.current_range(i64::MAX),
            DisplayRange { lower: i64::MAX - 5, upper: i64::MAX }
        );
        assert_eq!(
            rc.current_range(i64::MIN),
            DisplayRange { lower: i64::MIN, upper: i64::MIN + 5 }
        );
    }

    #[test]
    fn test_direction_from_delta() {
        assert_eq!(ZoomDirection::from_delta(-0.5), ZoomDirection::In);
        assert_eq!(ZoomDirection::from_delta(0.0), ZoomDirection::Out);
        assert_eq!(ZoomDirection::from_delta(3.0), ZoomDirection::Out);
    }

    #[test]
    fn test_zoom_in_steps_together() {
        let mut rc = controller(125, 12);
        assert!(rc.zoom(ZoomDirection::In));
        assert_eq!(rc.display_size(), 135);
        assert_eq!(rc.boundary_shift(), 13);
    }

    #[test]
    fn test_zoom_in_clamps_separately() {
        let mut rc = controller(245, 10);
        rc.zoom(ZoomDirection::In);
        assert_eq!(rc.display_size(), 250);
        assert_eq!(rc.boundary_shift(), 11);

        rc.zoom(ZoomDirection::In);
        assert_eq!(rc.display_size(), 250);
        assert_eq!(rc.boundary_shift(), 12);
    }

    #[test]
    fn test_zoom_out_clamps_at_minimum() {
        let mut rc = controller(15, 1);
        rc.zoom(ZoomDirection::Out);
        assert_eq!(rc.display_size(), 10);
        assert_eq!(rc.boundary_shift(), 1);
        assert!(!rc.zoom(ZoomDirection::Out));
    }

    #[test]
    fn test_repeated_zoom_converges() {
        let mut rc = controller(125, 12);
        for _ in 0..100 {
            rc.zoom(ZoomDirection::In);
        }
        assert_eq!((rc.display_size(), rc.boundary_shift()), (250, 25));

        for _ in 0..100 {
            rc.zoom(ZoomDirection::Out);
        }
        assert_eq!((rc.display_size(), rc.boundary_shift()), (10, 1));
    }
}
