//! Rendering surface boundary
//!
//! The refresh loop pushes its results to a [`RenderSurface`] whenever they
//! change. [`ChartFrame`] is a surface that simply keeps the latest output,
//! for UIs that redraw from retained state and for tests.

use crate::range::DisplayRange;
use crate::sample::Sample;

/// Receiver of chart updates
pub trait RenderSurface {
    /// Replace the plotted series with `samples`, oldest first
    fn render_series(&mut self, samples: &[Sample]);

    /// Set the vertical axis bounds
    fn render_range(&mut self, range: DisplayRange);

    /// Set the chart title
    fn render_title(&mut self, title: &str);
}

/// Retained copy of the most recent chart output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartFrame {
    /// `(timestamp_label, value)` points, oldest first
    pub series: Vec<(String, f64)>,
    /// Axis bounds, once data has arrived
    pub range: Option<DisplayRange>,
    /// Chart title, once set
    pub title: Option<String>,
    /// Number of series updates received
    pub series_updates: u64,
}

impl ChartFrame {
    /// Create an empty frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Values of the plotted series
    pub fn values(&self) -> Vec<f64> {
        self.series.iter().map(|(_, v)| *v).collect()
    }
}

impl RenderSurface for ChartFrame {
    fn render_series(&mut self, samples: &[Sample]) {
        self.series.clear();
        self.series.extend(
            samples
                .iter()
                .map(|s| (s.timestamp_label().to_string(), s.value())),
        );
        self.series_updates += 1;
    }

    fn render_range(&mut self, range: DisplayRange) {
        self.range = Some(range);
    }

    fn render_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }
}
