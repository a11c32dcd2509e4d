//! Line chart panel
//!
//! `ChartPanel` is the desktop [`RenderSurface`]: the refresh loop pushes
//! series, range and title into it, and `ui` paints whatever it last received.

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke};
use scope_core::{DisplayRange, RenderSurface, Sample};

const BG: Color32 = Color32::from_rgb(16, 18, 24);
const GRID: Color32 = Color32::from_rgb(38, 42, 54);
const AXIS_TEXT: Color32 = Color32::from_rgb(130, 136, 150);
const LINE: Color32 = Color32::from_rgb(231, 111, 81);
const AVERAGE: Color32 = Color32::from_rgb(42, 157, 143);

/// Horizontal grid lines to aim for
const TARGET_GRID_LINES: i64 = 6;

/// Chart state as last rendered by the refresh loop
#[derive(Debug, Default)]
pub struct ChartPanel {
    /// `(timestamp_label, value)` points, oldest first
    points: Vec<(String, f64)>,
    range: Option<DisplayRange>,
    title: String,
}

impl ChartPanel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Forget the plotted data and reset the title
    pub fn clear(&mut self, title: impl Into<String>) {
        self.points.clear();
        self.range = None;
        self.title = title.into();
    }

    /// Paint the chart into the remaining space
    ///
    /// The returned response carries hover state, used to route scroll input
    /// to zoom only when the pointer is over the chart.
    pub fn ui(&self, ui: &mut egui::Ui) -> egui::Response {
        ui.heading(&self.title);

        let size = ui.available_size();
        let (rect, response) = ui.allocate_exact_size(size, Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 2.0, BG);

        let plot = Rect::from_min_max(
            egui::pos2(rect.min.x + 44.0, rect.min.y + 10.0),
            egui::pos2(rect.max.x - 12.0, rect.max.y - 24.0),
        );

        let Some(range) = self.range else {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Waiting for samples",
                FontId::proportional(14.0),
                AXIS_TEXT,
            );
            return response;
        };

        for value in grid_values(range) {
            let y = value_to_y(value as f64, range, plot);
            painter.line_segment(
                [egui::pos2(plot.min.x, y), egui::pos2(plot.max.x, y)],
                Stroke::new(0.5, GRID),
            );
            painter.text(
                egui::pos2(plot.min.x - 6.0, y),
                Align2::RIGHT_CENTER,
                format!("{}", value),
                FontId::monospace(10.0),
                AXIS_TEXT,
            );
        }

        // Band center is the window average
        let mid = (range.lower + range.upper) as f64 / 2.0;
        let y_mid = value_to_y(mid, range, plot);
        painter.line_segment(
            [egui::pos2(plot.min.x, y_mid), egui::pos2(plot.max.x, y_mid)],
            Stroke::new(1.0, AVERAGE),
        );

        let points: Vec<Pos2> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, (_, v))| egui::pos2(index_to_x(i, self.points.len(), plot), value_to_y(*v, range, plot)))
            .collect();

        match points.len() {
            0 => {}
            1 => {
                painter.circle_filled(points[0], 2.5, LINE);
            }
            _ => {
                painter.add(Shape::line(points, Stroke::new(1.5, LINE)));
            }
        }

        if let (Some((first, _)), Some((last, _))) = (self.points.first(), self.points.last()) {
            painter.text(
                egui::pos2(plot.min.x, rect.max.y - 4.0),
                Align2::LEFT_BOTTOM,
                first,
                FontId::monospace(10.0),
                AXIS_TEXT,
            );
            painter.text(
                egui::pos2(plot.max.x, rect.max.y - 4.0),
                Align2::RIGHT_BOTTOM,
                last,
                FontId::monospace(10.0),
                AXIS_TEXT,
            );
        }

        response
    }
}

impl RenderSurface for ChartPanel {
    fn render_series(&mut self, samples: &[Sample]) {
        self.points.clear();
        self.points.extend(
            samples
                .iter()
                .map(|s| (s.timestamp_label().to_string(), s.value())),
        );
    }

    fn render_range(&mut self, range: DisplayRange) {
        self.range = Some(range);
    }

    fn render_title(&mut self, title: &str) {
        self.title = title.to_string();
    }
}

/// Map a value onto the plot's vertical extent; `upper` is at the top
fn value_to_y(value: f64, range: DisplayRange, plot: Rect) -> f32 {
    let span = range.upper.saturating_sub(range.lower).max(1) as f64;
    let t = (value - range.lower as f64) / span;
    plot.max.y - (t as f32) * plot.height()
}

/// Spread `len` points evenly from left to right
fn index_to_x(index: usize, len: usize, plot: Rect) -> f32 {
    if len <= 1 {
        return plot.max.x;
    }
    plot.min.x + plot.width() * index as f32 / (len - 1) as f32
}

/// Integer values for horizontal grid lines, inclusive of both bounds
fn grid_values(range: DisplayRange) -> Vec<i64> {
    let span = range.upper.saturating_sub(range.lower).max(1);
    let step = ((span + TARGET_GRID_LINES - 1) / TARGET_GRID_LINES).max(1);
    let mut values: Vec<i64> = (0..)
        .map_while(|k: i64| k.checked_mul(step).and_then(|d| range.lower.checked_add(d)))
        .take_while(|v| *v < range.upper)
        .collect();
    values.push(range.upper);
    values
}
