//! Display window management
//!
//! The window holds the most recent samples in arrival order. Each refresh
//! drains the queue into it, evicts the oldest entries beyond the display
//! size and recomputes the integer average used to centre the display range.

use tracing::debug;

use crate::queue::SampleQueue;
use crate::sample::Sample;

/// Owner of the displayed sample window
#[derive(Debug, Default)]
pub struct WindowManager {
    samples: Vec<Sample>,
    average: i64,
}

impl WindowManager {
    /// Create an empty window
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples currently displayed, oldest first
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of samples in the window
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Average computed by the last refresh
    pub fn average(&self) -> i64 {
        self.average
    }

    /// Drain pending samples into the window
    ///
    /// Returns `false` without touching the window if nothing was pending.
    pub fn refresh(&mut self, queue: &mut SampleQueue, display_size: usize) -> bool {
        if queue.is_empty() {
            return false;
        }

        let drained = queue.drain_up_to(display_size);
        if drained.is_empty() {
            return false;
        }

        let count = drained.len();
        self.samples.extend(drained);
        let evicted = self.enforce_capacity(display_size);
        self.recompute_average();

        debug!(
            "Window refresh: drained {}, evicted {}, len {}, average {}",
            count,
            evicted,
            self.samples.len(),
            self.average
        );
        true
    }

    /// Evict the oldest samples until at most `display_size` remain
    ///
    /// Returns the number of evicted samples.
    pub fn enforce_capacity(&mut self, display_size: usize) -> usize {
        let excess = self.samples.len().saturating_sub(display_size);
        if excess > 0 {
            self.samples.drain(..excess);
        }
        excess
    }

    /// Recompute the average from scratch
    ///
    /// The sum is divided by the window length and truncated toward zero.
    /// An empty window leaves the previous average in place.
    pub fn recompute_average(&mut self) {
        if self.samples.is_empty() {
            return;
        }
        let sum: f64 = self.samples.iter().map(Sample::value).sum();
        self.average = (sum / self.samples.len() as f64).trunc() as i64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::sample_queue;

    fn fill(values: &[f64]) -> SampleQueue {
        let (tx, queue) = sample_queue();
        for (i, v) in values.iter().enumerate() {
            tx.append(Sample::new(*v, format!("t{}", i))).unwrap();
        }
        queue
    }

    fn window_values(window: &WindowManager) -> Vec<f64> {
        window.samples().iter().map(Sample::value).collect()
    }

    #[test]
    fn test_empty_queue_is_noop() {
        let mut queue = fill(&[]);
        let mut window = WindowManager::new();
        assert!(!window.refresh(&mut queue, 10));
        assert!(window.is_empty());
        assert_eq!(window.average(), 0);
    }

    #[test]
    fn test_drains_at_most_display_size() {
        let mut queue = fill(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut window = WindowManager::new();

        assert!(window.refresh(&mut queue, 3));
        assert_eq!(window_values(&window), vec![1.0, 2.0, 3.0]);
        assert_eq!(queue.len(), 2);

        assert!(window.refresh(&mut queue, 3));
        assert_eq!(window_values(&window), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_average_truncates_toward_zero() {
        let mut queue = fill(&[1.0, 2.0]);
        let mut window = WindowManager::new();
        window.refresh(&mut queue, 10);
        assert_eq!(window.average(), 1);

        let mut queue = fill(&[-1.0, -2.0]);
        let mut window = WindowManager::new();
        window.refresh(&mut queue, 10);
        assert_eq!(window.average(), -1);
    }

    #[test]
    fn test_average_uses_fractional_sum() {
        // 1.5 + 2.5 = 4.0 -> 2, not (1 + 2) / 2
        let mut queue = fill(&[1.5, 2.5]);
        let mut window = WindowManager::new();
        window.refresh(&mut queue, 10);
        assert_eq!(window.average(), 2);

        // 6.9 / 3 -> 2, where truncating each reading first gives 5 / 3 -> 1
        let mut queue = fill(&[1.5, 2.5, 2.9]);
        let mut window = WindowManager::new();
        window.refresh(&mut queue, 10);
        assert_eq!(window.average(), 2);
    }

    #[test]
    fn test_enforce_capacity_evicts_oldest() {
        let mut queue = fill(&[1.0, 2.0, 3.0, 4.0]);
        let mut window = WindowManager::new();
        window.refresh(&mut queue, 10);

        assert_eq!(window.enforce_capacity(2), 2);
        assert_eq!(window_values(&window), vec![3.0, 4.0]);
        assert_eq!(window.enforce_capacity(5), 0);
    }
}
