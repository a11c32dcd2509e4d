//! Refresh loop
//!
//! A cooperative, externally scheduled cycle. Each [`RefreshLoop::tick`]:
//!
//! 1. picks up the latest `SETTING` report and updates the title
//! 2. drains the sample queue into the window and evicts old samples
//! 3. recomputes the display range
//! 4. checks the stop flag
//!
//! Ticks are cheap and never block, so they can be driven from a UI frame
//! callback, a repeating timer or an explicit poll loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use scope_link::{MessageKind, MessageSource, SettingReport};
use tracing::{debug, info, warn};

use crate::config::ScopeConfig;
use crate::error::ScopeError;
use crate::queue::SampleQueue;
use crate::range::{DisplayRange, RangeController, ZoomDirection};
use crate::sample::Sample;
use crate::surface::RenderSurface;
use crate::window::WindowManager;

/// Lifecycle of the refresh loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Created, not yet started
    #[default]
    Idle,
    /// Processing ticks
    Running,
    /// Halted by the stop flag
    Stopped,
}

/// Cross-thread stop request for a refresh loop
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// Request a stop; observed on the next tick
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested
    pub fn is_stop_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// The window (and therefore the range) changed
    pub changed: bool,
    /// The loop is stopped; no further ticks will be processed
    pub stopped: bool,
}

/// Point-in-time copy of the loop's visible state
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeSnapshot {
    pub samples: Vec<Sample>,
    pub range: Option<DisplayRange>,
    pub average: Option<i64>,
    pub title: String,
    pub display_size: usize,
    pub boundary_shift: i64,
    pub state: RunState,
    pub ticks: u64,
}

/// Consumer half of the pipeline
pub struct RefreshLoop {
    source: Arc<dyn MessageSource>,
    queue: SampleQueue,
    window: WindowManager,
    range: RangeController,
    current_range: Option<DisplayRange>,
    base_title: String,
    title: String,
    state: RunState,
    stop: StopHandle,
    ticks: u64,
}

impl std::fmt::Debug for RefreshLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshLoop")
            .field("source", &"<source>")
            .field("window_len", &self.window.len())
            .field("range", &self.current_range)
            .field("state", &self.state)
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl RefreshLoop {
    /// Create a loop reading settings from `source` and samples from `queue`
    pub fn new(
        config: &ScopeConfig,
        source: Arc<dyn MessageSource>,
        queue: SampleQueue,
    ) -> Result<Self, ScopeError> {
        config.validate()?;

        Ok(Self {
            source,
            queue,
            window: WindowManager::new(),
            range: RangeController::new(config),
            current_range: None,
            base_title: config.title.clone(),
            title: config.title.clone(),
            state: RunState::Idle,
            stop: StopHandle::default(),
            ticks: 0,
        })
    }

    /// Begin processing ticks
    ///
    /// Clears any pending stop request. Returns `false` if already running.
    pub fn start(&mut self) -> bool {
        if self.state == RunState::Running {
            return false;
        }
        self.stop.reset();
        self.state = RunState::Running;
        info!("Refresh loop started");
        true
    }

    /// Request a stop; the transition happens on the next tick
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Handle for requesting a stop from another thread
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Current lifecycle state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Number of ticks processed while running
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The display window
    pub fn window(&self) -> &WindowManager {
        &self.window
    }

    /// The range/zoom controller
    pub fn range_controller(&self) -> &RangeController {
        &self.range
    }

    /// Display range, once data has arrived
    pub fn current_range(&self) -> Option<DisplayRange> {
        self.current_range
    }

    /// Current chart title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Samples waiting in the queue
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Copy of everything a chart needs to draw
    pub fn snapshot(&self) -> ScopeSnapshot {
        ScopeSnapshot {
            samples: self.window.samples().to_vec(),
            range: self.current_range,
            average: (!self.window.is_empty()).then(|| self.window.average()),
            title: self.title.clone(),
            display_size: self.range.display_size(),
            boundary_shift: self.range.boundary_shift(),
            state: self.state,
            ticks: self.ticks,
        }
    }

    /// Run one refresh cycle
    ///
    /// Outside the `Running` state this does nothing.
    pub fn tick(&mut self, surface: &mut dyn RenderSurface) -> TickOutcome {
        match self.state {
            RunState::Idle => return TickOutcome::default(),
            RunState::Stopped => {
                return TickOutcome {
                    changed: false,
                    stopped: true,
                }
            }
            RunState::Running => {}
        }

        self.ticks += 1;
        self.poll_setting(surface);

        let changed = self
            .window
            .refresh(&mut self.queue, self.range.display_size());
        if changed {
            self.publish(surface);
        }

        let stopped = self.stop.is_stop_requested();
        if stopped {
            self.state = RunState::Stopped;
            info!("Refresh loop stopped after {} ticks", self.ticks);
        }

        TickOutcome { changed, stopped }
    }

    /// Apply a scroll-style zoom input and refresh immediately
    ///
    /// Negative `delta` grows the window and widens the band; zero or
    /// positive shrinks both. The window is trimmed to the new size and the
    /// range recomputed before the tick, so the change is visible even when
    /// no new samples are pending.
    pub fn zoom(&mut self, delta: f64, surface: &mut dyn RenderSurface) -> TickOutcome {
        let direction = ZoomDirection::from_delta(delta);
        if self.range.zoom(direction) && !self.window.is_empty() {
            let evicted = self.window.enforce_capacity(self.range.display_size());
            if evicted > 0 {
                self.window.recompute_average();
            }
            self.publish(surface);
        }

        self.tick(surface)
    }

    fn poll_setting(&mut self, surface: &mut dyn RenderSurface) {
        let message = match self.source.pop_latest(MessageKind::Setting) {
            Ok(Some(message)) => message,
            Ok(None) => return,
            Err(e) => {
                warn!("Setting poll failed: {}", e);
                return;
            }
        };

        match SettingReport::parse(&message.payload) {
            Ok(report) => {
                self.title = report.title(&self.base_title);
                debug!("Refresh rate reported: {}ms", report.refresh_ms);
                surface.render_title(&self.title);
            }
            Err(e) => warn!("Ignoring setting {:?}: {}", message.payload, ScopeError::from(e)),
        }
    }

    fn publish(&mut self, surface: &mut dyn RenderSurface) {
        let range = self.range.current_range(self.window.average());
        self.current_range = Some(range);
        surface.render_series(self.window.samples());
        surface.render_range(range);
    }
}

/// Drive `refresh` from a repeating timer until it stops
///
/// Starts the loop if needed. Returns the number of ticks processed.
pub async fn run_with_interval<S>(refresh: &mut RefreshLoop, surface: &mut S, period: Duration) -> u64
where
    S: RenderSurface + Send,
{
    refresh.start();
    let mut ticker = tokio::time::interval(period);

    loop {
        ticker.tick().await;
        if refresh.tick(surface).stopped {
            break;
        }
    }

    refresh.ticks()
}
