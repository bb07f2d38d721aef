//! Compositor loop
//!
//! Once per display tick: drain every freshness buffer, refresh the
//! last-known cache, paint the overlay onto the latest camera frame and hand
//! the composite to the display.

use std::time::{Duration, Instant};

use contracts::{
    CompositeFrame, DisplaySurface, Frame, PipelineBlueprint, Reading, Resolution,
};
use ingestion::{LifecycleController, SensorFailure, SensorFeed};
use observability::metrics::{record_last_seq, record_tick};
use observability::{FreshnessAggregator, MetricsSummary};
use tracing::{debug, error, info, instrument};

use crate::cache::LastKnownCache;
use crate::error::{CompositorError, Result};
use crate::overlay::OverlayLayout;

/// Compositor settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositorConfig {
    /// Upper bound on `try_take` calls per buffer per tick
    pub max_drain_per_tick: usize,
    /// Stop after this many ticks
    pub max_ticks: Option<u64>,
    /// Base image size when no camera is configured
    pub canvas: Resolution,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            max_drain_per_tick: 8,
            max_ticks: None,
            canvas: Resolution::new(640, 480),
        }
    }
}

impl CompositorConfig {
    pub fn from_blueprint(blueprint: &PipelineBlueprint) -> Self {
        Self {
            max_drain_per_tick: blueprint.acquisition.max_drain_per_tick,
            max_ticks: blueprint.display.max_ticks,
            canvas: blueprint.display.canvas,
        }
    }
}

/// Source of fatal sensor failures, polled once per tick
pub trait FailureSource {
    fn poll_failure(&self) -> Option<SensorFailure>;
}

impl FailureSource for LifecycleController {
    fn poll_failure(&self) -> Option<SensorFailure> {
        LifecycleController::poll_failure(self)
    }
}

/// Why the compositor loop ended normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The display reported a stop request
    Requested,
    /// `max_ticks` reached
    MaxTicks,
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct CompositorReport {
    pub ticks: u64,
    pub elapsed: Duration,
    pub stop_reason: StopReason,
    /// Cache state after the last tick
    pub cache: LastKnownCache,
    /// Tick time and reading age statistics
    pub freshness: MetricsSummary,
}

impl CompositorReport {
    pub fn ticks_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.ticks as f64 / secs
        } else {
            0.0
        }
    }
}

/// Owns the consumer side of every sensor feed
pub struct Compositor {
    feeds: Vec<SensorFeed>,
    cache: LastKnownCache,
    layout: OverlayLayout,
    config: CompositorConfig,
    tick: u64,
    stats: FreshnessAggregator,
}

impl Compositor {
    pub fn new(feeds: Vec<SensorFeed>, config: CompositorConfig) -> Self {
        let mut cache = LastKnownCache::new();
        for feed in &feeds {
            cache.register(feed.sensor_id.clone(), feed.zero.clone(), feed.is_camera);
        }

        Self {
            feeds,
            cache,
            layout: OverlayLayout::default(),
            config,
            tick: 0,
            stats: FreshnessAggregator::new(),
        }
    }

    pub fn with_layout(mut self, layout: OverlayLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn cache(&self) -> &LastKnownCache {
        &self.cache
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Drain every buffer into the cache and build the next composite
    pub fn tick(&mut self) -> CompositeFrame {
        self.tick += 1;
        let cap = self.config.max_drain_per_tick.max(1);

        for (index, feed) in self.feeds.iter().enumerate() {
            if let Some(sample) = feed.rx.drain_latest(cap) {
                let seq = sample.seq;
                if self.cache.update(index, sample) {
                    record_last_seq(&feed.sensor_id, seq);
                }
            }
        }

        let now = Instant::now();
        for entry in self.cache.entries() {
            if let Some(captured_at) = entry.captured_at {
                let age = now.saturating_duration_since(captured_at);
                self.stats
                    .record_age(&entry.sensor_id, age.as_secs_f64() * 1000.0);
            }
        }

        let black;
        let base = match self.cache.camera_frame() {
            Some(frame) => frame,
            None => {
                black = Frame::black(self.config.canvas);
                &black
            }
        };
        let values: Vec<&Reading> = self.cache.overlay_entries().map(|e| &e.reading).collect();

        self.layout.compose(self.tick, base, values)
    }

    /// Tick until a stop request, `max_ticks` or a fatal sensor failure
    ///
    /// `surface.close()` is called exactly once, whatever the outcome.
    #[instrument(name = "compositor_run", skip_all, fields(surface = surface.name(), sensors = self.feeds.len()))]
    pub fn run(
        &mut self,
        surface: &mut dyn DisplaySurface,
        failures: &dyn FailureSource,
    ) -> Result<CompositorReport> {
        let started = Instant::now();
        let outcome = self.run_ticks(surface, failures);
        surface.close();

        let stop_reason = match outcome {
            Ok(reason) => reason,
            Err(e) => {
                error!(error = %e, ticks = self.tick, "compositor stopped on error");
                return Err(e);
            }
        };

        let report = CompositorReport {
            ticks: self.tick,
            elapsed: started.elapsed(),
            stop_reason,
            cache: self.cache.clone(),
            freshness: self.stats.summary(),
        };
        info!(
            ticks = report.ticks,
            reason = ?report.stop_reason,
            tps = format!("{:.1}", report.ticks_per_second()),
            "compositor stopped"
        );
        Ok(report)
    }

    fn run_ticks(
        &mut self,
        surface: &mut dyn DisplaySurface,
        failures: &dyn FailureSource,
    ) -> Result<StopReason> {
        loop {
            if let Some(failure) = failures.poll_failure() {
                return Err(CompositorError::SensorFailed {
                    sensor_id: failure.sensor_id,
                    source: failure.error,
                });
            }
            if self.config.max_ticks.is_some_and(|max| self.tick >= max) {
                return Ok(StopReason::MaxTicks);
            }

            let tick_start = Instant::now();
            let composite = self.tick();
            let stop = surface.present(&composite)?;

            let elapsed = tick_start.elapsed();
            record_tick(elapsed.as_secs_f64());
            self.stats.record_tick(elapsed.as_secs_f64() * 1000.0);
            debug!(tick = composite.tick, lines = composite.lines.len(), "tick presented");

            if stop {
                return Ok(StopReason::Requested);
            }
        }
    }
}
