//! Pipeline orchestrator - coordinates all components.
//!
//! Sensors are built from the blueprint against a capture backend (synthetic
//! unless another one is supplied), one acquisition loop runs per sensor and
//! the compositor runs on a blocking worker until the display asks to stop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use compositor::{
    Compositor, CompositorConfig, CompositorError, LogDisplay, SnapshotDisplay,
    SnapshotDisplayConfig, StopSignal,
};
use contracts::{CaptureBackend, DisplaySurface, PipelineBlueprint};
use ingestion::LifecycleController;
use sensors::{SensorFactory, SyntheticCapture};
use tracing::{error, info};

use super::PipelineStats;
use crate::cli::{Cli, DisplayKind};
use crate::error::CliError;

/// Display back-end settings
#[derive(Debug, Clone)]
pub struct DisplaySettings {
    pub kind: DisplayKind,
    pub snapshot_dir: PathBuf,
    pub snapshot_every: u64,
}

impl DisplaySettings {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            kind: cli.display,
            snapshot_dir: cli.snapshot_dir.clone(),
            snapshot_every: cli.snapshot_every,
        }
    }

    fn build(&self, tick_delay: Duration, stop: StopSignal) -> Result<Box<dyn DisplaySurface>> {
        let display: Box<dyn DisplaySurface> = match self.kind {
            DisplayKind::Log => Box::new(LogDisplay::new(tick_delay, stop)),
            DisplayKind::Snapshot => {
                let config = SnapshotDisplayConfig {
                    base_path: self.snapshot_dir.clone(),
                    every: self.snapshot_every,
                    tick_delay,
                };
                Box::new(SnapshotDisplay::new(config, stop).with_context(|| {
                    format!(
                        "Failed to create snapshot directory {}",
                        self.snapshot_dir.display()
                    )
                })?)
            }
        };
        Ok(display)
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated blueprint
    pub blueprint: PipelineBlueprint,

    pub display: DisplaySettings,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
    backend: Arc<dyn CaptureBackend>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            backend: Arc::new(SyntheticCapture::default()),
        }
    }

    /// Open camera sensors through `backend` instead of the synthetic one
    pub fn with_backend(mut self, backend: Arc<dyn CaptureBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Run the pipeline until `stop` is triggered, the tick limit is reached
    /// or a sensor fails
    pub async fn run(self, stop: StopSignal) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = self.config.blueprint;

        let factory = SensorFactory::new(self.backend);
        let sensors = factory
            .build_all(&blueprint)
            .context("Failed to open sensors")?;
        info!(sensors = sensors.len(), "Sensors opened");

        let display = self
            .config
            .display
            .build(blueprint.display.tick_delay(), stop)?;

        let (controller, feeds) =
            LifecycleController::start(sensors).context("Failed to start acquisition loops")?;

        let compositor_config = CompositorConfig::from_blueprint(&blueprint);
        let worker = tokio::task::spawn_blocking(move || {
            let mut display = display;
            let mut compositor = Compositor::new(feeds, compositor_config);
            let outcome = compositor.run(display.as_mut(), &controller);
            (controller, outcome)
        });

        let (mut controller, outcome) = worker
            .await
            .map_err(|e| CliError::pipeline_execution(e.to_string()))?;

        let shutdown = controller.stop_all();

        let report = match outcome {
            Ok(report) => report,
            Err(CompositorError::SensorFailed { sensor_id, source }) => {
                error!(sensor_id = %sensor_id, error = %source, "Sensor failed, pipeline torn down");
                return Err(CliError::sensor_failure(format!("{sensor_id}: {source}")).into());
            }
            Err(e) => return Err(e).context("Compositor failed"),
        };

        let shutdown = shutdown.map_err(|e| CliError::shutdown(e.to_string()))?;

        Ok(PipelineStats::new(
            report,
            shutdown,
            start_time.elapsed(),
        ))
    }
}
