//! Lifecycle controller
//!
//! Starts one acquisition loop per sensor and stops them as a unit.

use async_channel::{unbounded, Receiver};
use contracts::{Reading, Sample, SensorId};
use sensors::Sensor;
use tracing::{error, info, instrument, warn};

use crate::acquisition::{AcquisitionLoop, SensorFailure};
use crate::error::{IngestionError, Result};
use crate::freshness::{freshness_buffer, FreshnessReceiver};
use crate::sensor_metrics::MetricsSnapshot;

/// Consumer side of one sensor, handed to the compositor
#[derive(Debug)]
pub struct SensorFeed {
    pub sensor_id: SensorId,
    /// Value displayed until the first reading arrives
    pub zero: Reading,
    pub is_camera: bool,
    pub rx: FreshnessReceiver<Sample>,
}

/// Outcome of `stop_all`
#[derive(Debug, Clone, Default)]
pub struct ShutdownReport {
    /// Final counters per sensor, in start order
    pub sensors: Vec<(SensorId, MetricsSnapshot)>,
}

/// Owns every acquisition loop of the pipeline
pub struct LifecycleController {
    loops: Vec<AcquisitionLoop>,
    failures: Receiver<SensorFailure>,
    shutdown: Option<Result<ShutdownReport>>,
}

impl LifecycleController {
    /// Create a loop and freshness buffer per sensor and start every loop
    ///
    /// If a worker cannot be spawned the loops already running are stopped
    /// and the error returned.
    #[instrument(name = "lifecycle_start", skip(sensors), fields(count = sensors.len()))]
    pub fn start(sensors: Vec<(SensorId, Sensor)>) -> Result<(Self, Vec<SensorFeed>)> {
        let (fail_tx, fail_rx) = unbounded();
        let mut loops = Vec::with_capacity(sensors.len());
        let mut feeds = Vec::with_capacity(sensors.len());

        for (sensor_id, sensor) in sensors {
            let (tx, rx) = freshness_buffer();
            feeds.push(SensorFeed {
                sensor_id: sensor_id.clone(),
                zero: sensor.zero_reading(),
                is_camera: sensor.is_camera(),
                rx,
            });
            loops.push(
                AcquisitionLoop::new(sensor_id, sensor, tx).with_failure_notifier(fail_tx.clone()),
            );
        }

        let mut controller = Self {
            loops,
            failures: fail_rx,
            shutdown: None,
        };

        let mut start_error = None;
        for acq in &mut controller.loops {
            if let Err(e) = acq.start() {
                start_error = Some(e);
                break;
            }
        }
        if let Some(e) = start_error {
            error!(error = %e, "failed to start acquisition loops, stopping started ones");
            let _ = controller.stop_all();
            return Err(e);
        }

        info!(count = controller.loops.len(), "all acquisition loops started");
        Ok((controller, feeds))
    }

    pub fn running_count(&self) -> usize {
        self.loops.iter().filter(|l| l.is_running()).count()
    }

    /// First fatal sensor failure not yet observed, without blocking
    pub fn poll_failure(&self) -> Option<SensorFailure> {
        self.failures.try_recv().ok()
    }

    /// Live counters per sensor
    pub fn snapshot(&self) -> Vec<(SensorId, MetricsSnapshot)> {
        self.loops
            .iter()
            .map(|l| (l.sensor_id().clone(), l.metrics().snapshot()))
            .collect()
    }

    /// Stop every loop in sequence, waiting for each thread to exit
    ///
    /// All loops are stopped even when one of them failed; the first
    /// failure is returned. Only the first call does work, later calls log
    /// a warning and return the recorded outcome.
    #[instrument(name = "lifecycle_stop_all", skip(self), fields(count = self.loops.len()))]
    pub fn stop_all(&mut self) -> Result<ShutdownReport> {
        if let Some(outcome) = &self.shutdown {
            warn!("stop_all called more than once");
            return outcome.clone();
        }

        info!("stopping all acquisition loops");
        let mut report = ShutdownReport::default();
        let mut first_error: Option<IngestionError> = None;

        for acq in &mut self.loops {
            match acq.stop() {
                Ok(snapshot) => report.sensors.push((acq.sensor_id().clone(), snapshot)),
                Err(e) => {
                    report
                        .sensors
                        .push((acq.sensor_id().clone(), acq.metrics().snapshot()));
                    first_error.get_or_insert(e);
                }
            }
        }

        let outcome = match first_error {
            Some(e) => Err(e),
            None => Ok(report),
        };
        info!(ok = outcome.is_ok(), "all acquisition loops stopped");
        self.shutdown = Some(outcome.clone());
        outcome
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_some()
    }
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        if self.shutdown.is_none() {
            let _ = self.stop_all();
        }
    }
}
