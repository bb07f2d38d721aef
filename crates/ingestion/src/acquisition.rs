//! Acquisition loop
//!
//! One background thread per sensor: fetch a reading, publish it into the
//! freshness buffer if the slot is free, repeat until stopped or the sensor
//! fails.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use async_channel::Sender;
use contracts::{AcquisitionError, Sample, SensorId};
use observability::metrics::{
    record_reading_dropped, record_reading_published, record_sensor_failure,
};
use sensors::Sensor;
use tracing::{debug, error, instrument, trace, warn};

use crate::error::{IngestionError, Result};
use crate::freshness::FreshnessSender;
use crate::sensor_metrics::{MetricsSnapshot, SensorMetrics};

/// Fatal failure reported by an acquisition loop
#[derive(Debug, Clone)]
pub struct SensorFailure {
    pub sensor_id: SensorId,
    pub error: AcquisitionError,
}

/// Loop lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Constructed, no thread yet
    Idle,
    /// Worker thread spawned
    Running,
    /// Worker joined
    Stopped,
}

enum Worker {
    Idle {
        sensor: Sensor,
        tx: FreshnessSender<Sample>,
    },
    Running(JoinHandle<std::result::Result<(), AcquisitionError>>),
    Stopped(Result<MetricsSnapshot>),
    /// Transitional, only observable if a spawn panics
    Vacant,
}

/// Background acquisition loop for one sensor
///
/// Construction has no side effects; `start` spawns the worker and `stop`
/// joins it. Stop is observed at the top of each iteration, so `stop`
/// blocks for at most one in-flight `Sensor::get()`.
pub struct AcquisitionLoop {
    sensor_id: SensorId,
    running: Arc<AtomicBool>,
    metrics: Arc<SensorMetrics>,
    failures: Option<Sender<SensorFailure>>,
    worker: Worker,
}

impl AcquisitionLoop {
    pub fn new(sensor_id: SensorId, sensor: Sensor, tx: FreshnessSender<Sample>) -> Self {
        Self {
            sensor_id,
            running: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(SensorMetrics::new()),
            failures: None,
            worker: Worker::Idle { sensor, tx },
        }
    }

    /// Report fatal failures on `failures` as soon as the loop dies
    pub fn with_failure_notifier(mut self, failures: Sender<SensorFailure>) -> Self {
        self.failures = Some(failures);
        self
    }

    pub fn sensor_id(&self) -> &SensorId {
        &self.sensor_id
    }

    pub fn metrics(&self) -> Arc<SensorMetrics> {
        self.metrics.clone()
    }

    pub fn state(&self) -> LoopState {
        match self.worker {
            Worker::Idle { .. } => LoopState::Idle,
            Worker::Running(_) => LoopState::Running,
            Worker::Stopped(_) | Worker::Vacant => LoopState::Stopped,
        }
    }

    /// Worker is alive and has not been asked to stop
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Spawn the worker thread
    #[instrument(name = "acquisition_start", skip(self), fields(sensor_id = %self.sensor_id))]
    pub fn start(&mut self) -> Result<()> {
        let (sensor, tx) = match std::mem::replace(&mut self.worker, Worker::Vacant) {
            Worker::Idle { sensor, tx } => (sensor, tx),
            other => {
                self.worker = other;
                return Err(IngestionError::AlreadyStarted {
                    sensor_id: self.sensor_id.clone(),
                });
            }
        };

        let ctx = WorkerContext {
            sensor_id: self.sensor_id.clone(),
            running: self.running.clone(),
            metrics: self.metrics.clone(),
            failures: self.failures.clone(),
        };

        self.running.store(true, Ordering::Release);
        let spawned = thread::Builder::new()
            .name(format!("acq-{}", self.sensor_id))
            .spawn(move || ctx.run(sensor, tx));

        match spawned {
            Ok(handle) => {
                debug!(sensor_id = %self.sensor_id, "acquisition loop started");
                self.worker = Worker::Running(handle);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                let err = IngestionError::Spawn {
                    sensor_id: self.sensor_id.clone(),
                    message: e.to_string(),
                };
                self.worker = Worker::Stopped(Err(err.clone()));
                Err(err)
            }
        }
    }

    /// Request stop and wait for the worker thread to exit
    ///
    /// Returns the loop's final counters, or the fatal sensor error that
    /// ended it. Calling `stop` again returns the same outcome without
    /// side effects. Stopping an idle loop releases its sensor unused.
    #[instrument(name = "acquisition_stop", skip(self), fields(sensor_id = %self.sensor_id))]
    pub fn stop(&mut self) -> Result<MetricsSnapshot> {
        self.running.store(false, Ordering::Release);

        let outcome = match std::mem::replace(&mut self.worker, Worker::Vacant) {
            Worker::Idle { mut sensor, .. } => {
                sensor.release();
                Ok(self.metrics.snapshot())
            }
            Worker::Running(handle) => match handle.join() {
                Ok(Ok(())) => Ok(self.metrics.snapshot()),
                Ok(Err(source)) => Err(IngestionError::Acquisition {
                    sensor_id: self.sensor_id.clone(),
                    source,
                }),
                Err(_) => {
                    error!(sensor_id = %self.sensor_id, "acquisition thread panicked");
                    Err(IngestionError::WorkerPanicked {
                        sensor_id: self.sensor_id.clone(),
                    })
                }
            },
            Worker::Stopped(outcome) => outcome,
            Worker::Vacant => Ok(self.metrics.snapshot()),
        };

        debug!(sensor_id = %self.sensor_id, ok = outcome.is_ok(), "acquisition loop stopped");
        self.worker = Worker::Stopped(outcome.clone());
        outcome
    }
}

impl Drop for AcquisitionLoop {
    fn drop(&mut self) {
        if matches!(self.worker, Worker::Running(_)) {
            let _ = self.stop();
        }
    }
}

struct WorkerContext {
    sensor_id: SensorId,
    running: Arc<AtomicBool>,
    metrics: Arc<SensorMetrics>,
    failures: Option<Sender<SensorFailure>>,
}

impl WorkerContext {
    fn run(
        self,
        mut sensor: Sensor,
        tx: FreshnessSender<Sample>,
    ) -> std::result::Result<(), AcquisitionError> {
        let outcome = loop {
            if !self.running.load(Ordering::Acquire) {
                break Ok(());
            }

            let reading = match sensor.get() {
                Ok(reading) => reading,
                Err(e) => break Err(e),
            };
            let seq = self.metrics.record_reading();

            if tx.try_publish(Sample::new(seq, reading)) {
                self.metrics.record_published();
                record_reading_published(&self.sensor_id);
                trace!(sensor_id = %self.sensor_id, seq, "reading published");
            } else {
                // slot still holds an unconsumed reading
                self.metrics.record_dropped();
                record_reading_dropped(&self.sensor_id);
            }
        };

        sensor.release();
        self.running.store(false, Ordering::Release);

        if let Err(e) = &outcome {
            self.metrics.record_failure();
            record_sensor_failure(&self.sensor_id);
            error!(sensor_id = %self.sensor_id, error = %e, "acquisition loop terminated");
            if let Some(failures) = &self.failures {
                let failure = SensorFailure {
                    sensor_id: self.sensor_id.clone(),
                    error: e.clone(),
                };
                if failures.try_send(failure).is_err() {
                    warn!(sensor_id = %self.sensor_id, "failure notifier closed");
                }
            }
        }

        outcome
    }
}
