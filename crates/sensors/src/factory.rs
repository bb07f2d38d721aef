//! Sensor factory
//!
//! Builds the sensor set described by a `PipelineBlueprint`.

use std::sync::Arc;
use std::time::Duration;

use contracts::{
    AcquisitionConfig, AcquisitionError, CaptureBackend, PipelineBlueprint, SensorConfig,
    SensorId, SensorKind,
};
use tracing::{info, instrument, warn};

use crate::camera::CameraSource;
use crate::numeric::NumericGenerator;
use crate::sensor::Sensor;

/// Sensor factory
///
/// Owns the capture back-end used for camera sensors.
#[derive(Clone)]
pub struct SensorFactory {
    backend: Arc<dyn CaptureBackend>,
}

impl SensorFactory {
    pub fn new(backend: Arc<dyn CaptureBackend>) -> Self {
        Self { backend }
    }

    /// Build every sensor in blueprint order
    ///
    /// # Atomicity
    /// If any sensor fails to open, the sensors built so far are released
    /// before the error is returned.
    #[instrument(
        name = "sensor_factory_build_all",
        skip(self, blueprint),
        fields(sensor_count = blueprint.sensors.len(), backend = self.backend.name())
    )]
    pub fn build_all(
        &self,
        blueprint: &PipelineBlueprint,
    ) -> Result<Vec<(SensorId, Sensor)>, AcquisitionError> {
        let mut built: Vec<(SensorId, Sensor)> = Vec::with_capacity(blueprint.sensors.len());

        for config in &blueprint.sensors {
            match self.build(config, &blueprint.acquisition) {
                Ok(sensor) => {
                    info!(sensor_id = %config.id, kind = sensor.kind(), "sensor ready");
                    built.push((config.id.clone(), sensor));
                }
                Err(e) => {
                    warn!(
                        sensor_id = %config.id,
                        error = %e,
                        "sensor build failed, releasing built sensors"
                    );
                    for (_, sensor) in &mut built {
                        sensor.release();
                    }
                    return Err(e);
                }
            }
        }

        Ok(built)
    }

    /// Build a single sensor
    pub fn build(
        &self,
        config: &SensorConfig,
        acquisition: &AcquisitionConfig,
    ) -> Result<Sensor, AcquisitionError> {
        match &config.kind {
            SensorKind::Numeric { delay_ms } => Ok(Sensor::Numeric(NumericGenerator::new(
                Duration::from_millis(*delay_ms),
            ))),
            SensorKind::Camera {
                device_id,
                resolution,
            } => CameraSource::open(
                self.backend.as_ref(),
                *device_id,
                *resolution,
                acquisition.camera_read_attempts,
            )
            .map(Sensor::Camera),
        }
    }
}
