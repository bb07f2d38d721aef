//! Sensor capability
//!
//! Closed set of sensor kinds. `get()` blocks until one new reading is
//! available (or the sensor fails).

use contracts::{AcquisitionError, Frame, Reading};

use crate::camera::CameraSource;
use crate::numeric::NumericGenerator;

/// Sensor variants
#[derive(Debug)]
pub enum Sensor {
    /// Counter sensor
    Numeric(NumericGenerator),

    /// Camera sensor
    Camera(CameraSource),
}

impl Sensor {
    /// Block for the next reading
    ///
    /// Numeric sensors never fail; camera sensors fail with
    /// `DeviceUnavailable` after their retry budget is used up.
    pub fn get(&mut self) -> Result<Reading, AcquisitionError> {
        match self {
            Sensor::Numeric(generator) => Ok(Reading::Counter(generator.get())),
            Sensor::Camera(camera) => camera.get().map(Reading::Frame),
        }
    }

    /// Value shown before the first reading arrives
    pub fn zero_reading(&self) -> Reading {
        match self {
            Sensor::Numeric(_) => Reading::Counter(0),
            Sensor::Camera(camera) => Reading::Frame(Frame::black(camera.resolution())),
        }
    }

    /// Release any OS resource held by the sensor
    pub fn release(&mut self) {
        match self {
            Sensor::Numeric(_) => {}
            Sensor::Camera(camera) => camera.release(),
        }
    }

    pub fn is_camera(&self) -> bool {
        matches!(self, Sensor::Camera(_))
    }

    /// Short kind name for logs and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            Sensor::Numeric(_) => "numeric",
            Sensor::Camera(_) => "camera",
        }
    }
}

impl From<NumericGenerator> for Sensor {
    fn from(generator: NumericGenerator) -> Self {
        Sensor::Numeric(generator)
    }
}

impl From<CameraSource> for Sensor {
    fn from(camera: CameraSource) -> Self {
        Sensor::Camera(camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedCapture;
    use contracts::Resolution;
    use std::time::Duration;

    #[test]
    fn test_numeric_readings() {
        let mut sensor = Sensor::from(NumericGenerator::new(Duration::ZERO));
        assert_eq!(sensor.zero_reading(), Reading::Counter(0));
        assert_eq!(sensor.get().unwrap(), Reading::Counter(1));
        assert_eq!(sensor.get().unwrap(), Reading::Counter(2));
        assert_eq!(sensor.kind(), "numeric");
    }

    #[test]
    fn test_camera_zero_reading_is_black() {
        let res = Resolution::new(4, 4);
        let backend = ScriptedCapture::repeating(Frame::black(res));
        let camera = CameraSource::open(&backend, 0, res, 3).unwrap();
        let sensor = Sensor::from(camera);

        let zero = sensor.zero_reading();
        assert_eq!(zero.as_frame().map(|f| f.resolution()), Some(res));
        assert!(sensor.is_camera());
    }
}
