//! Camera source
//!
//! Wraps one capture device. The device is opened and warmed up in `open`,
//! read with a bounded retry count in `get`, and released exactly once,
//! either explicitly or when the source is dropped.

use contracts::{AcquisitionError, CaptureBackend, CaptureDevice, Frame, Resolution};
use image::{imageops, imageops::FilterType, RgbImage};
use observability::metrics::record_transient_read_failure;
use tracing::{debug, error, instrument, warn};

/// Default number of reads per `get()` before the device is declared gone
pub const DEFAULT_READ_ATTEMPTS: u32 = 3;

/// Camera sensor
pub struct CameraSource {
    device_id: i32,
    resolution: Resolution,
    read_attempts: u32,
    /// `None` once released
    device: Option<Box<dyn CaptureDevice>>,
}

impl std::fmt::Debug for CameraSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSource")
            .field("device_id", &self.device_id)
            .field("resolution", &self.resolution)
            .field("released", &self.device.is_none())
            .finish()
    }
}

impl CameraSource {
    /// Open the device and perform one warm-up read
    ///
    /// # Errors
    /// `DeviceUnavailable` when the backend cannot open the device or the
    /// warm-up read yields no frame. The device is released before returning.
    #[instrument(
        name = "camera_open",
        skip(backend),
        fields(backend = backend.name())
    )]
    pub fn open(
        backend: &dyn CaptureBackend,
        device_id: i32,
        resolution: Resolution,
        read_attempts: u32,
    ) -> Result<Self, AcquisitionError> {
        let mut device = backend.open(device_id).inspect_err(|e| {
            error!(device_id, error = %e, "camera does not exist");
        })?;

        if device.read().is_none() {
            device.release();
            error!(device_id, "camera does not exist");
            return Err(AcquisitionError::device_unavailable(
                device_id,
                "warm-up read produced no frame",
            ));
        }

        debug!(device_id, %resolution, "camera opened");

        Ok(Self {
            device_id,
            resolution,
            read_attempts: read_attempts.max(1),
            device: Some(device),
        })
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Read one frame, retrying up to the configured attempt count
    ///
    /// Each empty read is logged as a warning. Once the attempts are used up
    /// the error is logged and `DeviceUnavailable` returned; no further reads
    /// happen inside this call.
    pub fn get(&mut self) -> Result<Frame, AcquisitionError> {
        let device_id = self.device_id;
        let device = self.device.as_mut().ok_or_else(|| {
            AcquisitionError::device_unavailable(device_id, "device already released")
        })?;

        for attempt in 1..=self.read_attempts {
            match device.read() {
                Some(frame) => return Ok(resize(frame, self.resolution)),
                None => {
                    let failure = AcquisitionError::TransientReadFailure { device_id, attempt };
                    warn!(device_id, attempt, error = %failure, "camera is not active, trying to reconnect");
                    record_transient_read_failure(device_id);
                }
            }
        }

        error!(device_id, attempts = self.read_attempts, "camera is not active");
        Err(AcquisitionError::device_unavailable(
            device_id,
            format!("no frame after {} reads", self.read_attempts),
        ))
    }

    /// Release the capture device. Later calls are no-ops.
    pub fn release(&mut self) {
        if let Some(mut device) = self.device.take() {
            device.release();
            debug!(device_id = self.device_id, "camera released");
        }
    }

    pub fn is_released(&self) -> bool {
        self.device.is_none()
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.release();
    }
}

/// Resize to the configured resolution (bilinear)
fn resize(frame: Frame, target: Resolution) -> Frame {
    if frame.resolution() == target {
        return frame;
    }

    let source = match RgbImage::from_raw(frame.width, frame.height, frame.data.to_vec()) {
        Some(image) => image,
        None => {
            warn!(
                width = frame.width,
                height = frame.height,
                bytes = frame.data.len(),
                "malformed frame, substituting black frame"
            );
            return Frame::black(target);
        }
    };

    let resized = imageops::resize(&source, target.width, target.height, FilterType::Triangle);
    Frame::new(target, resized.into_raw()).unwrap_or_else(|| Frame::black(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::{ScriptStep, ScriptedCapture};

    const RES: Resolution = Resolution::new(8, 6);

    fn frame(width: u32, height: u32, value: u8) -> Frame {
        Frame::new(
            Resolution::new(width, height),
            vec![value; (width * height * 3) as usize],
        )
        .unwrap()
    }

    #[test]
    fn test_two_failures_then_success() {
        let backend = ScriptedCapture::new(vec![
            ScriptStep::Frame(frame(8, 6, 1)),
            ScriptStep::Empty,
            ScriptStep::Empty,
            ScriptStep::Frame(frame(8, 6, 9)),
        ]);
        let stats = backend.stats();
        let mut camera = CameraSource::open(&backend, 0, RES, DEFAULT_READ_ATTEMPTS).unwrap();

        let got = camera.get().unwrap();
        assert_eq!(got.pixel(0, 0), Some([9, 9, 9]));
        assert_eq!(stats.reads(), 4);
    }

    #[test]
    fn test_three_failures_is_fatal() {
        let backend = ScriptedCapture::new(vec![
            ScriptStep::Frame(frame(8, 6, 1)),
            ScriptStep::Empty,
            ScriptStep::Empty,
            ScriptStep::Empty,
            ScriptStep::Frame(frame(8, 6, 2)),
        ]);
        let stats = backend.stats();
        let mut camera = CameraSource::open(&backend, 4, RES, DEFAULT_READ_ATTEMPTS).unwrap();

        let err = camera.get().unwrap_err();
        assert!(matches!(
            err,
            AcquisitionError::DeviceUnavailable { device_id: 4, .. }
        ));
        // warm-up + 3 attempts, the trailing frame is never read
        assert_eq!(stats.reads(), 4);
    }

    #[test]
    fn test_warm_up_failure_releases_device() {
        let backend = ScriptedCapture::new(vec![ScriptStep::Empty]);
        let stats = backend.stats();

        let err = CameraSource::open(&backend, 7, RES, DEFAULT_READ_ATTEMPTS).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(stats.releases(), 1);
    }

    #[test]
    fn test_release_exactly_once() {
        let backend = ScriptedCapture::repeating(frame(8, 6, 0));
        let stats = backend.stats();

        let mut camera = CameraSource::open(&backend, 0, RES, DEFAULT_READ_ATTEMPTS).unwrap();
        camera.release();
        camera.release();
        assert!(camera.is_released());
        drop(camera);

        assert_eq!(stats.releases(), 1);
    }

    #[test]
    fn test_drop_releases() {
        let backend = ScriptedCapture::repeating(frame(8, 6, 0));
        let stats = backend.stats();
        {
            let _camera = CameraSource::open(&backend, 0, RES, DEFAULT_READ_ATTEMPTS).unwrap();
        }
        assert_eq!(stats.releases(), 1);
    }

    #[test]
    fn test_frames_resized() {
        let backend = ScriptedCapture::repeating(frame(16, 12, 77));
        let mut camera = CameraSource::open(&backend, 0, RES, DEFAULT_READ_ATTEMPTS).unwrap();

        let got = camera.get().unwrap();
        assert_eq!(got.resolution(), RES);
        assert_eq!(got.pixel(3, 3), Some([77, 77, 77]));
    }

    #[test]
    fn test_get_after_release_fails() {
        let backend = ScriptedCapture::repeating(frame(8, 6, 0));
        let mut camera = CameraSource::open(&backend, 2, RES, DEFAULT_READ_ATTEMPTS).unwrap();
        camera.release();
        assert!(camera.get().is_err());
    }
}
