//! Synthetic capture back-end
//!
//! Produces a moving gradient test pattern at a fixed frame rate so the
//! pipeline can run on machines without a camera. Every device id opens.

use std::thread;
use std::time::{Duration, Instant};

use contracts::{AcquisitionError, CaptureBackend, CaptureDevice, Frame, Resolution};
use tracing::debug;

/// Test-pattern back-end
#[derive(Debug, Clone)]
pub struct SyntheticCapture {
    native: Resolution,
    frame_interval: Duration,
}

impl SyntheticCapture {
    /// `native` is the resolution the device "captures" at, frames are
    /// resized by the camera sensor afterwards
    pub fn new(native: Resolution, fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 30.0 };
        Self {
            native,
            frame_interval: Duration::from_secs_f64(1.0 / fps),
        }
    }
}

impl Default for SyntheticCapture {
    fn default() -> Self {
        Self::new(Resolution::new(640, 480), 30.0)
    }
}

impl CaptureBackend for SyntheticCapture {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn open(&self, device_id: i32) -> Result<Box<dyn CaptureDevice>, AcquisitionError> {
        debug!(device_id, native = %self.native, "synthetic capture opened");
        Ok(Box::new(SyntheticDevice {
            native: self.native,
            frame_interval: self.frame_interval,
            phase: device_id.unsigned_abs(),
            next_frame_at: None,
            released: false,
        }))
    }
}

struct SyntheticDevice {
    native: Resolution,
    frame_interval: Duration,
    phase: u32,
    next_frame_at: Option<Instant>,
    released: bool,
}

impl SyntheticDevice {
    fn render(&self) -> Frame {
        let Resolution { width, height } = self.native;
        let mut data = Vec::with_capacity(self.native.area() * 3);
        for y in 0..height {
            for x in 0..width {
                let r = ((x + self.phase) % 256) as u8;
                let g = ((y + self.phase / 2) % 256) as u8;
                let b = (self.phase % 256) as u8;
                data.extend_from_slice(&[r, g, b]);
            }
        }
        Frame::new(self.native, data).unwrap_or_else(|| Frame::black(self.native))
    }
}

impl CaptureDevice for SyntheticDevice {
    fn read(&mut self) -> Option<Frame> {
        if self.released {
            return None;
        }

        // pace reads to the native frame rate
        if let Some(at) = self.next_frame_at {
            let now = Instant::now();
            if at > now {
                thread::sleep(at - now);
            }
        }
        self.next_frame_at = Some(Instant::now() + self.frame_interval);

        self.phase = self.phase.wrapping_add(4);
        Some(self.render())
    }

    fn release(&mut self) {
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_moves() {
        let backend = SyntheticCapture::new(Resolution::new(16, 8), 1000.0);
        let mut device = backend.open(0).unwrap();

        let first = device.read().unwrap();
        let second = device.read().unwrap();
        assert_eq!(first.resolution(), Resolution::new(16, 8));
        assert_ne!(first.pixel(0, 0), second.pixel(0, 0));
    }

    #[test]
    fn test_released_device_reads_nothing() {
        let backend = SyntheticCapture::default();
        let mut device = backend.open(1).unwrap();
        device.release();
        assert!(device.read().is_none());
    }
}
