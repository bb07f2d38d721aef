//! Scripted capture back-end
//!
//! Replays a fixed sequence of frames and empty reads, and counts every
//! read and release. Used to exercise the camera retry policy and device
//! lifecycle without hardware.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use contracts::{AcquisitionError, CaptureBackend, CaptureDevice, Frame};

/// One scripted read result
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// The read returns this frame
    Frame(Frame),
    /// The read returns nothing
    Empty,
}

/// Shared read/release counters
#[derive(Debug, Default)]
pub struct ScriptedCaptureStats {
    opens: AtomicUsize,
    reads: AtomicUsize,
    releases: AtomicUsize,
}

impl ScriptedCaptureStats {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
enum Script {
    Steps(VecDeque<ScriptStep>),
    Repeat(Frame),
}

/// Back-end whose devices follow a script
///
/// When the step list runs out every further read is empty.
#[derive(Clone)]
pub struct ScriptedCapture {
    script: Arc<Mutex<Script>>,
    stats: Arc<ScriptedCaptureStats>,
    read_delay: Duration,
    openable: bool,
}

impl ScriptedCapture {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self::with_script(Script::Steps(steps.into()))
    }

    /// Every read returns `frame`
    pub fn repeating(frame: Frame) -> Self {
        Self::with_script(Script::Repeat(frame))
    }

    /// `open` always fails
    pub fn unavailable() -> Self {
        Self {
            openable: false,
            ..Self::new(Vec::new())
        }
    }

    fn with_script(script: Script) -> Self {
        Self {
            script: Arc::new(Mutex::new(script)),
            stats: Arc::new(ScriptedCaptureStats::default()),
            read_delay: Duration::ZERO,
            openable: true,
        }
    }

    /// Block each read for `delay`, like a real frame period
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    pub fn stats(&self) -> Arc<ScriptedCaptureStats> {
        self.stats.clone()
    }
}

impl CaptureBackend for ScriptedCapture {
    fn name(&self) -> &str {
        "scripted"
    }

    fn open(&self, device_id: i32) -> Result<Box<dyn CaptureDevice>, AcquisitionError> {
        if !self.openable {
            return Err(AcquisitionError::device_unavailable(
                device_id,
                "scripted device refuses to open",
            ));
        }
        self.stats.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedDevice {
            script: self.script.clone(),
            stats: self.stats.clone(),
            read_delay: self.read_delay,
            released: false,
        }))
    }
}

struct ScriptedDevice {
    script: Arc<Mutex<Script>>,
    stats: Arc<ScriptedCaptureStats>,
    read_delay: Duration,
    released: bool,
}

impl CaptureDevice for ScriptedDevice {
    fn read(&mut self) -> Option<Frame> {
        if self.released {
            return None;
        }
        if !self.read_delay.is_zero() {
            thread::sleep(self.read_delay);
        }
        self.stats.reads.fetch_add(1, Ordering::SeqCst);

        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        match &mut *script {
            Script::Repeat(frame) => Some(frame.clone()),
            Script::Steps(steps) => match steps.pop_front() {
                Some(ScriptStep::Frame(frame)) => Some(frame),
                Some(ScriptStep::Empty) | None => None,
            },
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.stats.releases.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Resolution;

    #[test]
    fn test_script_then_empty() {
        let frame = Frame::black(Resolution::new(2, 2));
        let backend = ScriptedCapture::new(vec![ScriptStep::Frame(frame), ScriptStep::Empty]);
        let mut device = backend.open(0).unwrap();

        assert!(device.read().is_some());
        assert!(device.read().is_none());
        assert!(device.read().is_none());
        assert_eq!(backend.stats().reads(), 3);
    }

    #[test]
    fn test_unavailable() {
        let backend = ScriptedCapture::unavailable();
        assert!(backend.open(3).is_err());
        assert_eq!(backend.stats().opens(), 0);
    }
}
