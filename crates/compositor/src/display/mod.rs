//! Display back-ends
//!
//! Headless `DisplaySurface` implementations. Both honour the tick delay and
//! a shared stop signal standing in for the quit key.

mod log;
mod recording;
mod snapshot;

pub use log::LogDisplay;
pub use recording::RecordingDisplay;
pub use snapshot::{SnapshotDisplay, SnapshotDisplayConfig};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cloneable quit flag shared between a display and whoever requests a stop
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// Granularity of `wait`
    pub const POLL_INTERVAL: Duration = Duration::from_millis(5);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Wait up to `timeout`, returning early once triggered
    ///
    /// The flag is polled every `POLL_INTERVAL`, so a trigger is noticed up
    /// to 5 ms late. Returns whether the signal was triggered.
    pub fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_triggered() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            std::thread::sleep(Self::POLL_INTERVAL.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_times_out() {
        let signal = StopSignal::new();
        let start = Instant::now();
        assert!(!signal.wait(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_wait_returns_early_when_triggered() {
        let signal = StopSignal::new();
        let remote = signal.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            remote.trigger();
        });

        let start = Instant::now();
        assert!(signal.wait(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_notices_trigger_within_poll_interval() {
        let signal = StopSignal::new();
        signal.trigger();

        let start = Instant::now();
        assert!(signal.wait(Duration::from_secs(5)));
        assert!(start.elapsed() < StopSignal::POLL_INTERVAL * 20);
    }
}
