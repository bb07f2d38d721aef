//! LogDisplay - writes each composite's overlay text to the log

use std::time::Duration;

use contracts::{CompositeFrame, ContractError, DisplaySurface};
use tracing::{debug, info};

use super::StopSignal;

/// Headless display that logs overlay text
pub struct LogDisplay {
    name: String,
    tick_delay: Duration,
    stop: StopSignal,
    /// Log at info level every N ticks, debug otherwise
    info_every: u64,
    presented: u64,
}

impl LogDisplay {
    pub fn new(tick_delay: Duration, stop: StopSignal) -> Self {
        Self {
            name: "log".to_string(),
            tick_delay,
            stop,
            info_every: 10,
            presented: 0,
        }
    }

    pub fn with_info_every(mut self, n: u64) -> Self {
        self.info_every = n.max(1);
        self
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl DisplaySurface for LogDisplay {
    fn name(&self) -> &str {
        &self.name
    }

    fn present(&mut self, frame: &CompositeFrame) -> Result<bool, ContractError> {
        self.presented += 1;
        let text = frame
            .lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        if frame.tick % self.info_every == 0 {
            info!(tick = frame.tick, overlay = %text, "frame");
        } else {
            debug!(tick = frame.tick, overlay = %text, "frame");
        }

        Ok(self.stop.wait(self.tick_delay))
    }

    fn close(&mut self) {
        info!(display = %self.name, presented = self.presented, "display closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::OverlayLayout;
    use contracts::{Frame, Reading, Resolution};
    use std::time::Instant;

    fn composite(tick: u64) -> CompositeFrame {
        OverlayLayout::default().compose(
            tick,
            &Frame::black(Resolution::new(64, 48)),
            &[Reading::Counter(tick)],
        )
    }

    #[test]
    fn test_present_waits_tick_delay() {
        let mut display = LogDisplay::new(Duration::from_millis(20), StopSignal::new());
        let start = Instant::now();
        assert!(!display.present(&composite(1)).unwrap());
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(display.presented(), 1);
    }

    #[test]
    fn test_info_every_zero_is_clamped() {
        let mut display =
            LogDisplay::new(Duration::ZERO, StopSignal::new()).with_info_every(0);
        for tick in 1..=3 {
            assert!(!display.present(&composite(tick)).unwrap());
        }
        assert_eq!(display.presented(), 3);
    }

    #[test]
    fn test_stop_signal_requests_stop() {
        let stop = StopSignal::new();
        let mut display = LogDisplay::new(Duration::from_secs(10), stop.clone());
        stop.trigger();

        let start = Instant::now();
        assert!(display.present(&composite(1)).unwrap());
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
