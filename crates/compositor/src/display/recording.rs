//! RecordingDisplay - keeps every composite in memory

use std::time::Duration;

use contracts::{CompositeFrame, ContractError, DisplaySurface};

/// In-memory display for tests and dry runs
///
/// Sleeps the tick delay when one is set. Requests a stop after a fixed
/// number of frames when configured to.
#[derive(Default)]
pub struct RecordingDisplay {
    frames: Vec<CompositeFrame>,
    tick_delay: Option<Duration>,
    stop_after: Option<usize>,
    fail_at: Option<(usize, ContractError)>,
    closes: usize,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop on the `n`th presented frame
    pub fn stop_after(n: usize) -> Self {
        Self {
            stop_after: Some(n),
            ..Self::default()
        }
    }

    pub fn with_tick_delay(mut self, delay: Duration) -> Self {
        self.tick_delay = Some(delay);
        self
    }

    /// Fail the `n`th present call with `error`
    pub fn fail_at(mut self, n: usize, error: ContractError) -> Self {
        self.fail_at = Some((n, error));
        self
    }

    pub fn frames(&self) -> &[CompositeFrame] {
        &self.frames
    }

    pub fn close_count(&self) -> usize {
        self.closes
    }
}

impl DisplaySurface for RecordingDisplay {
    fn name(&self) -> &str {
        "recording"
    }

    fn present(&mut self, frame: &CompositeFrame) -> Result<bool, ContractError> {
        let call = self.frames.len() + 1;
        if self.fail_at.as_ref().is_some_and(|(n, _)| *n == call) {
            if let Some((_, error)) = self.fail_at.take() {
                return Err(error);
            }
        }

        self.frames.push(frame.clone());
        if let Some(delay) = self.tick_delay {
            std::thread::sleep(delay);
        }
        Ok(self.stop_after.is_some_and(|n| self.frames.len() >= n))
    }

    fn close(&mut self) {
        self.closes += 1;
    }
}
