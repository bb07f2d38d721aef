//! Numeric generator
//!
//! Synthetic sensor returning 1, 2, 3, ... with a fixed acquisition latency.

use std::thread;
use std::time::Duration;

/// Counter sensor
#[derive(Debug, Clone)]
pub struct NumericGenerator {
    delay: Duration,
    counter: u64,
}

impl NumericGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay, counter: 0 }
    }

    /// Sleep for the configured delay, then return the next counter value
    pub fn get(&mut self) -> u64 {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.counter += 1;
        self.counter
    }
}
