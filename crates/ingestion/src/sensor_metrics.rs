//! Per-sensor acquisition metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Acquisition counters shared between a loop and its controller
#[derive(Debug, Default)]
pub struct SensorMetrics {
    /// Readings returned by `Sensor::get()`
    pub readings: AtomicU64,

    /// Readings accepted by the freshness buffer
    pub published: AtomicU64,

    /// Readings discarded because the buffer was full
    pub dropped: AtomicU64,

    /// Fatal sensor failures (0 or 1)
    pub failures: AtomicU64,
}

impl SensorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reading, returning its sequence number (starts at 1)
    pub fn record_reading(&self) -> u64 {
        self.readings.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            readings: self.readings.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub readings: u64,
    pub published: u64,
    pub dropped: u64,
    pub failures: u64,
}

impl MetricsSnapshot {
    /// Fraction of readings discarded on a full buffer
    pub fn drop_rate(&self) -> f64 {
        if self.readings == 0 {
            0.0
        } else {
            self.dropped as f64 / self.readings as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_numbers() {
        let metrics = SensorMetrics::new();
        assert_eq!(metrics.record_reading(), 1);
        assert_eq!(metrics.record_reading(), 2);
        metrics.record_published();
        metrics.record_dropped();

        let snap = metrics.snapshot();
        assert_eq!(snap.readings, 2);
        assert!((snap.drop_rate() - 0.5).abs() < f64::EPSILON);
    }
}
