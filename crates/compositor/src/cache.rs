//! Last-known cache
//!
//! Most recent reading per sensor, held until a newer one supersedes it.

use std::time::Instant;

use contracts::{Frame, Reading, Sample, SensorId};
use tracing::trace;

/// Cached state of one sensor
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub sensor_id: SensorId,
    pub is_camera: bool,
    /// Sequence of the cached sample, 0 while still holding the zero value
    pub seq: u64,
    pub reading: Reading,
    /// When the cached reading was captured
    pub captured_at: Option<Instant>,
    /// Number of accepted updates
    pub updates: u64,
}

/// One slot per sensor, in feed order
#[derive(Debug, Clone, Default)]
pub struct LastKnownCache {
    entries: Vec<CacheEntry>,
}

impl LastKnownCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sensor holding its zero value, returns its slot index
    pub fn register(&mut self, sensor_id: SensorId, zero: Reading, is_camera: bool) -> usize {
        self.entries.push(CacheEntry {
            sensor_id,
            is_camera,
            seq: 0,
            reading: zero,
            captured_at: None,
            updates: 0,
        });
        self.entries.len() - 1
    }

    /// Replace the slot's reading if `sample` is strictly newer
    ///
    /// Returns whether the cache changed.
    pub fn update(&mut self, index: usize, sample: Sample) -> bool {
        let Some(entry) = self.entries.get_mut(index) else {
            return false;
        };
        if sample.seq <= entry.seq {
            trace!(sensor_id = %entry.sensor_id, seq = sample.seq, cached = entry.seq, "stale sample ignored");
            return false;
        }
        entry.seq = sample.seq;
        entry.reading = sample.reading;
        entry.captured_at = Some(sample.captured_at);
        entry.updates += 1;
        true
    }

    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    pub fn get(&self, sensor_id: &str) -> Option<&CacheEntry> {
        self.entries.iter().find(|e| e.sensor_id == sensor_id)
    }

    /// Latest frame of the first camera sensor
    pub fn camera_frame(&self) -> Option<&Frame> {
        self.entries
            .iter()
            .find(|e| e.is_camera)
            .and_then(|e| e.reading.as_frame())
    }

    /// Entries shown in the overlay text (every non-camera sensor)
    pub fn overlay_entries(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.iter().filter(|e| !e.is_camera)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
