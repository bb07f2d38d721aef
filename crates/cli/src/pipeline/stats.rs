//! Pipeline statistics.

use std::time::Duration;

use compositor::{CompositorReport, StopReason};
use contracts::SensorId;
use ingestion::{MetricsSnapshot, ShutdownReport};
use observability::MetricsSummary;

/// Statistics from a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Ticks rendered
    pub ticks: u64,

    /// Why the compositor stopped
    pub stop_reason: StopReason,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Final acquisition counters per sensor
    pub sensors: Vec<(SensorId, MetricsSnapshot)>,

    /// Last value shown per sensor
    pub last_values: Vec<(SensorId, String)>,

    /// Tick time and reading age statistics
    pub freshness: MetricsSummary,
}

impl PipelineStats {
    pub fn new(report: CompositorReport, shutdown: ShutdownReport, duration: Duration) -> Self {
        let last_values = report
            .cache
            .entries()
            .iter()
            .map(|e| (e.sensor_id.clone(), e.reading.to_string()))
            .collect();

        Self {
            ticks: report.ticks,
            stop_reason: report.stop_reason,
            duration,
            sensors: shutdown.sensors,
            last_values,
            freshness: report.freshness,
        }
    }

    /// Ticks per second
    pub fn tps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.ticks as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn total_published(&self) -> u64 {
        self.sensors.iter().map(|(_, s)| s.published).sum()
    }

    pub fn total_dropped(&self) -> u64 {
        self.sensors.iter().map(|(_, s)| s.dropped).sum()
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Pipeline Statistics ===\n");

        println!("Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Ticks: {}", self.ticks);
        println!("   ├─ Ticks/s: {:.2}", self.tps());
        println!("   ├─ Stopped by: {:?}", self.stop_reason);
        println!("   ├─ Readings published: {}", self.total_published());
        println!("   └─ Readings dropped (buffer full): {}", self.total_dropped());

        println!("\nSensors");
        for (sensor_id, snapshot) in &self.sensors {
            let last = self
                .last_values
                .iter()
                .find(|(id, _)| id == sensor_id)
                .map(|(_, v)| v.as_str())
                .unwrap_or("-");
            println!(
                "   ├─ {}: published={} dropped={} ({:.1}%) last={}",
                sensor_id,
                snapshot.published,
                snapshot.dropped,
                snapshot.drop_rate() * 100.0,
                last
            );
        }

        println!("\n{}", self.freshness);
    }
}
