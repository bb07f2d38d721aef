//! # Ingestion
//!
//! Sensor acquisition module.
//!
//! Responsibilities:
//! - One background acquisition loop per sensor (two-phase: construct, start)
//! - Capacity-1 freshness buffer per sensor, a full slot is never displaced
//! - Lifecycle controller: start every loop, stop and join them as a unit
//! - Fatal sensor failures surfaced to the controller
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::LifecycleController;
//!
//! let sensors = factory.build_all(&blueprint)?;
//! let (mut controller, feeds) = LifecycleController::start(sensors)?;
//!
//! for feed in &feeds {
//!     if let Some(sample) = feed.rx.drain_latest(8) {
//!         // update the last-known cache
//!     }
//! }
//!
//! controller.stop_all()?;
//! ```

mod acquisition;
mod error;
mod freshness;
mod lifecycle;
mod sensor_metrics;

// Re-exports
pub use acquisition::{AcquisitionLoop, LoopState, SensorFailure};
pub use contracts::Sample;
pub use error::{IngestionError, Result};
pub use freshness::{freshness_buffer, FreshnessReceiver, FreshnessSender};
pub use lifecycle::{LifecycleController, SensorFeed, ShutdownReport};
pub use sensor_metrics::{MetricsSnapshot, SensorMetrics};
