//! # Contracts
//!
//! Shared interface contracts between the pipeline crates: readings, sensor
//! identifiers, the pipeline blueprint, the capture and display collaborator
//! traits and the error taxonomy.
//! Business crates depend on this crate only, never on each other in reverse.
//!
//! ## Time Model
//! - Every reading is stamped with a per-sensor sequence number (recency)
//! - Capture instants are monotonic (`std::time::Instant`), never wall-clock

mod blueprint;
mod capture;
mod display;
mod error;
mod reading;
mod sensor_id;

pub use blueprint::*;
pub use capture::{CaptureBackend, CaptureDevice};
pub use display::*;
pub use error::*;
pub use reading::*;
pub use sensor_id::SensorId;
