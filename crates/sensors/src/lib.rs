//! # Sensors
//!
//! Sensor capabilities and the capture back-ends that feed them.
//!
//! Responsibilities:
//! - Closed `Sensor` enum over numeric generators and camera sources
//! - Camera device lifecycle (open, warm-up read, bounded retries, release)
//! - Build the sensor set from a `PipelineBlueprint`, releasing partially
//!   opened devices when one fails
//! - Synthetic and scripted capture back-ends for running without hardware

pub mod camera;
pub mod factory;
pub mod numeric;
pub mod scripted;
pub mod sensor;
pub mod synthetic;

pub use camera::CameraSource;
pub use contracts::{AcquisitionError, CaptureBackend, CaptureDevice, Reading};
pub use factory::SensorFactory;
pub use numeric::NumericGenerator;
pub use scripted::{ScriptStep, ScriptedCapture, ScriptedCaptureStats};
pub use sensor::Sensor;
pub use synthetic::SyntheticCapture;
