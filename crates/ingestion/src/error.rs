//! Ingestion error types

use contracts::{AcquisitionError, SensorId};
use thiserror::Error;

/// Ingestion error
#[derive(Debug, Clone, Error)]
pub enum IngestionError {
    /// The sensor failed fatally; its acquisition loop has exited
    #[error("sensor {sensor_id} failed: {source}")]
    Acquisition {
        /// Sensor ID
        sensor_id: SensorId,
        #[source]
        source: AcquisitionError,
    },

    /// `start` called on a loop that already left the idle state
    #[error("acquisition loop for {sensor_id} already started")]
    AlreadyStarted {
        /// Sensor ID
        sensor_id: SensorId,
    },

    /// The OS refused to spawn the worker thread
    #[error("failed to spawn acquisition thread for {sensor_id}: {message}")]
    Spawn {
        /// Sensor ID
        sensor_id: SensorId,
        /// OS error message
        message: String,
    },

    /// The worker thread panicked
    #[error("acquisition thread for {sensor_id} panicked")]
    WorkerPanicked {
        /// Sensor ID
        sensor_id: SensorId,
    },
}

impl IngestionError {
    pub fn sensor_id(&self) -> &SensorId {
        match self {
            Self::Acquisition { sensor_id, .. }
            | Self::AlreadyStarted { sensor_id }
            | Self::Spawn { sensor_id, .. }
            | Self::WorkerPanicked { sensor_id } => sensor_id,
        }
    }
}

/// Ingestion Result alias
pub type Result<T> = std::result::Result<T, IngestionError>;
