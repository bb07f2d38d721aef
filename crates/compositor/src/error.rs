//! Compositor error types

use contracts::{AcquisitionError, ContractError, SensorId};
use thiserror::Error;

/// Compositor error
#[derive(Debug, Error)]
pub enum CompositorError {
    /// The display collaborator failed
    #[error("display error: {0}")]
    Display(#[from] ContractError),

    /// A sensor failed fatally, the composite can no longer be trusted
    #[error("sensor {sensor_id} failed: {source}")]
    SensorFailed {
        sensor_id: SensorId,
        #[source]
        source: AcquisitionError,
    },
}

/// Result alias
pub type Result<T> = std::result::Result<T, CompositorError>;
