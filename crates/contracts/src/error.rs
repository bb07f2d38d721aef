//! Layered error definitions
//!
//! Categorized by source: config / acquisition / display

use thiserror::Error;

/// Configuration and collaborator errors
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Display Errors =====
    /// The display surface refused a composite
    #[error("display '{display}' present error: {message}")]
    Present { display: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create display present error
    pub fn present(display: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Present {
            display: display.into(),
            message: message.into(),
        }
    }
}

/// Sensor acquisition errors
///
/// `TransientReadFailure` is recovered inside `Sensor::get()`; it only
/// escapes when a caller inspects individual read attempts.
/// `DeviceUnavailable` is fatal to the owning acquisition loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquisitionError {
    /// Capture device cannot be opened or sustained
    #[error("device {device_id} unavailable: {reason}")]
    DeviceUnavailable { device_id: i32, reason: String },

    /// A single capture read produced no frame
    #[error("device {device_id} read failed (attempt {attempt})")]
    TransientReadFailure { device_id: i32, attempt: u32 },
}

impl AcquisitionError {
    pub fn device_unavailable(device_id: i32, reason: impl Into<String>) -> Self {
        Self::DeviceUnavailable {
            device_id,
            reason: reason.into(),
        }
    }

    /// Fatal errors terminate the acquisition loop
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DeviceUnavailable { .. })
    }
}
