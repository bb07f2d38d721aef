//! Capture collaborator traits
//!
//! Video decoding lives outside the pipeline. The camera sensor only needs a
//! way to open a device, pull one frame at a time and release the device.

use crate::{AcquisitionError, Frame};

/// An opened capture device
///
/// Owned by exactly one camera sensor. `release` is called exactly once by
/// the owner; implementations should tolerate being dropped afterwards.
pub trait CaptureDevice: Send {
    /// Read the next frame, `None` when the device produced nothing
    fn read(&mut self) -> Option<Frame>;

    /// Release the OS-level handle
    fn release(&mut self);
}

/// Factory for capture devices
pub trait CaptureBackend: Send + Sync {
    /// Backend name (for logs)
    fn name(&self) -> &str;

    /// Open the device with the given id
    fn open(&self, device_id: i32) -> Result<Box<dyn CaptureDevice>, AcquisitionError>;
}
