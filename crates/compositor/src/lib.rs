//! Compositor
//!
//! Consumes the sensor feeds once per display tick, keeps the last known
//! value of every sensor and produces the overlaid frame handed to the
//! display collaborator.

mod cache;
mod compositor;
pub mod display;
mod error;
mod overlay;

pub use cache::{CacheEntry, LastKnownCache};
pub use compositor::{
    Compositor, CompositorConfig, CompositorReport, FailureSource, StopReason,
};
pub use display::{LogDisplay, RecordingDisplay, SnapshotDisplay, SnapshotDisplayConfig, StopSignal};
pub use error::{CompositorError, Result};
pub use overlay::OverlayLayout;
