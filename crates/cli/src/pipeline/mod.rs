//! Pipeline orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{DisplaySettings, Pipeline, PipelineConfig};
pub use stats::PipelineStats;
