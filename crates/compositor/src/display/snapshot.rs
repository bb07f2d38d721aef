//! SnapshotDisplay - writes every Nth composite to disk

use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Duration;

use contracts::{CompositeFrame, ContractError, DisplaySurface};
use tracing::{debug, error, info, instrument};

use super::StopSignal;

/// Configuration for SnapshotDisplay
#[derive(Debug, Clone)]
pub struct SnapshotDisplayConfig {
    /// Output directory, created on construction
    pub base_path: PathBuf,
    /// Write one snapshot every `every` ticks
    pub every: u64,
    pub tick_delay: Duration,
}

impl Default for SnapshotDisplayConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("./snapshots"),
            every: 10,
            tick_delay: Duration::from_millis(100),
        }
    }
}

/// Display that persists composites as `{tick}.png` plus `{tick}.json`
/// holding the overlay text lines
pub struct SnapshotDisplay {
    name: String,
    config: SnapshotDisplayConfig,
    stop: StopSignal,
    written: u64,
}

impl SnapshotDisplay {
    pub fn new(config: SnapshotDisplayConfig, stop: StopSignal) -> std::io::Result<Self> {
        fs::create_dir_all(&config.base_path)?;

        Ok(Self {
            name: "snapshot".to_string(),
            config,
            stop,
            written: 0,
        })
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    fn write_snapshot(&self, frame: &CompositeFrame) -> std::io::Result<()> {
        let image_path = self.config.base_path.join(format!("{}.png", frame.tick));
        image::save_buffer(
            image_path,
            &frame.image.data,
            frame.image.width,
            frame.image.height,
            image::ColorType::Rgb8,
        )
        .map_err(std::io::Error::other)?;

        let text_path = self.config.base_path.join(format!("{}.json", frame.tick));
        let file = File::create(text_path)?;
        serde_json::to_writer(file, &frame.lines)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(())
    }
}

impl DisplaySurface for SnapshotDisplay {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "snapshot_present", skip(self, frame), fields(tick = frame.tick))]
    fn present(&mut self, frame: &CompositeFrame) -> Result<bool, ContractError> {
        if frame.tick % self.config.every.max(1) == 0 {
            self.write_snapshot(frame).map_err(|e| {
                error!(display = %self.name, tick = frame.tick, error = %e, "snapshot write failed");
                ContractError::present(&self.name, e.to_string())
            })?;
            self.written += 1;
            debug!(tick = frame.tick, "snapshot written");
        }

        Ok(self.stop.wait(self.config.tick_delay))
    }

    fn close(&mut self) {
        info!(
            display = %self.name,
            written = self.written,
            path = %self.config.base_path.display(),
            "display closed"
        );
    }
}
