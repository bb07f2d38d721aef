//! CLI argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Sensor overlay - live sensor readings drawn over a camera feed
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sensor-overlay",
    author,
    version,
    about = "Overlay live sensor readings on a camera feed",
    long_about = "Polls every configured sensor on its own thread and redraws the most \n\
                  recent value of each on top of the latest camera frame, once per \n\
                  display tick, until Ctrl+C or the tick limit.\n\n\
                  Camera frames come from the built-in synthetic capture backend, \n\
                  which opens any CAM_ID; a missing camera device cannot occur here."
)]
pub struct Cli {
    /// Camera device id (the synthetic capture backend accepts any id)
    #[arg(value_name = "CAM_ID", allow_negative_numbers = true)]
    pub cam_id: i32,

    /// Camera frame height in pixels
    #[arg(value_name = "CAM_HEIGHT")]
    pub cam_height: u32,

    /// Camera frame width in pixels
    #[arg(value_name = "CAM_WIDTH")]
    pub cam_width: u32,

    /// Display tick delay in milliseconds
    #[arg(value_name = "UPDATE_DELAY")]
    pub update_delay: u64,

    /// Pipeline configuration file (TOML or JSON); the standard sensor set is used without one
    #[arg(short, long, env = "SENSOR_OVERLAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file (parent directory is created)
    #[arg(long, default_value = observability::DEFAULT_LOG_FILE, env = "SENSOR_OVERLAY_LOG_FILE")]
    pub log_file: PathBuf,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        env = "SENSOR_OVERLAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, env = "SENSOR_OVERLAY_VERBOSE")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Display back-end
    #[arg(long, value_enum, default_value = "log", env = "SENSOR_OVERLAY_DISPLAY")]
    pub display: DisplayKind,

    /// Output directory of the snapshot display
    #[arg(long, default_value = "./snapshots", env = "SENSOR_OVERLAY_SNAPSHOT_DIR")]
    pub snapshot_dir: PathBuf,

    /// Write one snapshot every N ticks
    #[arg(long, default_value = "10", env = "SENSOR_OVERLAY_SNAPSHOT_EVERY")]
    pub snapshot_every: u64,

    /// Stop after this many ticks (0 = until Ctrl+C)
    #[arg(long, default_value = "0", env = "SENSOR_OVERLAY_MAX_TICKS")]
    pub max_ticks: u64,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "SENSOR_OVERLAY_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate the configuration, print it and exit
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Default log level derived from -v / -q
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}

/// Display back-end
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayKind {
    /// Write the overlay text to the log every tick
    #[default]
    Log,
    /// Save every Nth composite as PNG
    Snapshot,
}
