//! PipelineBlueprint - Config Loader output
//!
//! Describes the full pipeline: which sensors to run, how the compositor
//! ticks and how the composite is displayed.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{Resolution, SensorId};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete pipeline blueprint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PipelineBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Sensors, in overlay order
    #[validate(length(min = 1, message = "at least one sensor is required"))]
    pub sensors: Vec<SensorConfig>,

    /// Compositor settings
    #[serde(default)]
    #[validate(nested)]
    pub display: DisplayConfig,

    /// Acquisition settings
    #[serde(default)]
    #[validate(nested)]
    pub acquisition: AcquisitionConfig,
}

/// Sensor definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Unique sensor ID
    pub id: SensorId,

    /// Sensor kind and its parameters
    #[serde(flatten)]
    pub kind: SensorKind,
}

/// Sensor kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sensor_type", rename_all = "snake_case")]
pub enum SensorKind {
    /// Counter incremented after a fixed delay
    Numeric {
        /// Delay per reading in milliseconds
        delay_ms: u64,
    },

    /// Capture device resized to a fixed resolution
    Camera {
        /// Capture device ID
        device_id: i32,
        /// Output resolution
        resolution: Resolution,
    },
}

impl SensorConfig {
    pub fn numeric(id: impl Into<SensorId>, delay: Duration) -> Self {
        Self {
            id: id.into(),
            kind: SensorKind::Numeric {
                delay_ms: delay.as_millis() as u64,
            },
        }
    }

    pub fn camera(id: impl Into<SensorId>, device_id: i32, resolution: Resolution) -> Self {
        Self {
            id: id.into(),
            kind: SensorKind::Camera {
                device_id,
                resolution,
            },
        }
    }

    pub fn is_camera(&self) -> bool {
        matches!(self.kind, SensorKind::Camera { .. })
    }
}

/// Compositor and display settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DisplayConfig {
    /// Tick delay in milliseconds (bounded wait inside `present`)
    #[serde(default = "default_tick_delay_ms")]
    #[validate(range(min = 1, message = "tick delay must be at least 1ms"))]
    pub tick_delay_ms: u64,

    /// Resolution of the blank canvas when no camera is configured
    #[serde(default = "default_canvas")]
    #[validate(nested)]
    pub canvas: Resolution,

    /// Stop after this many ticks (None = until stop requested)
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

fn default_tick_delay_ms() -> u64 {
    100
}

fn default_canvas() -> Resolution {
    Resolution::new(640, 480)
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tick_delay_ms: default_tick_delay_ms(),
            canvas: default_canvas(),
            max_ticks: None,
        }
    }
}

impl DisplayConfig {
    pub fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.tick_delay_ms)
    }
}

/// Acquisition settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AcquisitionConfig {
    /// Maximum `try_take` calls per buffer per tick
    #[validate(range(min = 1, message = "drain cap must be at least 1"))]
    pub max_drain_per_tick: usize,

    /// Capture reads per `get()` before the camera gives up
    #[validate(range(min = 1, message = "read attempts must be at least 1"))]
    pub camera_read_attempts: u32,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            max_drain_per_tick: 8,
            camera_read_attempts: 3,
        }
    }
}

impl PipelineBlueprint {
    /// Three counters (10ms, 100ms, 1s) plus one camera
    pub fn standard(device_id: i32, resolution: Resolution, tick_delay_ms: u64) -> Self {
        Self {
            version: ConfigVersion::V1,
            sensors: vec![
                SensorConfig::numeric("counter_fast", Duration::from_millis(10)),
                SensorConfig::numeric("counter_medium", Duration::from_millis(100)),
                SensorConfig::numeric("counter_slow", Duration::from_secs(1)),
                SensorConfig::camera("camera", device_id, resolution),
            ],
            display: DisplayConfig {
                tick_delay_ms,
                canvas: resolution,
                max_ticks: None,
            },
            acquisition: AcquisitionConfig::default(),
        }
    }

    /// The first camera, if any
    pub fn camera(&self) -> Option<&SensorConfig> {
        self.sensors.iter().find(|s| s.is_camera())
    }

    /// Point the camera at another device and resolution
    pub fn override_camera(&mut self, device_id: i32, resolution: Resolution) {
        for sensor in &mut self.sensors {
            if let SensorKind::Camera {
                device_id: id,
                resolution: res,
            } = &mut sensor.kind
            {
                *id = device_id;
                *res = resolution;
            }
        }
        self.display.canvas = resolution;
    }
}
