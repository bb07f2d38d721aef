//! Configuration parsing
//!
//! TOML (primary) and JSON.

use contracts::{ContractError, PipelineBlueprint};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn parse(content: &str, format: ConfigFormat) -> Result<PipelineBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| ContractError::ConfigParse {
            message: format!("TOML parse error: {e}"),
            source: Some(Box::new(e)),
        }),
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
                message: format!("JSON parse error: {e}"),
                source: Some(Box::new(e)),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SensorKind;

    #[test]
    fn test_parse_toml_sensors() {
        let content = r#"
[[sensors]]
id = "counter"
sensor_type = "numeric"
delay_ms = 10

[[sensors]]
id = "camera"
sensor_type = "camera"
device_id = 0
resolution = { width = 320, height = 240 }

[display]
tick_delay_ms = 50
"#;
        let bp = parse(content, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.sensors.len(), 2);
        assert_eq!(bp.sensors[0].kind, SensorKind::Numeric { delay_ms: 10 });
        assert_eq!(bp.display.tick_delay_ms, 50);
        assert_eq!(bp.acquisition.max_drain_per_tick, 8);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "sensors": [{ "id": "n", "sensor_type": "numeric", "delay_ms": 5 }]
        }"#;
        let bp = parse(content, ConfigFormat::Json).unwrap();
        assert_eq!(bp.display.tick_delay_ms, 100);
        assert!(bp.camera().is_none());
    }

    #[test]
    fn test_unknown_sensor_type() {
        let content = r#"
[[sensors]]
id = "lidar"
sensor_type = "lidar"
"#;
        let err = parse(content, ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
