//! Configuration validation
//!
//! Rules:
//! - field ranges declared on the blueprint (`validator` derive)
//! - sensor_id unique
//! - at most one camera (the camera frame is the composite base)
//! - camera resolution non-zero

use std::collections::HashSet;

use contracts::{ContractError, PipelineBlueprint, SensorKind};
use validator::Validate;

/// Validate a blueprint
///
/// Returns the first error encountered.
pub fn validate(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_sensor_ids(blueprint)?;
    validate_cameras(blueprint)?;
    Ok(())
}

fn validate_fields(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    blueprint
        .validate()
        .map_err(|e| ContractError::config_validation("blueprint", e.to_string()))
}

fn validate_sensor_ids(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for sensor in &blueprint.sensors {
        if sensor.id.is_empty() {
            return Err(ContractError::config_validation(
                "sensors[].id",
                "sensor id cannot be empty",
            ));
        }
        if !seen.insert(sensor.id.as_str()) {
            return Err(ContractError::config_validation(
                format!("sensors[id={}]", sensor.id),
                "duplicate sensor_id",
            ));
        }
    }
    Ok(())
}

fn validate_cameras(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let mut cameras = 0usize;
    for sensor in &blueprint.sensors {
        if let SensorKind::Camera { resolution, .. } = &sensor.kind {
            cameras += 1;
            if resolution.width == 0 || resolution.height == 0 {
                return Err(ContractError::config_validation(
                    format!("sensors[{}].resolution", sensor.id),
                    format!("resolution must be non-zero, got {resolution}"),
                ));
            }
        }
    }
    if cameras > 1 {
        return Err(ContractError::config_validation(
            "sensors",
            format!("at most one camera sensor is supported, got {cameras}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Resolution, SensorConfig};
    use std::time::Duration;

    fn blueprint() -> PipelineBlueprint {
        PipelineBlueprint::standard(0, Resolution::new(640, 480), 100)
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&blueprint()).is_ok());
    }

    #[test]
    fn test_duplicate_sensor_id() {
        let mut bp = blueprint();
        bp.sensors
            .push(SensorConfig::numeric("counter_fast", Duration::from_millis(5)));
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("duplicate sensor_id"), "got: {err}");
    }

    #[test]
    fn test_second_camera_rejected() {
        let mut bp = blueprint();
        bp.sensors
            .push(SensorConfig::camera("rear", 1, Resolution::new(320, 240)));
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("at most one camera"), "got: {err}");
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let mut bp = blueprint();
        bp.override_camera(0, Resolution::new(0, 480));
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_empty_sensor_list() {
        let mut bp = blueprint();
        bp.sensors.clear();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("at least one sensor"), "got: {err}");
    }

    #[test]
    fn test_zero_drain_cap() {
        let mut bp = blueprint();
        bp.acquisition.max_drain_per_tick = 0;
        assert!(validate(&bp).is_err());
    }
}
