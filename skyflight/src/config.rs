use celestial::SolarConfig;
use chase_camera::CameraConfig;
use craft::{ControlConfig, CraftConfig};
use ron::{
    from_str,
    ser::{PrettyConfig, to_string_pretty},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigErrors {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse RON config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to write RON config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("frame delta time must be positive and finite, got {0}")]
    InvalidDeltaTime(f64),
    #[error("{field} must be {requirement}, got {value}")]
    InvalidValue {
        field: &'static str,
        requirement: &'static str,
        value: f64,
    },
    #[error("{min_field} ({min}) must not exceed {max_field} ({max})")]
    InvalidRange {
        min_field: &'static str,
        max_field: &'static str,
        min: f64,
        max: f64,
    },
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigErrors> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigErrors::InvalidValue {
            field,
            requirement: "finite",
            value,
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigErrors> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigErrors::InvalidValue {
            field,
            requirement: "finite and non-negative",
            value,
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigErrors> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigErrors::InvalidValue {
            field,
            requirement: "finite and positive",
            value,
        })
    }
}

fn ordered(
    (min_field, min): (&'static str, f64),
    (max_field, max): (&'static str, f64),
) -> Result<(), ConfigErrors> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigErrors::InvalidRange {
            min_field,
            max_field,
            min,
            max,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FrameConfig {
    /// Seconds simulated per tick.
    pub dt: f64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { dt: 1.0 / 60.0 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub path: String,
    pub scale: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "/Spaceship.glb".to_string(),
            scale: 0.3,
        }
    }
}

/// Everything tunable about a session. Every field has a default, so a RON
/// file only needs to name what it changes.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SkyflightConfig {
    pub craft: CraftConfig,
    pub controls: ControlConfig,
    pub camera: CameraConfig,
    pub solar: SolarConfig,
    pub frame: FrameConfig,
    pub model: ModelConfig,
    /// Fixes the random orbit phases.
    pub seed: Option<u64>,
}

impl SkyflightConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigErrors> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    pub fn from_ron(contents: &str) -> Result<Self, ConfigErrors> {
        let config: Self = from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron(&self) -> Result<String, ConfigErrors> {
        Ok(to_string_pretty(self, PrettyConfig::new())?)
    }

    pub fn validate(&self) -> Result<(), ConfigErrors> {
        if !(self.frame.dt > 0.0) || !self.frame.dt.is_finite() {
            return Err(ConfigErrors::InvalidDeltaTime(self.frame.dt));
        }

        let craft = &self.craft;
        for c in craft.initial_position.iter() {
            finite("craft.initial_position", *c)?;
        }
        positive("craft.mass", craft.mass)?;
        non_negative("craft.max_thrust", craft.max_thrust)?;
        non_negative("craft.friction", craft.friction)?;
        finite("craft.rotation_speed", craft.rotation_speed)?;
        non_negative("craft.max_angle_per_frame", craft.max_angle_per_frame)?;
        finite("craft.min_orient_speed", craft.min_orient_speed)?;
        finite("craft.heading_smoothing", craft.heading_smoothing)?;

        non_negative("controls.thrust_increment", self.controls.thrust_increment)?;

        let camera = &self.camera;
        finite("camera.follow_distance", camera.follow_distance)?;
        finite("camera.follow_height", camera.follow_height)?;
        positive("camera.height_ratio", camera.height_ratio)?;
        finite("camera.yaw", camera.yaw)?;
        finite("camera.pitch", camera.pitch)?;
        finite("camera.sensitivity", camera.sensitivity)?;
        finite("camera.zoom_speed", camera.zoom_speed)?;
        non_negative("camera.pitch_limit", camera.pitch_limit)?;
        finite("camera.min_distance", camera.min_distance)?;
        finite("camera.max_distance", camera.max_distance)?;
        finite("camera.min_height", camera.min_height)?;
        finite("camera.max_height", camera.max_height)?;
        ordered(
            ("camera.min_distance", camera.min_distance),
            ("camera.max_distance", camera.max_distance),
        )?;
        ordered(
            ("camera.min_height", camera.min_height),
            ("camera.max_height", camera.max_height),
        )?;

        let solar = &self.solar;
        positive("solar.sun.light_distance", solar.sun.light_distance)?;
        non_negative("solar.sun.light_intensity", solar.sun.light_intensity)?;
        positive("solar.sun.base_size", solar.sun.base_size)?;
        finite("solar.sun.self_rotation_rate", solar.sun.self_rotation_rate)?;
        non_negative("solar.self_rotation_speed", solar.self_rotation_speed)?;
        non_negative("solar.orbit_speed", solar.orbit_speed)?;
        non_negative("solar.size_ratio", solar.size_ratio)?;
        non_negative("solar.distance_ratio", solar.distance_ratio)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = SkyflightConfig::from_ron("(seed: Some(3), craft: (max_thrust: 800.0))").unwrap();
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.craft.max_thrust, 800.0);
        assert_eq!(config.craft.friction, 0.5);
        assert_eq!(config.camera, CameraConfig::default());
        assert_eq!(config.solar.bodies.len(), 9);
    }

    #[test]
    fn test_dumped_defaults_parse_back() {
        let ron = SkyflightConfig::default().to_ron().unwrap();
        let config = SkyflightConfig::from_ron(&ron).unwrap();
        assert_eq!(config, SkyflightConfig::default());
    }

    #[test]
    fn test_bad_input() {
        assert!(matches!(
            SkyflightConfig::from_ron("(frame: (dt: 0.0))"),
            Err(ConfigErrors::InvalidDeltaTime(_))
        ));
        assert!(matches!(
            SkyflightConfig::from_ron("(craft: oops)"),
            Err(ConfigErrors::Parse(_))
        ));
        assert!(matches!(
            SkyflightConfig::from_file(Path::new("/nonexistent/skyflight.ron")),
            Err(ConfigErrors::Io(_))
        ));
    }

    #[test]
    fn test_unusable_craft_rejected() {
        assert!(matches!(
            SkyflightConfig::from_ron("(craft: (friction: -0.5))"),
            Err(ConfigErrors::InvalidValue { field: "craft.friction", .. })
        ));
        assert!(matches!(
            SkyflightConfig::from_ron("(craft: (mass: 0.0))"),
            Err(ConfigErrors::InvalidValue { field: "craft.mass", .. })
        ));
        assert!(matches!(
            SkyflightConfig::from_ron("(craft: (max_thrust: -1.0))"),
            Err(ConfigErrors::InvalidValue { field: "craft.max_thrust", .. })
        ));
    }

    #[test]
    fn test_unusable_camera_rejected() {
        assert!(matches!(
            SkyflightConfig::from_ron("(camera: (pitch_limit: -1.0))"),
            Err(ConfigErrors::InvalidValue { field: "camera.pitch_limit", .. })
        ));
        assert!(matches!(
            SkyflightConfig::from_ron("(camera: (min_distance: 30.0, max_distance: 10.0))"),
            Err(ConfigErrors::InvalidRange { min_field: "camera.min_distance", .. })
        ));
        assert!(matches!(
            SkyflightConfig::from_ron("(camera: (min_height: 5.0, max_height: 1.0))"),
            Err(ConfigErrors::InvalidRange { min_field: "camera.min_height", .. })
        ));
        assert!(matches!(
            SkyflightConfig::from_ron("(camera: (height_ratio: 0.0))"),
            Err(ConfigErrors::InvalidValue { field: "camera.height_ratio", .. })
        ));
    }

    #[test]
    fn test_unusable_solar_and_controls_rejected() {
        assert!(matches!(
            SkyflightConfig::from_ron("(solar: (sun: (light_distance: 0.0)))"),
            Err(ConfigErrors::InvalidValue { field: "solar.sun.light_distance", .. })
        ));
        let mut config = SkyflightConfig::default();
        config.controls.thrust_increment = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigErrors::InvalidValue { field: "controls.thrust_increment", .. })
        ));
    }
}
