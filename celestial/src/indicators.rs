use color::Color;
use nalgebra::Vector3;
use rotations::WORLD_UP;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct IndicatorConfig {
    pub line_height: f64,
    pub cap_radius: f64,
    pub label_offset: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            line_height: 50000.0,
            cap_radius: 50.0,
            label_offset: 300.0,
        }
    }
}

/// A vertical marker over a body: a line rising from the body's center,
/// a sphere capping the line and a name label.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub name: String,
    pub color: Color,
    /// Base of the line, kept on the body's center.
    pub position: Vector3<f64>,
    pub line_height: f64,
    pub cap_radius: f64,
    pub label_offset: f64,
}

impl Indicator {
    pub fn new(name: &str, color: Color, position: Vector3<f64>, config: &IndicatorConfig) -> Self {
        Self {
            name: name.to_string(),
            color,
            position,
            line_height: config.line_height,
            cap_radius: config.cap_radius,
            label_offset: config.label_offset,
        }
    }

    pub fn cap_position(&self) -> Vector3<f64> {
        self.position + WORLD_UP * self.line_height
    }

    pub fn label_position(&self) -> Vector3<f64> {
        self.position + WORLD_UP * self.label_offset
    }
}
