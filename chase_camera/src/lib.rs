//! Third-person camera that trails the craft.
//!
//! The view direction comes from a yaw/pitch pair driven by pointer drags and
//! the trailing offset from a follow distance/height pair driven by the wheel.

use craft::Craft;
use nalgebra::Vector3;
use rotations::prelude::*;
use rotations::try_normalize;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub follow_distance: f64,
    pub follow_height: f64,
    /// distance / height, used to derive the height when zooming
    pub height_ratio: f64,
    pub yaw: f64,
    pub pitch: f64,
    /// Radians per pixel of pointer drag.
    pub sensitivity: f64,
    /// Distance change per unit of wheel delta.
    pub zoom_speed: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub min_height: f64,
    pub max_height: f64,
    pub pitch_limit: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            follow_distance: 30.0,
            follow_height: 2.0,
            height_ratio: 30.0 / 2.0,
            yaw: PI,
            pitch: 0.0,
            sensitivity: 0.003,
            zoom_speed: 0.05,
            min_distance: 5.0,
            max_distance: 20.0,
            min_height: 2.0,
            max_height: 20.0,
            pitch_limit: 1.48,
        }
    }
}

/// Where the camera is and which way it looks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vector3<f64>,
    /// Local −Z of this orientation is `forward`.
    pub orientation: UnitQuaternion,
    pub forward: Vector3<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PointerDrag {
    active: bool,
    last_x: f64,
    last_y: f64,
}

#[derive(Debug, Clone)]
pub struct ChaseCamera {
    yaw: f64,
    pitch: f64,
    follow_distance: f64,
    follow_height: f64,
    height_ratio: f64,
    sensitivity: f64,
    zoom_speed: f64,
    distance_range: (f64, f64),
    height_range: (f64, f64),
    pitch_limit: f64,
    drag: PointerDrag,
    pose: CameraPose,
}

impl ChaseCamera {
    pub fn new(config: &CameraConfig) -> Self {
        // clamp bounds must be finite and ordered
        let defaults = CameraConfig::default();
        let pitch_limit = if config.pitch_limit.is_finite() {
            config.pitch_limit.abs()
        } else {
            defaults.pitch_limit
        };
        let ordered = |a: f64, b: f64, fallback: (f64, f64)| {
            if a.is_finite() && b.is_finite() {
                (a.min(b), a.max(b))
            } else {
                fallback
            }
        };
        let mut camera = Self {
            yaw: config.yaw,
            pitch: config.pitch.clamp(-pitch_limit, pitch_limit),
            follow_distance: config.follow_distance,
            follow_height: config.follow_height,
            height_ratio: config.height_ratio,
            sensitivity: config.sensitivity,
            zoom_speed: config.zoom_speed,
            distance_range: ordered(
                config.min_distance,
                config.max_distance,
                (defaults.min_distance, defaults.max_distance),
            ),
            height_range: ordered(
                config.min_height,
                config.max_height,
                (defaults.min_height, defaults.max_height),
            ),
            pitch_limit,
            drag: PointerDrag::default(),
            pose: CameraPose {
                position: Vector3::zeros(),
                orientation: UnitQuaternion::IDENTITY,
                forward: Vector3::new(0.0, 0.0, -1.0),
            },
        };
        camera.update(&Vector3::zeros());
        camera
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.drag = PointerDrag {
            active: true,
            last_x: x,
            last_y: y,
        };
    }

    /// Turns the view while a drag is active. Moves without a drag are ignored.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if !self.drag.active {
            return;
        }
        let dx = x - self.drag.last_x;
        let dy = y - self.drag.last_y;

        if dx.is_finite() && dy.is_finite() {
            self.yaw -= dx * self.sensitivity;
            self.pitch += dy * self.sensitivity;
            self.pitch = self.pitch.clamp(-self.pitch_limit, self.pitch_limit);
        }

        self.drag.last_x = x;
        self.drag.last_y = y;
    }

    pub fn pointer_up(&mut self) {
        self.drag.active = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.active
    }

    /// Zooms by a wheel delta. The height follows the distance through the
    /// initial distance/height ratio.
    pub fn wheel(&mut self, delta: f64) {
        if !delta.is_finite() {
            return;
        }
        let (min_distance, max_distance) = self.distance_range;
        let (min_height, max_height) = self.height_range;

        self.follow_distance =
            (self.follow_distance + delta * self.zoom_speed).clamp(min_distance, max_distance);
        self.follow_height = (self.follow_distance / self.height_ratio).clamp(min_height, max_height);
    }

    /// Unit view direction for the current yaw and pitch.
    pub fn forward(&self) -> Vector3<f64> {
        let forward = Vector3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.cos() * self.pitch.cos(),
        );
        try_normalize(&forward).unwrap_or(self.pose.forward)
    }

    /// Places the camera behind and above `craft_position` and returns the
    /// view forward used to steer the craft on the next frame.
    pub fn update(&mut self, craft_position: &Vector3<f64>) -> Vector3<f64> {
        let forward = self.forward();
        let position = craft_position - forward * self.follow_distance + WORLD_UP * self.follow_height;

        // pitch never reaches ±π/2, so a basis always exists
        let orientation = ViewBasis::from_forward(&forward, &WORLD_UP)
            .map(|basis| basis.orientation())
            .unwrap_or(self.pose.orientation);

        self.pose = CameraPose {
            position,
            orientation,
            forward,
        };
        forward
    }

    /// Teleports the craft and turns the camera to look along `facing`.
    pub fn teleport_to(
        &mut self,
        craft: &mut Craft,
        position: Vector3<f64>,
        facing: Option<Vector3<f64>>,
    ) {
        craft.teleport_to(position, facing);

        if let Some(facing) = facing {
            self.yaw = facing[0].atan2(facing[2]);
            self.pitch = 0.0;
        }

        self.update(&craft.position());
        debug!(
            "teleported craft to position: {}, {}, {}",
            position[0], position[1], position[2]
        );
    }

    pub fn pose(&self) -> &CameraPose {
        &self.pose
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn follow_distance(&self) -> f64 {
        self.follow_distance
    }

    pub fn follow_height(&self) -> f64 {
        self.follow_height
    }
}

impl Default for ChaseCamera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}
