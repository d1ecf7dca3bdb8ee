use crate::controls::Controls;
use nalgebra::Vector3;
use rotations::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Tunables for the craft's flight model.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CraftConfig {
    /// Where the craft spawns at scene start.
    pub initial_position: Vector3<f64>,
    pub mass: f64,
    /// Force produced by a unit-length thrust direction.
    pub max_thrust: f64,
    /// Fraction of velocity retained after one second of coasting.
    pub friction: f64,
    /// Rate cap on the slerp fraction, per second.
    pub rotation_speed: f64,
    /// Largest rotation (radians) applied in one update.
    pub max_angle_per_frame: f64,
    /// The craft only turns to follow its velocity above this speed.
    pub min_orient_speed: f64,
    /// Share of the previous heading kept on each update call.
    pub heading_smoothing: f64,
}

impl Default for CraftConfig {
    fn default() -> Self {
        Self {
            initial_position: Vector3::new(0.0, 0.0, 12000.0),
            mass: 1.0,
            max_thrust: 5000.0,
            friction: 0.5,
            rotation_speed: 2.0,
            max_angle_per_frame: 0.1,
            min_orient_speed: 1.0,
            heading_smoothing: 0.8,
        }
    }
}

/// The user-controlled craft.
///
/// Thrust is given in camera-local axes and mapped to world space through the
/// camera forward vector supplied with it. Velocity decays exponentially with
/// elapsed time and the nose turns, rate limited, toward a smoothed copy of the
/// velocity direction.
#[derive(Clone, Debug)]
pub struct Craft {
    position: Vector3<f64>,
    velocity: Vector3<f64>,
    orientation: UnitQuaternion,
    mass: f64,
    max_thrust: f64,
    friction: f64,
    rotation_speed: f64,
    max_angle_per_frame: f64,
    min_orient_speed: f64,
    heading_smoothing: f64,
    heading: Option<Vector3<f64>>,
    controls: Controls,
}

impl Craft {
    pub fn new(config: &CraftConfig) -> Self {
        // a negative base under powf turns the velocity into NaN
        let friction = if config.friction.is_finite() && config.friction >= 0.0 {
            config.friction
        } else {
            warn!("rejected friction {}, using the default", config.friction);
            CraftConfig::default().friction
        };
        Self {
            position: config.initial_position,
            velocity: Vector3::zeros(),
            orientation: UnitQuaternion::IDENTITY,
            mass: config.mass,
            max_thrust: config.max_thrust,
            friction,
            rotation_speed: config.rotation_speed,
            max_angle_per_frame: config.max_angle_per_frame,
            min_orient_speed: config.min_orient_speed,
            heading_smoothing: config.heading_smoothing,
            heading: None,
            controls: Controls::default(),
        }
    }

    pub fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_orientation(mut self, orientation: UnitQuaternion) -> Self {
        self.orientation = orientation;
        self
    }

    /// Stores the thrust direction (camera-local, magnitude ≤ 1) and the camera
    /// forward vector used to interpret it on the next `update`.
    pub fn set_controls(&mut self, thrust_direction: Vector3<f64>, camera_forward: Vector3<f64>) {
        let finite = |v: &Vector3<f64>| v.iter().all(|c| c.is_finite());
        self.controls = Controls {
            thrust_direction: if finite(&thrust_direction) {
                thrust_direction
            } else {
                Vector3::zeros()
            },
            camera_forward: if finite(&camera_forward) {
                camera_forward
            } else {
                Vector3::zeros()
            },
        };
    }

    pub fn apply(&mut self, controls: &Controls) {
        self.set_controls(controls.thrust_direction, controls.camera_forward);
    }

    /// Advances the craft by `delta_time` seconds.
    pub fn update(&mut self, delta_time: f64) {
        if !delta_time.is_finite() || delta_time < 0.0 {
            warn!("ignoring craft update with delta time {delta_time}");
            return;
        }

        self.apply_thrust(delta_time);

        // exponential decay, independent of frame rate
        self.velocity *= self.friction.powf(delta_time);

        self.position += self.velocity * delta_time;

        self.update_orientation(delta_time);
    }

    fn apply_thrust(&mut self, delta_time: f64) {
        let direction = self.controls.thrust_direction;
        if direction == Vector3::zeros() || self.mass <= 0.0 {
            return;
        }
        // no camera forward this frame, nothing to map the thrust through
        let Some(basis) = ViewBasis::thrust_frame(&self.controls.camera_forward, &WORLD_UP) else {
            return;
        };

        let force = basis.to_world(&direction) * self.max_thrust;
        let acceleration = force / self.mass;
        self.velocity += acceleration * delta_time;
    }

    fn update_orientation(&mut self, delta_time: f64) {
        let speed = self.velocity.norm();
        if speed <= self.min_orient_speed {
            self.heading = None;
            return;
        }

        let direction = self.velocity / speed;
        // smoothing is applied per call, not per second
        let smoothed = match self.heading {
            Some(previous) => previous.lerp(&direction, 1.0 - self.heading_smoothing),
            None => direction,
        };
        self.heading = Some(smoothed);

        let Some(target) = UnitQuaternion::look_at(&smoothed, &WORLD_UP) else {
            return;
        };

        let angle = self.orientation.angle_to(&target);
        let fraction = (self.rotation_speed * delta_time)
            .min(self.max_angle_per_frame / angle)
            .clamp(0.0, 1.0);
        self.orientation = self.orientation.slerp(&target, fraction);
    }

    /// Moves the craft instantly, killing its velocity. With a facing direction
    /// the craft is also turned to look along it.
    pub fn teleport_to(&mut self, position: Vector3<f64>, facing: Option<Vector3<f64>>) {
        self.velocity = Vector3::zeros();
        self.position = position;

        if let Some(facing) = facing {
            match UnitQuaternion::look_at(&facing, &WORLD_UP) {
                Some(orientation) => {
                    self.orientation = orientation;
                    debug!(
                        "craft facing direction: {:.2}, {:.2}, {:.2}",
                        facing[0], facing[1], facing[2]
                    );
                }
                None => debug!("teleport facing direction has no length, keeping orientation"),
            }
        }

        self.heading = None;
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    pub fn orientation(&self) -> UnitQuaternion {
        self.orientation
    }

    pub fn heading(&self) -> Option<Vector3<f64>> {
        self.heading
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// Current thrust force in camera-local axes.
    pub fn thrust(&self) -> Vector3<f64> {
        self.controls.thrust_direction * self.max_thrust
    }

    pub fn max_thrust(&self) -> f64 {
        self.max_thrust
    }

    /// Takes effect on the next `update`.
    pub fn set_max_thrust(&mut self, max_thrust: f64) {
        if max_thrust.is_finite() && max_thrust >= 0.0 {
            self.max_thrust = max_thrust;
        } else {
            warn!("rejected max thrust {max_thrust}");
        }
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }
}

impl Default for Craft {
    fn default() -> Self {
        Self::new(&CraftConfig::default())
    }
}
