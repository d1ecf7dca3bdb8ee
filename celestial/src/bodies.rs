use color::Color;
use nalgebra::Vector3;
use rand::Rng;
use rotations::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Earth's base size, the unit ring radii are quoted in.
pub const EARTH_BASE_SIZE: f64 = 100.0;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct RingConfig {
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl RingConfig {
    /// Ring with radii given as multiples of Earth's base size.
    pub fn earth_sizes(inner: f64, outer: f64) -> Self {
        Self {
            inner_radius: inner * EARTH_BASE_SIZE,
            outer_radius: outer * EARTH_BASE_SIZE,
        }
    }
}

/// Fixed description of an orbiting body. Runtime state lives in [`BodyState`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BodyConfig {
    pub name: String,
    pub base_size: f64,
    pub base_distance: f64,
    /// Spin per tick before the global self-rotation multiplier.
    pub self_rotation_rate: f64,
    /// Revolution per tick before the global orbit multiplier.
    pub orbit_rate: f64,
    /// degrees
    pub axial_tilt: f64,
    pub color: Color,
    #[serde(default)]
    pub ring: Option<RingConfig>,
}

impl BodyConfig {
    fn new(
        name: &str,
        base_size: f64,
        base_distance: f64,
        self_rotation_rate: f64,
        orbit_rate: f64,
        axial_tilt: f64,
        color: u32,
    ) -> Self {
        Self {
            name: name.to_string(),
            base_size,
            base_distance,
            self_rotation_rate,
            orbit_rate,
            axial_tilt,
            color: Color::from_hex(color),
            ring: None,
        }
    }

    fn with_ring(mut self, ring: RingConfig) -> Self {
        self.ring = Some(ring);
        self
    }

    pub fn axial_tilt_radians(&self) -> f64 {
        self.axial_tilt * PI / 180.0
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SunConfig {
    pub base_size: f64,
    pub self_rotation_rate: f64,
    pub color: Color,
    pub light_intensity: f64,
    /// Observers closer than this see the base intensity.
    pub light_distance: f64,
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            base_size: 10900.0,
            self_rotation_rate: 0.004,
            color: Color::YELLOW,
            light_intensity: 1e9,
            light_distance: 20000.0,
        }
    }
}

/// The nine planets, innermost first.
pub fn default_bodies() -> Vec<BodyConfig> {
    vec![
        BodyConfig::new("Mercury", 38.0, 15000.0, 0.004, 0.041667, 0.034, 0xFF3030),
        BodyConfig::new("Venus", 95.0, 28020.0, 0.002, 0.016129, 177.4, 0xFFFF00),
        BodyConfig::new("Earth", EARTH_BASE_SIZE, 38760.0, 0.02, 0.01, 23.4, 0x228B22),
        BodyConfig::new("Mars", 53.0, 59070.0, 0.018, 0.005319, 25.2, 0xFFA500),
        BodyConfig::new("Jupiter", 1121.0, 201630.0, 0.04, 0.000843, 3.1, 0x964B00),
        BodyConfig::new("Saturn", 945.0, 371390.0, 0.038, 0.000339, 26.7, 0xFF69B4)
            .with_ring(RingConfig::earth_sizes(10.0, 20.0)),
        BodyConfig::new("Uranus", 401.0, 744190.0, 0.03, 0.000119, 97.8, 0x00FFFF)
            .with_ring(RingConfig::earth_sizes(7.0, 12.0)),
        BodyConfig::new("Neptune", 388.0, 1164570.0, 0.032, 0.000061, 28.3, 0x0033FF),
        BodyConfig::new("Pluto", 19.0, 1530080.0, 0.008, 0.000040, 57.5, 0xFFFFFF),
    ]
}

/// Mutable per-body state. Angles are accumulated tick by tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// Fixed angular offset of the body on its orbit.
    pub orbit_phase: f64,
    pub orbit_angle: f64,
    pub spin_angle: f64,
}

impl BodyState {
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            orbit_phase: rng.random_range(0.0..TAU),
            orbit_angle: 0.0,
            spin_angle: rng.random_range(0.0..TAU),
        }
    }

    pub fn advance(&mut self, config: &BodyConfig, self_rotation_speed: f64, orbit_speed: f64) {
        self.spin_angle += config.self_rotation_rate * self_rotation_speed;
        self.orbit_angle += config.orbit_rate * orbit_speed;
    }

    /// World position for an orbit radius of `distance`.
    pub fn position(&self, distance: f64) -> Vector3<f64> {
        let local = Vector3::new(
            distance * self.orbit_phase.cos(),
            0.0,
            distance * self.orbit_phase.sin(),
        );
        self.orbit_rotation().rotate(&local)
    }

    /// Tilt then spin, as seen in the body's orbit frame.
    pub fn spin_orientation(&self, config: &BodyConfig) -> UnitQuaternion {
        let tilt = UnitQuaternion::from_axis_angle(&Vector3::x(), config.axial_tilt_radians());
        let spin = UnitQuaternion::from_axis_angle(&Vector3::y(), self.spin_angle);
        tilt * spin
    }

    /// Spin orientation carried around by the orbit.
    pub fn orientation(&self, config: &BodyConfig) -> UnitQuaternion {
        self.orbit_rotation() * self.spin_orientation(config)
    }

    fn orbit_rotation(&self) -> UnitQuaternion {
        UnitQuaternion::from_axis_angle(&Vector3::y(), self.orbit_angle)
    }
}
