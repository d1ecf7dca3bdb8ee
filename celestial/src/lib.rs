//! A scaled-down solar system: the Sun fixed at the origin and planets on
//! circular orbits in the XZ plane, advanced one tick at a time.

pub mod bodies;
pub mod indicators;

pub use bodies::{BodyConfig, BodyState, EARTH_BASE_SIZE, RingConfig, SunConfig, default_bodies};
pub use indicators::{Indicator, IndicatorConfig};

use color::Color;
use nalgebra::Vector3;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rotations::prelude::*;
use rotations::try_normalize;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

pub const SUN: &str = "Sun";

/// Teleport destination far outside the outermost orbit.
pub const DEEP_SPACE: &str = "0.01 Light Years";

#[derive(Debug, Error, PartialEq)]
pub enum CelestialErrors {
    #[error("celestial body '{0}' already exists in the solar system")]
    CelestialBodyAlreadyExists(String),
    #[error("'{0}' is reserved and can't name an orbiting body")]
    ReservedName(String),
    #[error("solar system has no orbiting bodies")]
    NoBodies,
    #[error("body '{name}' is invalid: {reason}")]
    InvalidBody { name: String, reason: String },
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SolarConfig {
    pub sun: SunConfig,
    pub bodies: Vec<BodyConfig>,
    pub self_rotation_speed: f64,
    pub orbit_speed: f64,
    pub size_ratio: f64,
    pub distance_ratio: f64,
    pub indicators: IndicatorConfig,
    /// Height above a body's surface a teleport lands at.
    pub teleport_clearance: f64,
    /// Deep-space marker distance in units of the outermost orbit.
    pub deep_space_factor: f64,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            sun: SunConfig::default(),
            bodies: default_bodies(),
            self_rotation_speed: 0.02,
            orbit_speed: 0.002,
            size_ratio: 1.0,
            distance_ratio: 1.0,
            indicators: IndicatorConfig::default(),
            teleport_clearance: 100.0,
            deep_space_factor: 16.0,
        }
    }
}

/// Where a teleport lands and which way the craft should face afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeleportTarget {
    pub position: Vector3<f64>,
    /// Horizontal direction toward the Sun, `None` when directly above it.
    pub facing: Option<Vector3<f64>>,
}

/// An entry in the teleport destination list.
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub name: String,
    pub color: Color,
}

/// Read-only view of one body for rendering.
#[derive(Debug, Clone, Copy)]
pub struct BodyView<'a> {
    pub config: &'a BodyConfig,
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion,
    pub radius: f64,
}

#[derive(Debug, Clone)]
struct CelestialBody {
    config: BodyConfig,
    state: BodyState,
}

#[derive(Debug, Clone)]
pub struct OrbitalSystem {
    sun: SunConfig,
    sun_spin: f64,
    sun_light_intensity: f64,
    bodies: Vec<CelestialBody>,
    self_rotation_speed: f64,
    orbit_speed: f64,
    size_ratio: f64,
    distance_ratio: f64,
    indicator_config: IndicatorConfig,
    indicators: Vec<Indicator>,
    teleport_clearance: f64,
    deep_space_factor: f64,
}

impl OrbitalSystem {
    /// Builds the system, drawing each body's orbit phase and initial spin from `rng`.
    pub fn new(config: &SolarConfig, rng: &mut impl Rng) -> Result<Self, CelestialErrors> {
        validate(config)?;

        let bodies = config
            .bodies
            .iter()
            .map(|body| CelestialBody {
                config: body.clone(),
                state: BodyState::random(&mut *rng),
            })
            .collect();

        Ok(Self {
            sun: config.sun.clone(),
            sun_spin: 0.0,
            sun_light_intensity: config.sun.light_intensity,
            bodies,
            self_rotation_speed: config.self_rotation_speed,
            orbit_speed: config.orbit_speed,
            size_ratio: config.size_ratio,
            distance_ratio: config.distance_ratio,
            indicator_config: config.indicators,
            indicators: Vec::new(),
            teleport_clearance: config.teleport_clearance,
            deep_space_factor: config.deep_space_factor,
        })
    }

    /// Reproducible phases with a seed, fresh ones without.
    pub fn from_seed(config: &SolarConfig, seed: Option<u64>) -> Result<Self, CelestialErrors> {
        let mut rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self::new(config, &mut rng)
    }

    /// Advances every spin and orbit by one tick.
    pub fn update(&mut self) {
        self.sun_spin += self.sun.self_rotation_rate * self.self_rotation_speed;

        for body in self.bodies.iter_mut() {
            body.state
                .advance(&body.config, self.self_rotation_speed, self.orbit_speed);
        }

        self.sync_indicators();
    }

    fn find(&self, name: &str) -> Option<&CelestialBody> {
        self.bodies.iter().find(|b| b.config.name == name)
    }

    fn body_position(&self, body: &CelestialBody) -> Vector3<f64> {
        body.state
            .position(body.config.base_distance * self.distance_ratio)
    }

    pub fn object_position(&self, name: &str) -> Option<Vector3<f64>> {
        if name == SUN {
            return Some(Vector3::zeros());
        }
        match self.find(name) {
            Some(body) => Some(self.body_position(body)),
            None => {
                warn!("celestial body '{name}' not found");
                None
            }
        }
    }

    pub fn object_orientation(&self, name: &str) -> Option<UnitQuaternion> {
        if name == SUN {
            return Some(self.sun_orientation());
        }
        self.find(name).map(|b| b.state.orientation(&b.config))
    }

    pub fn object_base_size(&self, name: &str) -> Option<f64> {
        if name == SUN {
            return Some(self.sun.base_size);
        }
        match self.find(name) {
            Some(body) => Some(body.config.base_size),
            None => {
                warn!("celestial body '{name}' not found");
                None
            }
        }
    }

    /// Orbit radius before the distance ratio. The Sun sits at zero.
    pub fn object_base_distance(&self, name: &str) -> Option<f64> {
        if name == SUN {
            return Some(0.0);
        }
        match self.find(name) {
            Some(body) => Some(body.config.base_distance),
            None => {
                warn!("celestial body '{name}' not found for distance");
                None
            }
        }
    }

    pub fn sun_orientation(&self) -> UnitQuaternion {
        UnitQuaternion::from_axis_angle(&Vector3::y(), self.sun_spin)
    }

    pub fn sun_radius(&self) -> f64 {
        self.sun.base_size * self.size_ratio
    }

    pub fn sun_color(&self) -> Color {
        self.sun.color
    }

    pub fn bodies(&self) -> impl Iterator<Item = BodyView<'_>> {
        self.bodies.iter().map(|body| BodyView {
            config: &body.config,
            position: self.body_position(body),
            orientation: body.state.orientation(&body.config),
            radius: body.config.base_size * self.size_ratio,
        })
    }

    pub fn body_names(&self) -> impl Iterator<Item = &str> {
        self.bodies.iter().map(|b| b.config.name.as_str())
    }

    pub fn set_size_ratio(&mut self, ratio: f64) {
        if let Some(ratio) = checked_scalar("size ratio", ratio) {
            self.size_ratio = ratio;
        }
    }

    pub fn size_ratio(&self) -> f64 {
        self.size_ratio
    }

    pub fn set_distance_ratio(&mut self, ratio: f64) {
        if let Some(ratio) = checked_scalar("distance ratio", ratio) {
            self.distance_ratio = ratio;
            self.sync_indicators();
        }
    }

    pub fn distance_ratio(&self) -> f64 {
        self.distance_ratio
    }

    /// Zero freezes every spin.
    pub fn set_self_rotation_speed(&mut self, speed: f64) {
        if let Some(speed) = checked_scalar("self rotation speed", speed) {
            self.self_rotation_speed = speed;
        }
    }

    pub fn self_rotation_speed(&self) -> f64 {
        self.self_rotation_speed
    }

    /// Zero freezes every orbit.
    pub fn set_orbit_speed(&mut self, speed: f64) {
        if let Some(speed) = checked_scalar("orbit speed", speed) {
            self.orbit_speed = speed;
        }
    }

    pub fn orbit_speed(&self) -> f64 {
        self.orbit_speed
    }

    /// Sun light intensity seen from `observer`. Constant inside the base
    /// light distance, growing with the square of the distance beyond it.
    pub fn update_sun_light_falloff(&mut self, observer: &Vector3<f64>) -> f64 {
        let distance = observer.norm();
        self.sun_light_intensity = if distance <= self.sun.light_distance {
            self.sun.light_intensity
        } else {
            let t = distance / self.sun.light_distance;
            self.sun.light_intensity * t * t
        };
        self.sun_light_intensity
    }

    pub fn sun_light_intensity(&self) -> f64 {
        self.sun_light_intensity
    }

    /// Shows or hides the body indicators, returning the new visibility.
    pub fn toggle_indicators(&mut self) -> bool {
        if self.indicators.is_empty() {
            self.indicators = self
                .bodies
                .iter()
                .map(|body| {
                    Indicator::new(
                        &body.config.name,
                        body.config.color,
                        self.body_position(body),
                        &self.indicator_config,
                    )
                })
                .collect();
            debug!("created {} body indicators", self.indicators.len());
        } else {
            self.indicators.clear();
            debug!("removed body indicators");
        }
        self.indicators_visible()
    }

    pub fn indicators_visible(&self) -> bool {
        !self.indicators.is_empty()
    }

    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    fn sync_indicators(&mut self) {
        if self.indicators.is_empty() {
            return;
        }
        for (indicator, body) in self.indicators.iter_mut().zip(&self.bodies) {
            indicator.position = body.state.position(body.config.base_distance * self.distance_ratio);
        }
    }

    /// Landing spot for `destination`: above a body's surface or, for
    /// [`DEEP_SPACE`], out along +X past the outermost orbit.
    pub fn teleport_target(&self, destination: &str) -> Option<TeleportTarget> {
        let position = if destination == DEEP_SPACE {
            let outermost = self
                .bodies
                .iter()
                .map(|b| b.config.base_distance)
                .fold(0.0, f64::max);
            Vector3::x() * (outermost * self.deep_space_factor * self.distance_ratio)
        } else {
            let center = self.object_position(destination)?;
            let radius = self.object_base_size(destination)? * self.size_ratio;
            center + WORLD_UP * (self.teleport_clearance + radius)
        };

        let mut to_sun = -position;
        to_sun[1] = 0.0;

        Some(TeleportTarget {
            position,
            facing: try_normalize(&to_sun),
        })
    }

    /// Every teleport destination in menu order: the planets, deep space, then the Sun.
    pub fn destinations(&self) -> Vec<Destination> {
        self.bodies
            .iter()
            .map(|b| Destination {
                name: b.config.name.clone(),
                color: b.config.color,
            })
            .chain([
                Destination {
                    name: DEEP_SPACE.to_string(),
                    color: Color::LIGHT_GRAY,
                },
                Destination {
                    name: SUN.to_string(),
                    color: self.sun.color,
                },
            ])
            .collect()
    }
}

fn checked_scalar(what: &str, value: f64) -> Option<f64> {
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        warn!("rejected {what} {value}");
        None
    }
}

fn validate(config: &SolarConfig) -> Result<(), CelestialErrors> {
    if config.bodies.is_empty() {
        return Err(CelestialErrors::NoBodies);
    }

    let mut names = HashSet::new();
    for body in &config.bodies {
        if body.name == SUN || body.name == DEEP_SPACE {
            return Err(CelestialErrors::ReservedName(body.name.clone()));
        }
        if !names.insert(body.name.as_str()) {
            return Err(CelestialErrors::CelestialBodyAlreadyExists(body.name.clone()));
        }
        let invalid = |reason: &str| CelestialErrors::InvalidBody {
            name: body.name.clone(),
            reason: reason.to_string(),
        };
        if !(body.base_size > 0.0) || !body.base_size.is_finite() {
            return Err(invalid("base size must be positive"));
        }
        if !(body.base_distance >= 0.0) || !body.base_distance.is_finite() {
            return Err(invalid("base distance must be non-negative"));
        }
        if let Some(ring) = &body.ring {
            if !(ring.inner_radius < ring.outer_radius) {
                return Err(invalid("ring inner radius must be below the outer radius"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    const TOL: f64 = 1e-9;

    fn system() -> OrbitalSystem {
        OrbitalSystem::from_seed(&SolarConfig::default(), Some(42)).unwrap()
    }

    #[test]
    fn test_sun_is_found_unknown_is_not() {
        let system = system();
        assert_eq!(system.object_position(SUN), Some(Vector3::zeros()));
        assert_eq!(system.object_base_size(SUN), Some(10900.0));
        assert!(system.object_position("Vulcan").is_none());
        assert!(system.object_base_size("Vulcan").is_none());
        assert!(system.object_base_distance("Vulcan").is_none());
        assert_eq!(system.object_base_distance("Earth"), Some(38760.0));
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = system();
        let b = system();
        for name in a.body_names() {
            assert_eq!(a.object_position(name), b.object_position(name));
        }
    }

    #[test]
    fn test_positions_lie_on_orbits() {
        let mut system = system();
        for _ in 0..100 {
            system.update();
        }
        for body in system.bodies() {
            assert_abs_diff_eq!(body.position.norm(), body.config.base_distance, epsilon = 1e-6);
            assert_eq!(body.position[1], 0.0);
        }
    }

    #[test]
    fn test_distance_ratio_scales_uniformly() {
        let mut system = system();
        let before: Vec<_> = system.bodies().map(|b| b.position).collect();
        system.set_distance_ratio(0.5);
        for (body, p) in system.bodies().zip(before) {
            assert_abs_diff_eq!(body.position, p * 0.5, epsilon = TOL);
        }
        system.set_size_ratio(2.0);
        let earth = system.bodies().find(|b| b.config.name == "Earth").unwrap();
        assert_eq!(earth.radius, 200.0);
    }

    #[test]
    fn test_zero_self_rotation_freezes_spin_only() {
        let mut system = system();
        system.set_self_rotation_speed(0.0);
        let before: Vec<_> = system.bodies.iter().map(|b| b.state).collect();
        let sun_before = system.sun_orientation();
        let mercury_before = system.object_position("Mercury").unwrap();

        system.update();

        assert_eq!(system.sun_orientation(), sun_before);
        for (body, before) in system.bodies.iter().zip(before) {
            assert_eq!(body.state.spin_angle, before.spin_angle);
            assert!(body.state.orbit_angle > before.orbit_angle);
        }
        assert_ne!(system.object_position("Mercury").unwrap(), mercury_before);
    }

    #[test]
    fn test_update_integrates_angles() {
        let mut system = system();
        let start: Vec<_> = system.bodies.iter().map(|b| b.state).collect();
        for _ in 0..60 {
            system.update();
        }
        for (body, start) in system.bodies.iter().zip(start) {
            assert_abs_diff_eq!(
                body.state.spin_angle - start.spin_angle,
                60.0 * body.config.self_rotation_rate * 0.02,
                epsilon = 1e-12
            );
            assert_abs_diff_eq!(
                body.state.orbit_angle - start.orbit_angle,
                60.0 * body.config.orbit_rate * 0.002,
                epsilon = 1e-12
            );
        }

        system.set_orbit_speed(0.0);
        let frozen = system.object_position("Earth");
        system.update();
        assert_eq!(system.object_position("Earth"), frozen);
    }

    #[test]
    fn test_rejects_invalid_multipliers() {
        let mut system = system();
        system.set_orbit_speed(f64::NAN);
        system.set_self_rotation_speed(-1.0);
        system.set_size_ratio(f64::INFINITY);
        assert_eq!(system.orbit_speed(), 0.002);
        assert_eq!(system.self_rotation_speed(), 0.02);
        assert_eq!(system.size_ratio(), 1.0);
    }

    #[test]
    fn test_light_falloff() {
        let mut system = system();
        assert_eq!(system.update_sun_light_falloff(&Vector3::new(0.0, 0.0, 12000.0)), 1e9);
        assert_eq!(system.update_sun_light_falloff(&Vector3::new(20000.0, 0.0, 0.0)), 1e9);
        let intensity = system.update_sun_light_falloff(&Vector3::new(0.0, 40000.0, 0.0));
        assert_abs_diff_eq!(intensity, 4e9, epsilon = 1e-3);
        assert_eq!(system.sun_light_intensity(), intensity);
    }

    #[test]
    fn test_teleport_to_body() {
        let system = system();
        let earth = system.object_position("Earth").unwrap();
        let target = system.teleport_target("Earth").unwrap();
        assert_abs_diff_eq!(target.position, earth + Vector3::new(0.0, 200.0, 0.0), epsilon = TOL);

        let facing = target.facing.unwrap();
        assert_eq!(facing[1], 0.0);
        assert_abs_diff_eq!(facing.norm(), 1.0, epsilon = TOL);
        let horizontal = Vector3::new(-earth[0], 0.0, -earth[2]).normalize();
        assert_abs_diff_eq!(facing, horizontal, epsilon = TOL);
    }

    #[test]
    fn test_teleport_to_sun_has_no_facing() {
        let system = system();
        let target = system.teleport_target(SUN).unwrap();
        assert_abs_diff_eq!(target.position, Vector3::new(0.0, 11000.0, 0.0), epsilon = TOL);
        assert!(target.facing.is_none());
    }

    #[test]
    fn test_teleport_to_deep_space() {
        let mut system = system();
        system.set_distance_ratio(0.5);
        let target = system.teleport_target(DEEP_SPACE).unwrap();
        assert_abs_diff_eq!(
            target.position,
            Vector3::new(1530080.0 * 16.0 * 0.5, 0.0, 0.0),
            epsilon = TOL
        );
        assert_abs_diff_eq!(target.facing.unwrap(), Vector3::new(-1.0, 0.0, 0.0), epsilon = TOL);
        assert!(system.teleport_target("Vulcan").is_none());
    }

    #[test]
    fn test_indicators_toggle_and_follow() {
        let mut system = system();
        assert!(system.toggle_indicators());
        assert_eq!(system.indicators().len(), 9);
        assert_eq!(system.indicators()[2].name, "Earth");
        assert_eq!(system.indicators()[2].color.to_hex(), 0x228B22);

        for _ in 0..30 {
            system.update();
        }
        let earth = system.object_position("Earth").unwrap();
        let indicator = &system.indicators()[2];
        assert_eq!(indicator.position, earth);
        assert_abs_diff_eq!(
            indicator.cap_position(),
            earth + Vector3::new(0.0, 50000.0, 0.0),
            epsilon = TOL
        );
        assert_eq!(indicator.cap_radius, 50.0);
        assert_abs_diff_eq!(indicator.label_position()[1], earth[1] + 300.0, epsilon = TOL);

        assert!(!system.toggle_indicators());
        assert!(system.indicators().is_empty());
    }

    #[test]
    fn test_destinations() {
        let names: Vec<_> = system().destinations().into_iter().map(|d| d.name).collect();
        assert_eq!(names.len(), 11);
        assert_eq!(names[0], "Mercury");
        assert_eq!(names[9], DEEP_SPACE);
        assert_eq!(names[10], SUN);
    }

    #[test]
    fn test_config_validation() {
        let mut config = SolarConfig::default();
        config.bodies.push(config.bodies[0].clone());
        assert_eq!(
            OrbitalSystem::from_seed(&config, Some(1)).unwrap_err(),
            CelestialErrors::CelestialBodyAlreadyExists("Mercury".to_string())
        );

        let mut config = SolarConfig::default();
        config.bodies[0].name = SUN.to_string();
        assert!(matches!(
            OrbitalSystem::from_seed(&config, Some(1)),
            Err(CelestialErrors::ReservedName(_))
        ));

        let config = SolarConfig { bodies: Vec::new(), ..Default::default() };
        assert!(matches!(
            OrbitalSystem::from_seed(&config, Some(1)),
            Err(CelestialErrors::NoBodies)
        ));

        let mut config = SolarConfig::default();
        config.bodies[5].ring = Some(RingConfig { inner_radius: 5.0, outer_radius: 1.0 });
        assert!(matches!(
            OrbitalSystem::from_seed(&config, Some(1)),
            Err(CelestialErrors::InvalidBody { .. })
        ));
    }
}
