use celestial::OrbitalSystem;
use craft::Craft;

pub const MAX_SPEED_LEVEL: u8 = 8;
pub const DEFAULT_SPEED_LEVEL: u8 = 3;
pub const THRUST_POWER_MIN: u32 = 100;
pub const THRUST_POWER_MAX: u32 = 5000;
pub const THRUST_POWER_STEP: u32 = 100;

const DEFAULT_SELF_ROTATION_SPEED: f64 = 0.02;
const DEFAULT_ORBIT_SPEED: f64 = 0.002;

/// Scale applied to a default speed at a slider level: paused at 0, 1x at the
/// default level and doubling per step.
pub fn speed_scale(level: u8) -> f64 {
    if level == 0 {
        0.0
    } else {
        2f64.powi(level as i32 - DEFAULT_SPEED_LEVEL as i32)
    }
}

pub fn speed_label(level: u8) -> String {
    if level == 0 {
        "Paused".to_string()
    } else {
        format!("{:.2}x", speed_scale(level))
    }
}

/// Slider state for the on-screen panel. Setting a slider pushes the mapped
/// value into the simulation immediately; it takes effect on the next tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPanel {
    rotation_level: u8,
    orbit_level: u8,
    thrust_power: u32,
    visible: bool,
}

impl ControlPanel {
    pub fn new(max_thrust: f64) -> Self {
        Self {
            rotation_level: DEFAULT_SPEED_LEVEL,
            orbit_level: DEFAULT_SPEED_LEVEL,
            thrust_power: snap_thrust(max_thrust),
            visible: true,
        }
    }

    pub fn set_rotation_level(&mut self, level: u8, system: &mut OrbitalSystem) {
        self.rotation_level = level.min(MAX_SPEED_LEVEL);
        system.set_self_rotation_speed(DEFAULT_SELF_ROTATION_SPEED * speed_scale(self.rotation_level));
    }

    pub fn set_orbit_level(&mut self, level: u8, system: &mut OrbitalSystem) {
        self.orbit_level = level.min(MAX_SPEED_LEVEL);
        system.set_orbit_speed(DEFAULT_ORBIT_SPEED * speed_scale(self.orbit_level));
    }

    /// Snaps to the slider's step and range before handing it to the craft.
    pub fn set_thrust_power(&mut self, power: f64, craft: &mut Craft) {
        self.thrust_power = snap_thrust(power);
        craft.set_max_thrust(self.thrust_power as f64);
    }

    pub fn rotation_level(&self) -> u8 {
        self.rotation_level
    }

    pub fn orbit_level(&self) -> u8 {
        self.orbit_level
    }

    pub fn thrust_power(&self) -> u32 {
        self.thrust_power
    }

    pub fn rotation_label(&self) -> String {
        format!("Rotation Speed: {}", speed_label(self.rotation_level))
    }

    pub fn orbit_label(&self) -> String {
        format!("Orbit Speed: {}", speed_label(self.orbit_level))
    }

    pub fn thrust_label(&self) -> String {
        format!("Thrust Power: {}", self.thrust_power)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle_visible(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }
}

fn snap_thrust(power: f64) -> u32 {
    if !power.is_finite() {
        return THRUST_POWER_MIN;
    }
    let power = power.clamp(THRUST_POWER_MIN as f64, THRUST_POWER_MAX as f64);
    let steps = (power / THRUST_POWER_STEP as f64).round() as u32;
    (steps * THRUST_POWER_STEP).clamp(THRUST_POWER_MIN, THRUST_POWER_MAX)
}

/// Craft speed in Earth diameters per second at the current size ratio.
pub fn speed_in_earth_diameters(craft: &Craft, system: &OrbitalSystem) -> Option<f64> {
    let earth_diameter = system.object_base_size("Earth")? * 2.0 * system.size_ratio();
    if earth_diameter > 0.0 {
        Some(craft.speed() / earth_diameter)
    } else {
        None
    }
}

pub fn speed_readout(speed: f64) -> String {
    format!("SPEED: {speed:.3} Earth diameters/sec")
}
