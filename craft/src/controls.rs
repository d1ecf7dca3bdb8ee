use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// One of the six thrust directions, in camera-local axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Forward,
        Direction::Back,
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit contribution of this direction. Forward is −Z.
    pub fn axis(&self) -> Vector3<f64> {
        match self {
            Direction::Forward => Vector3::new(0.0, 0.0, -1.0),
            Direction::Back => Vector3::new(0.0, 0.0, 1.0),
            Direction::Left => Vector3::new(-1.0, 0.0, 0.0),
            Direction::Right => Vector3::new(1.0, 0.0, 0.0),
            Direction::Up => Vector3::new(0.0, 1.0, 0.0),
            Direction::Down => Vector3::new(0.0, -1.0, 0.0),
        }
    }
}

/// Held/released state of the six direction keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl KeyState {
    fn flag_mut(&mut self, direction: Direction) -> &mut bool {
        match direction {
            Direction::Forward => &mut self.forward,
            Direction::Back => &mut self.back,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
        }
    }

    pub fn set(&mut self, direction: Direction, held: bool) {
        *self.flag_mut(direction) = held;
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.forward,
            Direction::Back => self.back,
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    pub fn any(&self) -> bool {
        Direction::ALL.iter().any(|d| self.is_held(*d))
    }
}

/// Key names bound to each direction. Matching ignores case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: String,
    pub back: String,
    pub left: String,
    pub right: String,
    pub up: String,
    pub down: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".into(),
            back: "s".into(),
            left: "a".into(),
            right: "d".into(),
            up: "q".into(),
            down: "e".into(),
        }
    }
}

impl KeyBindings {
    pub fn key(&self, direction: Direction) -> &str {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Back => &self.back,
            Direction::Left => &self.left,
            Direction::Right => &self.right,
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        }
    }

    pub fn direction(&self, key: &str) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| self.key(*d).eq_ignore_ascii_case(key))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub bindings: KeyBindings,
    /// Contribution of one held key to its axis.
    pub thrust_increment: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            bindings: KeyBindings::default(),
            thrust_increment: 0.1,
        }
    }
}

/// What the craft is told each frame: a camera-local thrust direction and the
/// camera forward vector to interpret it with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    pub thrust_direction: Vector3<f64>,
    pub camera_forward: Vector3<f64>,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            thrust_direction: Vector3::zeros(),
            camera_forward: Vector3::new(0.0, 0.0, -1.0),
        }
    }
}

/// Turns held direction keys into a thrust vector.
///
/// The thrust is rebuilt from scratch on every update: each held key adds
/// `thrust_increment` along its axis and the sum is capped at unit length.
#[derive(Debug, Clone)]
pub struct InputMapper {
    keys: KeyState,
    bindings: KeyBindings,
    thrust_increment: f64,
}

impl InputMapper {
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            keys: KeyState::default(),
            bindings: config.bindings.clone(),
            thrust_increment: config.thrust_increment,
        }
    }

    /// Returns true when the key is bound to a direction.
    pub fn key_down(&mut self, key: &str) -> bool {
        self.set_key(key, true)
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.set_key(key, false)
    }

    fn set_key(&mut self, key: &str, held: bool) -> bool {
        match self.bindings.direction(key) {
            Some(direction) => {
                self.keys.set(direction, held);
                true
            }
            None => false,
        }
    }

    pub fn press(&mut self, direction: Direction) {
        self.keys.set(direction, true);
    }

    pub fn release(&mut self, direction: Direction) {
        self.keys.set(direction, false);
    }

    pub fn release_all(&mut self) {
        self.keys = KeyState::default();
    }

    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Camera-local thrust for the currently held keys, length ≤ 1.
    pub fn thrust_direction(&self) -> Vector3<f64> {
        let mut thrust = Direction::ALL
            .iter()
            .filter(|d| self.keys.is_held(**d))
            .fold(Vector3::zeros(), |acc, d| acc + d.axis() * self.thrust_increment);

        let length = thrust.norm();
        if length > 1.0 {
            thrust /= length;
        }
        thrust
    }

    pub fn update(&self, camera_forward: Vector3<f64>) -> Controls {
        Controls {
            thrust_direction: self.thrust_direction(),
            camera_forward,
        }
    }
}

impl Default for InputMapper {
    fn default() -> Self {
        Self::new(&ControlConfig::default())
    }
}
