//! The user-controlled craft: a force-based flight model plus the mapping
//! from held direction keys to a camera-relative thrust vector.

pub mod controls;
pub mod flight;

pub use controls::{ControlConfig, Controls, Direction, InputMapper, KeyBindings, KeyState};
pub use flight::{Craft, CraftConfig};
