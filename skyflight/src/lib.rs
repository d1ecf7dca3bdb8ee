//! Free flight through a scaled solar system. Wires the craft, the chase
//! camera and the orbital system into a frame loop and exposes what a host
//! needs to render it and feed it input.

pub mod assets;
pub mod config;
pub mod control_panel;
pub mod errors;
pub mod input;
pub mod scene;
pub mod simulation;

pub use config::SkyflightConfig;
pub use errors::SkyflightErrors;
pub use simulation::Simulation;
