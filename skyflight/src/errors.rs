use crate::config::ConfigErrors;
use celestial::CelestialErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkyflightErrors {
    #[error("ConfigError: {0}")]
    ConfigError(#[from] ConfigErrors),
    #[error("CelestialError: {0}")]
    CelestialError(#[from] CelestialErrors),
    #[error("unknown teleport destination '{0}'")]
    UnknownDestination(String),
}
