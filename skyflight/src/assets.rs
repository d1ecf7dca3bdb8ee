use crate::config::ModelConfig;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum ModelState {
    Pending,
    Ready,
    Failed(String),
}

/// Load status of the craft's 3D model. The host does the actual loading and
/// reports back; physics never waits on it.
#[derive(Debug, Clone, PartialEq)]
pub struct CraftModel {
    path: String,
    scale: f64,
    state: ModelState,
}

impl CraftModel {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            path: config.path.clone(),
            scale: config.scale,
            state: ModelState::Pending,
        }
    }

    pub fn mark_ready(&mut self) {
        debug!("craft model '{}' loaded", self.path);
        self.state = ModelState::Ready;
    }

    pub fn mark_failed(&mut self, reason: &str) {
        warn!("failed to load craft model '{}': {reason}", self.path);
        self.state = ModelState::Failed(reason.to_string());
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == ModelState::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_lifecycle() {
        let mut model = CraftModel::new(&ModelConfig::default());
        assert_eq!(model.path(), "/Spaceship.glb");
        assert_eq!(model.scale(), 0.3);
        assert_eq!(model.state(), &ModelState::Pending);
        assert!(!model.is_visible());

        model.mark_failed("404");
        assert_eq!(model.state(), &ModelState::Failed("404".to_string()));
        assert!(!model.is_visible());

        model.mark_ready();
        assert!(model.is_visible());
    }
}
