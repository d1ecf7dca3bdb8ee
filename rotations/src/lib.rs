pub mod axis_angle;
pub mod basis;
pub mod quaternion;
pub mod rotation_matrix;

use nalgebra::Vector3;

pub mod prelude {
    pub use crate::axis_angle::*;
    pub use crate::basis::*;
    pub use crate::quaternion::*;
    pub use crate::rotation_matrix::*;
    pub use crate::{RotationTrait, WORLD_UP};
}

/// The world's vertical axis. Every look-at basis in the simulation is built against it.
pub const WORLD_UP: Vector3<f64> = Vector3::new(0.0, 1.0, 0.0);

/// Magnitudes below this are treated as zero before normalizing.
pub const DEGENERATE_EPSILON: f64 = 1e-12;

/// Trait defining rotation and transformation operations.
pub trait RotationTrait {
    /// Rotates a vector by the rotation (active rotation).
    ///
    /// # Arguments
    ///
    /// * `v` - The vector to be rotated.
    ///
    /// # Returns
    ///
    /// The rotated vector.
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64>;

    /// Transforms a vector by the rotation (passive rotation), i.e. expresses
    /// a world vector in the rotated frame.
    ///
    /// # Arguments
    ///
    /// * `v` - The vector to be transformed.
    ///
    /// # Returns
    ///
    /// The transformed vector.
    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64>;

    fn inv(&self) -> Self;

    fn identity() -> Self;
}

/// Normalizes `v`, returning `None` when it is too short to have a direction.
pub fn try_normalize(v: &Vector3<f64>) -> Option<Vector3<f64>> {
    let mag = v.norm();
    if mag < DEGENERATE_EPSILON || !mag.is_finite() {
        None
    } else {
        Some(v / mag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_try_normalize() {
        let v = try_normalize(&Vector3::new(3.0, 0.0, 4.0)).unwrap();
        assert_abs_diff_eq!(v, Vector3::new(0.6, 0.0, 0.8), epsilon = TOL);
        assert!(try_normalize(&Vector3::zeros()).is_none());
        assert!(try_normalize(&Vector3::new(f64::NAN, 0.0, 0.0)).is_none());
    }
}
