//! Orthonormal view bases built from a forward direction and world up.
//!
//! Camera-local axes are +X right, +Y up and −Z forward for the chase camera
//! pose. The craft's thrust mapping uses the same local layout over
//! `thrust_frame`, whose right axis is mirrored.

use crate::prelude::{RotationMatrix, UnitQuaternion};
use crate::try_normalize;
use nalgebra::Vector3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBasis {
    pub forward: Vector3<f64>,
    pub right: Vector3<f64>,
    pub up: Vector3<f64>,
}

impl ViewBasis {
    /// right = forward × world_up, up = right × forward.
    ///
    /// Returns `None` for a zero forward vector or one parallel to `world_up`.
    pub fn from_forward(forward: &Vector3<f64>, world_up: &Vector3<f64>) -> Option<Self> {
        let forward = try_normalize(forward)?;
        let right = try_normalize(&forward.cross(world_up))?;
        let up = try_normalize(&right.cross(&forward))?;
        Some(Self { forward, right, up })
    }

    /// Control frame for thrust input: right = world_up × forward,
    /// up = forward × right. Its right axis is the negation of
    /// `from_forward`'s, so +X input pushes toward the view's left.
    ///
    /// Returns `None` under the same conditions as `from_forward`.
    pub fn thrust_frame(forward: &Vector3<f64>, world_up: &Vector3<f64>) -> Option<Self> {
        let forward = try_normalize(forward)?;
        let right = try_normalize(&world_up.cross(&forward))?;
        let up = try_normalize(&forward.cross(&right))?;
        Some(Self { forward, right, up })
    }

    /// Maps a camera-local vector into world space.
    pub fn to_world(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.forward * (-local[2]) + self.right * local[0] + self.up * local[1]
    }

    /// Orientation whose local axes are (right, up, −forward).
    pub fn orientation(&self) -> UnitQuaternion {
        RotationMatrix::from_columns(&self.right, &self.up, &(-self.forward))
            .map(|m| UnitQuaternion::from(&m))
            .unwrap_or(UnitQuaternion::IDENTITY)
    }
}
