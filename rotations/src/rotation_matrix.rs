use super::*;
use crate::quaternion::UnitQuaternion;
use nalgebra::{Matrix3, Vector3};
use std::ops::Mul;

/// A struct representing a 3x3 rotation matrix. Columns are the rotated
/// frame's x, y and z axes expressed in world coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RotationMatrix(pub Matrix3<f64>);

/// Errors that can occur when creating a `RotationMatrix`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RotationMatrixError {
    /// Occurs when a column vector has zero magnitude.
    ZeroMagnitudeColumn,
}

impl RotationMatrix {
    /// Creates a new `RotationMatrix` from its three column axes,
    /// normalizing each one.
    ///
    /// # Arguments
    ///
    /// * `x_axis`, `y_axis`, `z_axis` - The rotated frame's axes in world coordinates.
    ///
    /// # Returns
    ///
    /// A `Result` which is `Ok` containing a new `RotationMatrix` if columns are valid,
    /// or an `Err` containing a `RotationMatrixError`.
    pub fn from_columns(
        x_axis: &Vector3<f64>,
        y_axis: &Vector3<f64>,
        z_axis: &Vector3<f64>,
    ) -> Result<Self, RotationMatrixError> {
        let x = try_normalize(x_axis).ok_or(RotationMatrixError::ZeroMagnitudeColumn)?;
        let y = try_normalize(y_axis).ok_or(RotationMatrixError::ZeroMagnitudeColumn)?;
        let z = try_normalize(z_axis).ok_or(RotationMatrixError::ZeroMagnitudeColumn)?;
        Ok(Self(Matrix3::from_columns(&[x, y, z])))
    }

    /// Look-at basis for an object at the origin facing `forward`.
    ///
    /// The local +Z column points opposite to `forward` (so the object's
    /// −Z faces it), x = up × z and y = z × x. When `forward` is parallel
    /// to `up` the z axis is nudged slightly so a basis can still be formed.
    pub fn look_at(forward: &Vector3<f64>, up: &Vector3<f64>) -> Option<Self> {
        let mut z = try_normalize(&(-forward))?;
        let mut x = up.cross(&z);

        if x.norm_squared() < DEGENERATE_EPSILON {
            if (up[2].abs() - 1.0).abs() < DEGENERATE_EPSILON {
                z[0] += 0.0001;
            } else {
                z[2] += 0.0001;
            }
            z = try_normalize(&z)?;
            x = up.cross(&z);
        }

        let x = try_normalize(&x)?;
        let y = z.cross(&x);
        Self::from_columns(&x, &y, &z).ok()
    }

    pub fn get_value(&self) -> Matrix3<f64> {
        self.0
    }
}

impl From<Matrix3<f64>> for RotationMatrix {
    fn from(value: Matrix3<f64>) -> Self {
        Self(value)
    }
}

impl From<&UnitQuaternion> for RotationMatrix {
    /// Converts a `UnitQuaternion` into a `RotationMatrix`.
    fn from(q: &UnitQuaternion) -> Self {
        let (x, y, z, w) = (q.x(), q.y(), q.z(), q.w());

        let e11 = 1.0 - 2.0 * (y * y + z * z);
        let e12 = 2.0 * (x * y - w * z);
        let e13 = 2.0 * (x * z + w * y);
        let e21 = 2.0 * (x * y + w * z);
        let e22 = 1.0 - 2.0 * (x * x + z * z);
        let e23 = 2.0 * (y * z - w * x);
        let e31 = 2.0 * (x * z - w * y);
        let e32 = 2.0 * (y * z + w * x);
        let e33 = 1.0 - 2.0 * (x * x + y * y);

        RotationMatrix(Matrix3::new(e11, e12, e13, e21, e22, e23, e31, e32, e33))
    }
}

impl Mul<RotationMatrix> for RotationMatrix {
    type Output = Self;
    fn mul(self, rhs: RotationMatrix) -> Self {
        Self(self.0 * rhs.0)
    }
}

impl RotationTrait for RotationMatrix {
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.0 * v
    }

    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.0.transpose() * v
    }

    fn inv(&self) -> Self {
        Self(self.0.transpose())
    }

    fn identity() -> Self {
        Self(Matrix3::identity())
    }
}
