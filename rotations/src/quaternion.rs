use super::*;
use crate::axis_angle::AxisAngle;
use crate::rotation_matrix::RotationMatrix;
use nalgebra::{Vector3, Vector4};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg};
use thiserror::Error;

/// A struct representing a quaternion for 3D rotations.
///
/// Components follow the Hamilton convention with the scalar stored last,
/// matching the layout the renderer expects (`x, y, z, w`).
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

/// Errors that can occur when creating a `Quaternion`.
#[derive(Debug, Clone, Error, Copy, PartialEq)]
pub enum QuaternionErrors {
    #[error("got zero magnitude quaternion")]
    ZeroMagnitude,
    #[error("got non-finite quaternion component")]
    NotFinite,
}

impl Quaternion {
    /// Creates an identity quaternion.
    ///
    /// # Returns
    ///
    /// A `Quaternion` representing no rotation.
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    // Dot product of two quaternions
    pub fn dot(&self, other: &Quaternion) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn conjugate(&self) -> Quaternion {
        Quaternion::new(-self.x, -self.y, -self.z, self.w)
    }

    pub fn mag(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn normalize(&self) -> Result<Self, QuaternionErrors> {
        let mag = self.mag();
        if !mag.is_finite() {
            return Err(QuaternionErrors::NotFinite);
        }
        if mag < f64::EPSILON {
            return Err(QuaternionErrors::ZeroMagnitude);
        }
        Ok(Quaternion::new(
            self.x / mag,
            self.y / mag,
            self.z / mag,
            self.w / mag,
        ))
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Debug for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quaternion {{ x: {:.6}, y: {:.6}, z: {:.6}, w: {:.6} }}",
            self.x, self.y, self.z, self.w
        )
    }
}

impl Mul<Quaternion> for Quaternion {
    type Output = Self;

    /// Hamilton product. `a * b` applies `b` first, then `a`.
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

impl Mul<f64> for Quaternion {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs, self.w * rhs)
    }
}

impl Add<Quaternion> for Quaternion {
    type Output = Self;

    /// Component-wise sum. Only meaningful as an interpolation step; the
    /// result has to be renormalized before it is used as a rotation.
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z, self.w + rhs.w)
    }
}

impl Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl From<Vector4<f64>> for Quaternion {
    fn from(q: Vector4<f64>) -> Self {
        Self { x: q[0], y: q[1], z: q[2], w: q[3] }
    }
}

/// A quaternion known to have unit length. Every orientation in the
/// simulation (craft, camera, bodies) is stored as one of these.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct UnitQuaternion(pub(crate) Quaternion);

impl UnitQuaternion {
    pub const IDENTITY: Self = Self(Quaternion::IDENTITY);

    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Result<Self, QuaternionErrors> {
        Ok(Self(Quaternion::new(x, y, z, w).normalize()?))
    }

    /// Rotation of `angle` radians about `axis`. A zero axis yields the identity.
    pub fn from_axis_angle(axis: &Vector3<f64>, angle: f64) -> Self {
        match AxisAngle::new(angle, *axis) {
            Ok(axis_angle) => UnitQuaternion::from(&axis_angle),
            Err(_) => Self::IDENTITY,
        }
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn z(&self) -> f64 {
        self.0.z
    }

    pub fn w(&self) -> f64 {
        self.0.w
    }

    /// Components as `[x, y, z, w]`.
    pub fn to_array(&self) -> [f64; 4] {
        [self.0.x, self.0.y, self.0.z, self.0.w]
    }

    pub fn dot(&self, other: &UnitQuaternion) -> f64 {
        self.0.dot(&other.0)
    }

    /// Smallest rotation angle (radians, in `[0, π]`) taking `self` onto `other`.
    pub fn angle_to(&self, other: &UnitQuaternion) -> f64 {
        2.0 * self.dot(other).abs().clamp(-1.0, 1.0).acos()
    }

    /// Spherical linear interpolation along the shorter arc.
    ///
    /// `t` is clamped to `[0, 1]`; `t == 0` returns `self` and `t == 1`
    /// returns `other`. The result is always renormalized.
    pub fn slerp(&self, other: &UnitQuaternion, t: f64) -> UnitQuaternion {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        if t == 0.0 {
            return *self;
        }
        if t == 1.0 {
            return *other;
        }

        let q1 = self.0;
        let mut cos_half_theta = q1.dot(&other.0);

        // q and -q are the same rotation, flip to take the short way round
        let q2 = if cos_half_theta < 0.0 {
            cos_half_theta = -cos_half_theta;
            -other.0
        } else {
            other.0
        };

        if cos_half_theta >= 1.0 {
            return *self;
        }

        let sqr_sin_half_theta = 1.0 - cos_half_theta * cos_half_theta;
        let blended = if sqr_sin_half_theta <= f64::EPSILON {
            // nearly parallel, fall back to normalized lerp
            q1 * (1.0 - t) + q2 * t
        } else {
            let sin_half_theta = sqr_sin_half_theta.sqrt();
            let half_theta = sin_half_theta.atan2(cos_half_theta);
            let ratio_a = ((1.0 - t) * half_theta).sin() / sin_half_theta;
            let ratio_b = (t * half_theta).sin() / sin_half_theta;
            q1 * ratio_a + q2 * ratio_b
        };

        blended.normalize().map(UnitQuaternion).unwrap_or(*self)
    }

    /// Orientation whose local −Z axis points along `forward`, with local +Y
    /// kept as close to `up` as possible.
    ///
    /// Returns `None` when `forward` has no direction.
    pub fn look_at(forward: &Vector3<f64>, up: &Vector3<f64>) -> Option<UnitQuaternion> {
        RotationMatrix::look_at(forward, up).map(|m| UnitQuaternion::from(&m))
    }
}

impl TryFrom<&Quaternion> for UnitQuaternion {
    type Error = QuaternionErrors;
    fn try_from(value: &Quaternion) -> Result<Self, QuaternionErrors> {
        Ok(Self(value.normalize()?))
    }
}

impl From<&UnitQuaternion> for Quaternion {
    fn from(value: &UnitQuaternion) -> Self {
        value.0
    }
}

impl RotationTrait for UnitQuaternion {
    /// Rotates a vector by the quaternion, `q v q*`.
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        let u = Vector3::new(self.0.x, self.0.y, self.0.z);
        let w = self.0.w;
        let uv = u.cross(v);
        let uuv = u.cross(&uv);
        v + (uv * w + uuv) * 2.0
    }

    /// Expresses a world vector in the rotated frame, `q* v q`.
    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.inv().rotate(v)
    }

    fn identity() -> Self {
        Self::IDENTITY
    }

    fn inv(&self) -> Self {
        // conjugate of a unit quaternion is its inverse, no renormalize needed
        UnitQuaternion(self.0.conjugate())
    }
}

impl Mul<UnitQuaternion> for UnitQuaternion {
    type Output = Self;
    fn mul(self, rhs: UnitQuaternion) -> Self::Output {
        let q = self.0 * rhs.0;
        // products drift off unit length slowly, pull them back
        q.normalize().map(UnitQuaternion).unwrap_or(self)
    }
}

impl From<&AxisAngle> for UnitQuaternion {
    fn from(axis_angle: &AxisAngle) -> Self {
        let half = axis_angle.angle * 0.5;
        let s = half.sin();
        UnitQuaternion(Quaternion::new(
            axis_angle.axis[0] * s,
            axis_angle.axis[1] * s,
            axis_angle.axis[2] * s,
            half.cos(),
        ))
    }
}

impl From<&RotationMatrix> for UnitQuaternion {
    /// Converts a `RotationMatrix` to a `UnitQuaternion`.
    /// Picks the largest of the four candidate divisors so the
    /// conversion stays well conditioned for any rotation.
    fn from(matrix: &RotationMatrix) -> Self {
        let m = matrix.get_value();
        let (m11, m12, m13) = (m[(0, 0)], m[(0, 1)], m[(0, 2)]);
        let (m21, m22, m23) = (m[(1, 0)], m[(1, 1)], m[(1, 2)]);
        let (m31, m32, m33) = (m[(2, 0)], m[(2, 1)], m[(2, 2)]);
        let trace = m11 + m22 + m33;

        let q = if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            Quaternion::new((m32 - m23) * s, (m13 - m31) * s, (m21 - m12) * s, 0.25 / s)
        } else if m11 > m22 && m11 > m33 {
            let s = 2.0 * (1.0 + m11 - m22 - m33).sqrt();
            Quaternion::new(0.25 * s, (m12 + m21) / s, (m13 + m31) / s, (m32 - m23) / s)
        } else if m22 > m33 {
            let s = 2.0 * (1.0 + m22 - m11 - m33).sqrt();
            Quaternion::new((m12 + m21) / s, 0.25 * s, (m23 + m32) / s, (m13 - m31) / s)
        } else {
            let s = 2.0 * (1.0 + m33 - m11 - m22).sqrt();
            Quaternion::new((m13 + m31) / s, (m23 + m32) / s, 0.25 * s, (m21 - m12) / s)
        };

        q.normalize().map(UnitQuaternion).unwrap_or(UnitQuaternion::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};
    const TOL: f64 = 1e-12;

    /// Test for quaternion normalization.
    #[test]
    fn test_quaternion_normalization() {
        let q = Quaternion::new(1.0, 2.0, 3.0, 4.0).normalize().unwrap();
        let qn = UnitQuaternion::new(1.0, 2.0, 3.0, 4.0).unwrap();

        assert_abs_diff_eq!(q.x, 0.18257418583505536, epsilon = TOL);
        assert_abs_diff_eq!(q.y, 0.3651483716701107, epsilon = TOL);
        assert_abs_diff_eq!(q.z, 0.5477225575051661, epsilon = TOL);
        assert_abs_diff_eq!(q.w, 0.7302967433402214, epsilon = TOL);

        assert_abs_diff_eq!(qn.x(), q.x, epsilon = TOL);
        assert_abs_diff_eq!(qn.w(), q.w, epsilon = TOL);
    }

    #[test]
    fn test_zero_quaternion_rejected() {
        assert_eq!(
            UnitQuaternion::new(0.0, 0.0, 0.0, 0.0),
            Err(QuaternionErrors::ZeroMagnitude)
        );
        assert_eq!(
            UnitQuaternion::new(f64::NAN, 0.0, 0.0, 1.0),
            Err(QuaternionErrors::NotFinite)
        );
    }

    #[test]
    fn test_rotate_about_y() {
        let q = UnitQuaternion::from_axis_angle(&WORLD_UP, FRAC_PI_2);
        let v = q.rotate(&Vector3::new(1.0, 0.0, 0.0));
        // right handed: +X goes to -Z after a quarter turn about +Y
        assert_abs_diff_eq!(v, Vector3::new(0.0, 0.0, -1.0), epsilon = TOL);

        let back = q.transform(&v);
        assert_abs_diff_eq!(back, Vector3::new(1.0, 0.0, 0.0), epsilon = TOL);
    }

    #[test]
    fn test_hamilton_product_order() {
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::y(), FRAC_PI_2);
        let pitch = UnitQuaternion::from_axis_angle(&Vector3::x(), FRAC_PI_2);
        // pitch first, then yaw
        let q = yaw * pitch;
        let v = q.rotate(&Vector3::new(0.0, 0.0, -1.0));
        let expected = yaw.rotate(&pitch.rotate(&Vector3::new(0.0, 0.0, -1.0)));
        assert_abs_diff_eq!(v, expected, epsilon = TOL);
    }

    #[test]
    fn test_angle_to() {
        let a = UnitQuaternion::IDENTITY;
        let b = UnitQuaternion::from_axis_angle(&Vector3::z(), 0.75);
        assert_abs_diff_eq!(a.angle_to(&b), 0.75, epsilon = 1e-9);
        assert_abs_diff_eq!(a.angle_to(&a), 0.0, epsilon = 1e-9);

        // q and -q describe the same orientation
        let neg = UnitQuaternion(-b.0);
        assert_abs_diff_eq!(b.angle_to(&neg), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_slerp_endpoints_and_midpoint() {
        let a = UnitQuaternion::IDENTITY;
        let b = UnitQuaternion::from_axis_angle(&Vector3::y(), PI / 2.0);

        assert_eq!(a.slerp(&b, 0.0), a);
        assert_eq!(a.slerp(&b, 1.0), b);
        assert_eq!(a.slerp(&b, 2.0), b);
        assert_eq!(a.slerp(&b, -1.0), a);

        let mid = a.slerp(&b, 0.5);
        assert_abs_diff_eq!(a.angle_to(&mid), PI / 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(mid.0.mag(), 1.0, epsilon = TOL);
    }

    #[test]
    fn test_slerp_takes_short_arc() {
        let a = UnitQuaternion::from_axis_angle(&Vector3::y(), 0.1);
        let b = UnitQuaternion(-UnitQuaternion::from_axis_angle(&Vector3::y(), 0.3).0);
        let mid = a.slerp(&b, 0.5);
        let expected = UnitQuaternion::from_axis_angle(&Vector3::y(), 0.2);
        assert_abs_diff_eq!(mid.angle_to(&expected), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_matrix_round_trip() {
        let q = UnitQuaternion::new(0.3, -0.5, 0.2, 0.8).unwrap();
        let m = RotationMatrix::from(&q);
        let q2 = UnitQuaternion::from(&m);
        assert_abs_diff_eq!(q.angle_to(&q2), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_look_at_points_negative_z_along_forward() {
        let forward = Vector3::new(1.0, 0.0, 1.0).normalize();
        let q = UnitQuaternion::look_at(&forward, &WORLD_UP).unwrap();
        let local_forward = q.rotate(&Vector3::new(0.0, 0.0, -1.0));
        assert_abs_diff_eq!(local_forward, forward, epsilon = 1e-9);
        let local_up = q.rotate(&Vector3::new(0.0, 1.0, 0.0));
        assert_abs_diff_eq!(local_up, WORLD_UP, epsilon = 1e-9);

        assert!(UnitQuaternion::look_at(&Vector3::zeros(), &WORLD_UP).is_none());
    }
}
