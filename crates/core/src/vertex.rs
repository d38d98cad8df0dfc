//! 2D points and vectors.
//!
//! A [`Vertex`] is a plain value: it is `Copy`, so handing one to a node or a
//! transform always hands over a private copy. The in-place methods exist for
//! builders that own their vertex outright.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Tolerance used by [`Vertex::equals`] and the transform algebra.
pub const TOLERANCE: f64 = 1e-6;

/// A point or displacement in some node's coordinate frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vertex(pub DVec2);

impl Vertex {
    pub const ORIGIN: Vertex = Vertex(DVec2::ZERO);

    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn set_x(&mut self, x: f64) {
        self.0.x = x;
    }

    pub fn set_y(&mut self, y: f64) {
        self.0.y = y;
    }

    pub fn dot(&self, other: Vertex) -> f64 {
        self.0.dot(other.0)
    }

    pub fn norm2(&self) -> f64 {
        self.0.length_squared()
    }

    pub fn norm(&self) -> f64 {
        self.0.length()
    }

    pub fn is_nan(&self) -> bool {
        self.0.is_nan()
    }

    /// True if both coordinates lie within `tolerance` of `other`'s.
    /// NaN is never close to anything.
    pub fn close_to(&self, other: Vertex, tolerance: f64) -> bool {
        if self.is_nan() || other.is_nan() {
            return false;
        }
        (self.x() - other.x()).abs() < tolerance && (self.y() - other.y()).abs() < tolerance
    }

    pub fn equals(&self, other: Vertex) -> bool {
        self.close_to(other, TOLERANCE)
    }

    pub fn is_zero(&self) -> bool {
        self.equals(Vertex::ORIGIN)
    }

    pub fn translated_by(&self, offset: Vertex) -> Vertex {
        *self + offset
    }

    /// Rotation about the origin:
    /// `(x, y) -> (cos a * x + sin a * y, -sin a * x + cos a * y)`.
    pub fn centrally_rotated_by(&self, angle: f64) -> Vertex {
        let (sin, cos) = angle.sin_cos();
        Vertex::new(
            cos * self.x() + sin * self.y(),
            -sin * self.x() + cos * self.y(),
        )
    }

    pub fn rotated_by(&self, angle: f64, center: Vertex) -> Vertex {
        (*self - center).centrally_rotated_by(angle) + center
    }

    pub fn centrally_scaled_by(&self, factor: f64) -> Vertex {
        *self * factor
    }

    pub fn scaled_by(&self, factor: f64, center: Vertex) -> Vertex {
        (*self - center) * factor + center
    }

    pub fn interpolate(&self, other: Vertex, weight: f64) -> Vertex {
        Vertex(self.0.lerp(other.0, weight))
    }

    pub fn opposite(&self) -> Vertex {
        -*self
    }

    pub fn translate_by(&mut self, offset: Vertex) {
        self.0 += offset.0;
    }

    pub fn scale_by(&mut self, factor: f64) {
        self.0 *= factor;
    }
}

impl From<DVec2> for Vertex {
    fn from(v: DVec2) -> Self {
        Self(v)
    }
}

impl From<Vertex> for DVec2 {
    fn from(v: Vertex) -> Self {
        v.0
    }
}

impl From<(f64, f64)> for Vertex {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl Add for Vertex {
    type Output = Vertex;

    fn add(self, rhs: Vertex) -> Vertex {
        Vertex(self.0 + rhs.0)
    }
}

impl AddAssign for Vertex {
    fn add_assign(&mut self, rhs: Vertex) {
        self.0 += rhs.0;
    }
}

impl Sub for Vertex {
    type Output = Vertex;

    fn sub(self, rhs: Vertex) -> Vertex {
        Vertex(self.0 - rhs.0)
    }
}

impl SubAssign for Vertex {
    fn sub_assign(&mut self, rhs: Vertex) {
        self.0 -= rhs.0;
    }
}

impl Mul<f64> for Vertex {
    type Output = Vertex;

    fn mul(self, rhs: f64) -> Vertex {
        Vertex(self.0 * rhs)
    }
}

impl Neg for Vertex {
    type Output = Vertex;

    fn neg(self) -> Vertex {
        Vertex(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_rotation_convention() {
        let v = Vertex::new(1.0, 0.0);
        let r = v.centrally_rotated_by(FRAC_PI_2);
        assert!(r.equals(Vertex::new(0.0, -1.0)));
    }

    #[test]
    fn test_rotation_about_center() {
        let v = Vertex::new(2.0, 1.0);
        let r = v.rotated_by(FRAC_PI_2, Vertex::new(1.0, 1.0));
        assert!(r.equals(Vertex::new(1.0, 0.0)));
    }

    #[test]
    fn test_scaled_by_center() {
        let v = Vertex::new(3.0, 3.0);
        assert_eq!(v.scaled_by(2.0, Vertex::new(1.0, 1.0)), Vertex::new(5.0, 5.0));
    }

    #[test]
    fn test_close_to_rejects_nan() {
        let nan = Vertex::new(f64::NAN, 0.0);
        assert!(!nan.close_to(nan, 1.0));
        assert!(Vertex::new(1.0, 1.0).close_to(Vertex::new(1.5, 0.5), 1.0));
    }

    #[test]
    fn test_interpolate_and_norm() {
        let a = Vertex::new(0.0, 0.0);
        let b = Vertex::new(3.0, 4.0);
        assert_eq!(a.interpolate(b, 0.5), Vertex::new(1.5, 2.0));
        assert_eq!(b.norm(), 5.0);
        assert_eq!(b.norm2(), 25.0);
        assert_eq!(b.dot(Vertex::new(1.0, 1.0)), 7.0);
    }

    #[test]
    fn test_value_semantics() {
        let a = Vertex::new(1.0, 2.0);
        let mut b = a;
        b.translate_by(Vertex::new(1.0, 1.0));
        assert_eq!(a, Vertex::new(1.0, 2.0));
        assert_eq!(b, Vertex::new(2.0, 3.0));
    }
}
