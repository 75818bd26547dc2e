//! 2D vector math.
//!
//! Angles follow the world convention: clockwise from +Y, so the unit vector
//! of angle `θ` is `(sin θ, cos θ)`.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 2D point / vector - positions, velocities, offsets
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Point {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Point {
    /// Creates a new point
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Builds a vector from a magnitude and a world-convention angle.
    #[inline]
    #[must_use]
    pub fn from_vector_form(magnitude: f32, direction: f32) -> Self {
        Self::new(magnitude * direction.sin(), magnitude * direction.cos())
    }

    /// Dot product
    #[inline]
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Length squared (avoids sqrt)
    #[inline]
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length
    #[inline]
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Distance to another point
    #[inline]
    #[must_use]
    pub fn distance_to(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Angle of the vector pointing from `self` to `other`.
    #[inline]
    #[must_use]
    pub fn angle_to(self, other: Self) -> f32 {
        (other.x - self.x).atan2(other.y - self.y)
    }

    /// Angle of this vector, in the world convention.
    #[inline]
    #[must_use]
    pub fn angle(self) -> f32 {
        self.x.atan2(self.y)
    }

    /// Rotates the vector clockwise by `angle` radians.
    #[inline]
    #[must_use]
    pub fn rotated(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos + self.y * sin, self.y * cos - self.x * sin)
    }

    /// True for the zero vector.
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// True when both components are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::SubAssign for Point {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Mul<f32> for Point {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Neg for Point {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_vector_form_convention() {
        let up = Point::from_vector_form(1.0, 0.0);
        assert!((up.x).abs() < 1e-6);
        assert!((up.y - 1.0).abs() < 1e-6);

        let right = Point::from_vector_form(2.0, FRAC_PI_2);
        assert!((right.x - 2.0).abs() < 1e-6);
        assert!(right.y.abs() < 1e-6);
    }

    #[test]
    fn test_angle_to_matches_vector_form() {
        let a = Point::new(15.0, 0.0);
        let b = Point::new(0.0, 0.0);
        let dir = a.angle_to(b);
        let unit = Point::from_vector_form(1.0, dir);
        assert!((unit.x + 1.0).abs() < 1e-6);
        assert!(unit.y.abs() < 1e-6);
    }

    #[test]
    fn test_rotation_is_clockwise() {
        let v = Point::new(0.0, 1.0).rotated(FRAC_PI_2);
        assert!((v.x - 1.0).abs() < 1e-6);
        assert!(v.y.abs() < 1e-6);

        let back = v.rotated(-FRAC_PI_2);
        assert!(back.x.abs() < 1e-6);
        assert!((back.y - 1.0).abs() < 1e-6);

        let flipped = Point::new(3.0, 4.0).rotated(PI);
        assert!((flipped.x + 3.0).abs() < 1e-5);
        assert!((flipped.y + 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_point_bytemuck() {
        let p = Point::new(1.0, 2.0);
        let bytes: &[u8] = bytemuck::bytes_of(&p);
        assert_eq!(bytes.len(), 8);
    }
}
