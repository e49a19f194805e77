//! Minimal Cartesian three-vector used for momenta and positions.

use std::f64::consts::PI;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cartesian 3-vector (GeV/c for momenta, cm for positions).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThreeVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ThreeVector {
    /// Marker written into trajectory samples that could not be computed.
    pub const SENTINEL: Self = Self::new(-9999.0, -9999.0, -9999.0);

    /// Origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Build from a `[x, y, z]` array.
    #[must_use]
    pub const fn from_array(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }

    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[must_use]
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[must_use]
    pub fn mag2(&self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub fn mag(&self) -> f64 {
        self.mag2().sqrt()
    }

    /// Squared transverse component.
    #[must_use]
    pub fn perp2(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Transverse component (pt for momenta, radius for positions).
    #[must_use]
    pub fn perp(&self) -> f64 {
        self.perp2().sqrt()
    }

    /// Azimuth in `[0, 2π)`.
    #[must_use]
    pub fn phi(&self) -> f64 {
        if self.x == 0.0 && self.y == 0.0 {
            return 0.0;
        }
        let phi = self.y.atan2(self.x);
        if phi < 0.0 {
            phi + 2.0 * PI
        } else {
            phi
        }
    }

    /// Pseudorapidity. Vectors along the beam axis map to `±1e10`.
    #[must_use]
    pub fn eta(&self) -> f64 {
        let p = self.mag();
        let pt = self.perp();
        if pt == 0.0 {
            return if self.z >= 0.0 { 1e10 } else { -1e10 };
        }
        ((p + self.z) / pt).ln()
    }

    /// Polar angle.
    #[must_use]
    pub fn theta(&self) -> f64 {
        self.perp().atan2(self.z)
    }
}

impl Add for ThreeVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for ThreeVector {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for ThreeVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for ThreeVector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for ThreeVector {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl From<[f64; 3]> for ThreeVector {
    fn from(v: [f64; 3]) -> Self {
        Self::from_array(v)
    }
}

/// Lorentz 4-vector (x, y, z, t), used for emission points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FourVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub t: f64,
}

impl FourVector {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, t: f64) -> Self {
        Self { x, y, z, t }
    }

    #[must_use]
    pub fn spatial(&self) -> ThreeVector {
        ThreeVector::new(self.x, self.y, self.z)
    }
}

impl Sub for FourVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z, self.t - rhs.t)
    }
}

impl Mul<f64> for FourVector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs, self.t * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_phi_range() {
        assert_relative_eq!(ThreeVector::new(1.0, 0.0, 0.0).phi(), 0.0);
        assert_relative_eq!(ThreeVector::new(0.0, -1.0, 0.0).phi(), 1.5 * PI);
        assert_relative_eq!(ThreeVector::new(-1.0, 0.0, 0.0).phi(), PI);
    }

    #[test]
    fn test_eta() {
        assert_relative_eq!(ThreeVector::new(1.0, 0.0, 0.0).eta(), 0.0);
        let v = ThreeVector::new(0.5, 0.0, 0.2);
        let expected = (0.2_f64 / 0.5).asinh();
        assert_relative_eq!(v.eta(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_cross_and_dot() {
        let a = ThreeVector::new(1.0, 0.0, 0.0);
        let b = ThreeVector::new(0.0, 1.0, 0.0);
        assert_eq!(a.cross(&b), ThreeVector::new(0.0, 0.0, 1.0));
        assert_relative_eq!(a.dot(&b), 0.0);
    }

    #[test]
    fn test_sentinel() {
        assert!(ThreeVector::SENTINEL.is_sentinel());
        assert!(!ThreeVector::ZERO.is_sentinel());
    }
}
