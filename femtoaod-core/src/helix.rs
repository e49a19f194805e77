//! Charged-particle helix in a uniform solenoidal field along z.
//!
//! The helix is parametrised by the transverse arc length `s` measured from
//! the origin point. With `w = c·q·B / pt` (signed curvature):
//!
//! ```text
//! x(s) = x0 + (sin φ0 - sin(φ0 - w s)) / w
//! y(s) = y0 + (cos(φ0 - w s) - cos φ0) / w
//! z(s) = z0 + s · pz / pt
//! ```
#![allow(clippy::similar_names)]

use std::f64::consts::PI;

use crate::vector::ThreeVector;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Curvature constant in GeV / (T · cm).
pub const C_LIGHT: f64 = 0.299_792_458e-2;

/// Tesla per kilogauss.
pub const KILOGAUSS: f64 = 0.1;

/// Helix descriptor: origin, momentum, charge and field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Helix {
    /// Point the helix starts from (cm).
    pub origin: ThreeVector,
    /// Momentum at the origin (GeV/c).
    pub momentum: ThreeVector,
    /// Charge in units of e.
    pub charge: i32,
    /// Field along z in tesla.
    pub field: f64,
}

impl Helix {
    #[must_use]
    pub fn new(origin: ThreeVector, momentum: ThreeVector, charge: i32, field: f64) -> Self {
        Self {
            origin,
            momentum,
            charge,
            field,
        }
    }

    /// Signed curvature `w` in 1/cm. Zero for neutral tracks or zero field.
    #[must_use]
    pub fn curvature(&self) -> f64 {
        let pt = self.momentum.perp();
        if pt == 0.0 {
            return 0.0;
        }
        C_LIGHT * f64::from(self.charge) * self.field / pt
    }

    /// Unsigned radius of the transverse circle, `None` for straight lines.
    #[must_use]
    pub fn radius(&self) -> Option<f64> {
        let w = self.curvature();
        (w != 0.0).then(|| 1.0 / w.abs())
    }

    /// Centre of the transverse circle, `None` for straight lines.
    #[must_use]
    pub fn center(&self) -> Option<(f64, f64)> {
        let w = self.curvature();
        if w == 0.0 {
            return None;
        }
        let phi0 = self.momentum.y.atan2(self.momentum.x);
        Some((
            self.origin.x + phi0.sin() / w,
            self.origin.y - phi0.cos() / w,
        ))
    }

    /// Position after transverse arc length `s`.
    #[must_use]
    pub fn at(&self, s: f64) -> ThreeVector {
        let pt = self.momentum.perp();
        if pt == 0.0 {
            return self.origin;
        }
        let phi0 = self.momentum.y.atan2(self.momentum.x);
        let w = self.curvature();
        let z = self.origin.z + s * self.momentum.z / pt;
        if w == 0.0 {
            return ThreeVector::new(
                self.origin.x + s * phi0.cos(),
                self.origin.y + s * phi0.sin(),
                z,
            );
        }
        let psi = phi0 - w * s;
        ThreeVector::new(
            self.origin.x + (phi0.sin() - psi.sin()) / w,
            self.origin.y + (psi.cos() - phi0.cos()) / w,
            z,
        )
    }

    /// Momentum direction after transverse arc length `s`.
    #[must_use]
    pub fn momentum_at(&self, s: f64) -> ThreeVector {
        let pt = self.momentum.perp();
        let psi = self.momentum.y.atan2(self.momentum.x) - self.curvature() * s;
        ThreeVector::new(pt * psi.cos(), pt * psi.sin(), self.momentum.z)
    }

    /// Smallest non-negative arc length at which the helix crosses the
    /// cylinder of radius `r` around the z axis.
    #[must_use]
    pub fn path_length_to_radius(&self, r: f64) -> Option<f64> {
        let pt = self.momentum.perp();
        if pt == 0.0 || r < 0.0 {
            return None;
        }
        let phi0 = self.momentum.y.atan2(self.momentum.x);
        let w = self.curvature();

        if w == 0.0 {
            // |o + s u|² = r²
            let b = self.origin.x * phi0.cos() + self.origin.y * phi0.sin();
            let c = self.origin.perp2() - r * r;
            let disc = b * b - c;
            if disc < 0.0 {
                return None;
            }
            let root = disc.sqrt();
            return [-b - root, -b + root]
                .into_iter()
                .filter(|s| *s >= 0.0)
                .reduce(f64::min);
        }

        let rho = 1.0 / w.abs();
        let h = w.signum();
        let (cx, cy) = (self.origin.x + phi0.sin() / w, self.origin.y - phi0.cos() / w);
        let dc = cx.hypot(cy);
        if dc == 0.0 {
            return None;
        }
        let cos_delta = (r * r - dc * dc - rho * rho) / (2.0 * rho * dc);
        if !(-1.0..=1.0).contains(&cos_delta) {
            return None;
        }
        let alpha = cy.atan2(cx);
        let delta = cos_delta.acos();
        [alpha + delta, alpha - delta]
            .into_iter()
            .map(|theta| rho * wrap_positive(h * (phi0 - theta) + PI / 2.0))
            .reduce(f64::min)
    }

    /// Position where the helix first reaches transverse radius `r`.
    #[must_use]
    pub fn position_at_radius(&self, r: f64) -> Option<ThreeVector> {
        self.path_length_to_radius(r).map(|s| self.at(s))
    }

    /// Arc length of the point of closest transverse approach to `point`,
    /// searched within half a turn either way.
    #[must_use]
    pub fn path_length_to_point(&self, point: &ThreeVector) -> Option<f64> {
        let pt = self.momentum.perp();
        if pt == 0.0 {
            return None;
        }
        let phi0 = self.momentum.y.atan2(self.momentum.x);
        let w = self.curvature();
        if w == 0.0 {
            return Some(
                (point.x - self.origin.x) * phi0.cos() + (point.y - self.origin.y) * phi0.sin(),
            );
        }
        let rho = 1.0 / w.abs();
        let h = w.signum();
        let (cx, cy) = (self.origin.x + phi0.sin() / w, self.origin.y - phi0.cos() / w);
        let (dx, dy) = (point.x - cx, point.y - cy);
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        let theta = dy.atan2(dx);
        Some(rho * wrap_symmetric(h * (phi0 - theta) + PI / 2.0))
    }

    /// Point on the helix closest (transversely) to `point`.
    #[must_use]
    pub fn closest_approach(&self, point: &ThreeVector) -> Option<ThreeVector> {
        self.path_length_to_point(point).map(|s| self.at(s))
    }
}

fn wrap_positive(angle: f64) -> f64 {
    angle.rem_euclid(2.0 * PI)
}

fn wrap_symmetric(angle: f64) -> f64 {
    let a = angle.rem_euclid(2.0 * PI);
    if a > PI {
        a - 2.0 * PI
    } else {
        a
    }
}
