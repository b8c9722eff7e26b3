//! Conformal mappings used by the domain variants.
//!
//! Every mapping works on the offset of a point from a domain center, scaled
//! by the domain radius, so that the same formulas apply to domains of any
//! size:
//!
//! - **Möbius**: `(a z + b) / (c z + d)` with a regularized pole.
//! - **Stereographic**: plane ↔ sphere of the domain radius.
//! - **Cylindrical**: polar offset unrolled onto a strip.
//! - **Conic**: an eccentricity-parameterized Möbius map.

use serde::{Deserialize, Serialize};

use super::complex::{self, Complex};
use super::core::{Point2, Point3, Tolerance};

/// Magnitude of the point returned when a Möbius denominator vanishes.
pub const SINGULAR_MAGNITUDE: f64 = 1e6;

/// Direction flag for the mappings (+1 forward, -1 backward).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }

    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

// ============================================================================
// Möbius
// ============================================================================

/// Möbius transform `z ↦ (a z + b) / (c z + d)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mobius {
    pub a: Complex,
    pub b: Complex,
    pub c: Complex,
    pub d: Complex,
}

impl Mobius {
    pub const IDENTITY: Self = Self {
        a: Complex::new(1.0, 0.0),
        b: Complex::new(0.0, 0.0),
        c: Complex::new(0.0, 0.0),
        d: Complex::new(1.0, 0.0),
    };

    #[must_use]
    pub const fn new(a: Complex, b: Complex, c: Complex, d: Complex) -> Self {
        Self { a, b, c, d }
    }

    /// Evaluates the transform at `z`.
    ///
    /// When `|c z + d| < epsilon` the result is the point of magnitude
    /// [`SINGULAR_MAGNITUDE`] in the direction of the numerator, which keeps
    /// the output finite at the pole.
    #[must_use]
    pub fn apply(&self, z: Complex, epsilon: f64) -> Complex {
        let numerator = self.a * z + self.b;
        let denominator = self.c * z + self.d;
        if complex::modulus(denominator) < epsilon {
            return complex::from_polar(SINGULAR_MAGNITUDE, complex::argument(numerator));
        }
        numerator / denominator
    }

    /// Returns `self ∘ rhs` (apply `rhs` first).
    #[must_use]
    pub fn compose(&self, rhs: &Self) -> Self {
        Self::new(
            self.a * rhs.a + self.b * rhs.c,
            self.a * rhs.b + self.b * rhs.d,
            self.c * rhs.a + self.d * rhs.c,
            self.c * rhs.b + self.d * rhs.d,
        )
    }

    /// Adjugate matrix; equal to the inverse up to the (irrelevant) scale.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self::new(self.d, -self.b, -self.c, self.a)
    }
}

impl Default for Mobius {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ============================================================================
// Stereographic projection
// ============================================================================

/// Lifts a planar point onto the sphere of `radius` centered at `center`.
///
/// The offset is normalized by the radius, lifted onto the unit sphere with
/// the standard inverse stereographic formula and scaled back. The x/y
/// components are re-centered on `center`; z is relative to the sphere center.
#[must_use]
pub fn stereographic_forward(point: Point2, center: Point2, radius: f64) -> Point3 {
    if radius <= 0.0 {
        return Point3::new(point.x, point.y, 0.0);
    }
    let w = (point - center) / radius;
    let r2 = w.length_squared();
    let denom = 1.0 + r2;

    let x = 2.0 * w.x / denom;
    let y = 2.0 * w.y / denom;
    let z = (r2 - 1.0) / denom;

    Point3::new(center.x + x * radius, center.y + y * radius, z * radius)
}

/// Projects a sphere point back onto the plane.
///
/// A point within `epsilon` of the pole (`z == radius`) maps to `center`.
#[must_use]
pub fn stereographic_backward(point: Point3, center: Point2, radius: f64, epsilon: f64) -> Point2 {
    if radius <= 0.0 {
        return point.xy();
    }
    let gap = radius - point.z;
    if gap.abs() < epsilon {
        return center;
    }
    let offset = point.xy() - center;
    center + offset * (radius / gap)
}

// ============================================================================
// Cylindrical mapping
// ============================================================================

/// Unrolls the polar offset around `center` onto a strip.
///
/// Forward maps `(angle, distance)` to `center + (angle * radius, distance - radius)`.
/// Backward is the exact algebraic inverse.
#[must_use]
pub fn cylindrical_map(point: Point2, center: Point2, radius: f64, direction: Direction) -> Point2 {
    if radius <= 0.0 {
        return point;
    }
    let offset = point - center;
    match direction {
        Direction::Forward => {
            let angle = offset.y.atan2(offset.x);
            let distance = offset.length();
            center + Point2::new(angle * radius, distance - radius)
        }
        Direction::Backward => {
            let angle = offset.x / radius;
            let distance = offset.y + radius;
            center + Point2::new(distance * angle.cos(), distance * angle.sin())
        }
    }
}

// ============================================================================
// Conic mapping
// ============================================================================

/// Möbius coefficients of the conic mapping for a signed eccentricity.
#[must_use]
pub fn conic_mobius(eccentricity: f64) -> Mobius {
    let half = 0.5 * eccentricity;
    Mobius::new(
        Complex::new(1.0, half),
        Complex::new(0.0, 0.0),
        Complex::new(half, 0.0),
        Complex::new(1.0, 0.0),
    )
}

/// Conic mapping of the radius-normalized offset.
///
/// Backward flips the sign of the eccentricity. That approximates the inverse
/// by symmetry; it is not exact.
#[must_use]
pub fn conic_map(
    point: Point2,
    center: Point2,
    radius: f64,
    eccentricity: f64,
    direction: Direction,
    tol: Tolerance,
) -> Point2 {
    if radius <= 0.0 {
        return point;
    }
    let mobius = conic_mobius(eccentricity * direction.sign());
    let w = complex::from_point((point - center) / radius);
    let mapped = complex::to_point(mobius.apply(w, tol.eps));
    center + mapped * radius
}
