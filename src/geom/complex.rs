//! Complex-plane helpers for the conformal mappings.
//!
//! Plane points are identified with complex numbers `x + iy`. Arithmetic
//! (add, subtract, multiply, divide) comes from `num_complex`; this module only
//! adds the conversions and the handful of named accessors the mappings use.

use num_complex::Complex64;

use super::core::Point2;

/// Complex number used throughout the mappings.
pub type Complex = Complex64;

/// Identify a plane point with `x + iy`.
#[must_use]
pub const fn from_point(point: Point2) -> Complex {
    Complex::new(point.x, point.y)
}

/// Inverse of [`from_point`].
#[must_use]
pub const fn to_point(value: Complex) -> Point2 {
    Point2::new(value.re, value.im)
}

/// Modulus `|z|`.
#[must_use]
pub fn modulus(value: Complex) -> f64 {
    value.norm()
}

/// Argument of `z` in `(-pi, pi]`.
#[must_use]
pub fn argument(value: Complex) -> f64 {
    value.arg()
}

#[must_use]
pub fn conjugate(value: Complex) -> Complex {
    value.conj()
}

/// Point of magnitude `radius` in the direction `angle`.
#[must_use]
pub fn from_polar(radius: f64, angle: f64) -> Complex {
    Complex::from_polar(radius, angle)
}
