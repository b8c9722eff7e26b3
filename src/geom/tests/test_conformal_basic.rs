//! Tests for the conformal mappings (Möbius, stereographic, cylindrical, conic).

use crate::geom::{
    Complex, Direction, Mobius, Point2, Point3, SINGULAR_MAGNITUDE, Tolerance, conic_map,
    cylindrical_map, stereographic_backward, stereographic_forward,
};
use std::f64::consts::PI;

const TOLERANCE: f64 = 1e-9;

fn assert_close(a: Point2, b: Point2, tol: f64) {
    assert!(
        a.distance_to(b) <= tol,
        "expected ({}, {}) to be within {tol} of ({}, {})",
        a.x,
        a.y,
        b.x,
        b.y
    );
}

// ============================================================================
// Möbius
// ============================================================================

#[test]
fn mobius_evaluates_rational_map() {
    let m = Mobius::new(
        Complex::new(2.0, 0.0),
        Complex::new(1.0, 0.0),
        Complex::new(0.0, 0.0),
        Complex::new(1.0, 0.0),
    );
    let out = m.apply(Complex::new(1.0, 1.0), 1e-10);
    assert!((out - Complex::new(3.0, 2.0)).norm() < TOLERANCE);
}

#[test]
fn mobius_regularizes_pole() {
    // c z + d vanishes at z = 1
    let m = Mobius::new(
        Complex::new(0.0, 1.0),
        Complex::new(0.0, 0.0),
        Complex::new(1.0, 0.0),
        Complex::new(-1.0, 0.0),
    );
    let out = m.apply(Complex::new(1.0, 0.0), 1e-10);
    assert!(out.re.is_finite() && out.im.is_finite());
    assert!((out.norm() - SINGULAR_MAGNITUDE).abs() < 1e-3);
    // numerator is i, so the spike points along +y
    assert!((out.arg() - PI / 2.0).abs() < 1e-9);
}

#[test]
fn mobius_compose_matches_sequential_application() {
    let f = Mobius::new(
        Complex::new(1.0, 0.5),
        Complex::new(0.2, 0.0),
        Complex::new(0.1, 0.1),
        Complex::new(1.0, 0.0),
    );
    let g = Mobius::new(
        Complex::new(0.5, 0.0),
        Complex::new(0.0, 1.0),
        Complex::new(0.0, 0.0),
        Complex::new(1.0, 0.0),
    );
    let z = Complex::new(0.3, -0.7);
    let sequential = f.apply(g.apply(z, 1e-10), 1e-10);
    let composed = f.compose(&g).apply(z, 1e-10);
    assert!((sequential - composed).norm() < TOLERANCE);
}

// ============================================================================
// Stereographic
// ============================================================================

#[test]
fn stereographic_forward_lands_on_sphere() {
    let center = Point2::new(10.0, -5.0);
    let radius = 100.0;
    for p in [
        Point2::new(60.0, -5.0),
        Point2::new(10.0, 95.0),
        Point2::new(-140.0, 40.0),
        center,
    ] {
        let lifted = stereographic_forward(p, center, radius);
        let dx = lifted.x - center.x;
        let dy = lifted.y - center.y;
        let r = (dx * dx + dy * dy + lifted.z * lifted.z).sqrt();
        assert!((r - radius).abs() < 1e-9, "lifted point off the sphere: r = {r}");
    }
}

#[test]
fn stereographic_known_value() {
    let lifted = stereographic_forward(Point2::new(50.0, 0.0), Point2::ORIGIN, 100.0);
    assert!((lifted.x - 80.0).abs() < TOLERANCE);
    assert!(lifted.y.abs() < TOLERANCE);
    assert!((lifted.z + 60.0).abs() < TOLERANCE);
}

#[test]
fn stereographic_round_trip() {
    let center = Point2::new(3.0, 4.0);
    let radius = 25.0;
    for p in [Point2::new(10.0, 10.0), Point2::new(-40.0, 2.0), Point2::new(3.0, 4.0)] {
        let lifted = stereographic_forward(p, center, radius);
        let back = stereographic_backward(lifted, center, radius, Tolerance::SINGULAR.eps);
        assert_close(back, p, 1e-8);
    }
}

#[test]
fn stereographic_pole_maps_to_center() {
    let center = Point2::new(7.0, 7.0);
    let back = stereographic_backward(Point3::new(12.0, 3.0, 50.0), center, 50.0, 1e-9);
    assert_eq!(back, center);
}

// ============================================================================
// Cylindrical
// ============================================================================

#[test]
fn cylindrical_forward_known_value() {
    let center = Point2::ORIGIN;
    let out = cylindrical_map(Point2::new(0.0, 30.0), center, 20.0, Direction::Forward);
    assert_close(out, Point2::new(PI / 2.0 * 20.0, 10.0), TOLERANCE);
}

#[test]
fn cylindrical_backward_is_exact_inverse() {
    let center = Point2::new(-5.0, 12.0);
    let radius = 40.0;
    for p in [
        Point2::new(10.0, 20.0),
        Point2::new(-30.0, -8.0),
        Point2::new(-5.0, 60.0),
        Point2::new(25.0, 11.0),
    ] {
        let forward = cylindrical_map(p, center, radius, Direction::Forward);
        let back = cylindrical_map(forward, center, radius, Direction::Backward);
        assert_close(back, p, 1e-9);
    }
}

// ============================================================================
// Conic
// ============================================================================

#[test]
fn conic_zero_eccentricity_is_identity() {
    let center = Point2::new(1.0, 2.0);
    let p = Point2::new(8.0, -3.0);
    let out = conic_map(p, center, 10.0, 0.0, Direction::Forward, Tolerance::SINGULAR);
    assert_close(out, p, TOLERANCE);
}

#[test]
fn conic_center_is_fixed() {
    let center = Point2::new(4.0, 4.0);
    for direction in [Direction::Forward, Direction::Backward] {
        let out = conic_map(center, center, 10.0, 0.8, direction, Tolerance::SINGULAR);
        assert_close(out, center, TOLERANCE);
    }
}

#[test]
fn conic_backward_approximately_undoes_forward_near_center() {
    let center = Point2::ORIGIN;
    let radius = 100.0;
    let p = Point2::new(5.0, 3.0);
    let forward = conic_map(p, center, radius, 0.2, Direction::Forward, Tolerance::SINGULAR);
    let back = conic_map(forward, center, radius, 0.2, Direction::Backward, Tolerance::SINGULAR);
    assert!(forward.distance_to(p) > 0.1, "forward should move the point");
    // not exact, but close for small offsets
    assert!(back.distance_to(p) < 0.5);
}
