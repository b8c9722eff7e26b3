//! Tests for snapping against a live session.

use crate::domain::{DomainKind, DomainSpec};
use crate::engine::{GridSession, SnapConfig, SnapEngine, SnapMode};
use crate::geom::{BlendMode, Point2};

#[test]
fn disabled_or_none_returns_input() {
    let mut session = GridSession::default();
    let p = Point2::new(7.3, -2.9);

    session.set_snap_enabled(false);
    assert_eq!(session.snap(p), p);

    session.set_snap_enabled(true);
    session.set_snap_mode(SnapMode::None);
    assert_eq!(session.snap(p), p);
}

#[test]
fn grid_snap_without_domains_rounds_to_base() {
    let mut session = GridSession::default();
    assert_eq!(session.snap(Point2::new(7.0, 7.0)), Point2::ORIGIN);
    assert_eq!(session.snap(Point2::new(13.0, -27.0)), Point2::new(20.0, -20.0));
}

#[test]
fn grid_snap_lands_on_deformed_nodes() {
    let mut session = GridSession::default();
    session
        .create_domain(
            DomainKind::Spherical,
            &DomainSpec::new(Point2::ORIGIN, 100.0).with_blend_mode(BlendMode::Sharp),
        )
        .expect("valid domain");

    // The full-weight domain halves the grid size to 10, so (40, 0) is a node.
    let node = session.transform_point(Point2::new(40.0, 0.0));
    assert!((node.x - 40.0).abs() > 1.0);
    assert_eq!(session.snap(node), node);

    let nearby = node + Point2::new(0.8, 0.0);
    assert_eq!(session.snap(nearby), node);
}

#[test]
fn intersection_snap_attracts_within_tolerance() {
    let mut session = GridSession::default();
    session.set_snap_mode(SnapMode::Intersection);

    assert_eq!(session.snap(Point2::new(3.0, 4.0)), Point2::ORIGIN);
    // Every node is more than the tolerance (10) away from a cell center.
    let center = Point2::new(10.0, 10.0);
    assert_eq!(session.snap(center), center);

    session.set_snap_strength(0.5);
    assert_eq!(session.snap(Point2::new(3.0, 4.0)), Point2::new(1.5, 2.0));
}

#[test]
fn snap_tolerance_limits_candidate_reach() {
    let mut session = GridSession::default();
    let candidates = [Point2::new(100.0, 100.0)];
    let p = Point2::new(106.0, 100.0);
    assert_eq!(session.snap_to_candidates(p, &candidates), Point2::new(100.0, 100.0));

    session.set_snap_tolerance(5.0);
    assert_eq!(session.snap_config().tolerance, 5.0);
    assert_eq!(session.snap_to_candidates(p, &candidates), p);

    session.set_snap_tolerance(-3.0);
    assert_eq!(session.snap_config().tolerance, 0.0);
}

#[test]
fn candidate_snap_uses_caller_space() {
    let mut session = GridSession::default();
    let candidates = [Point2::new(100.0, 100.0), Point2::new(104.0, 103.0)];

    assert_eq!(
        session.snap_to_candidates(Point2::new(103.0, 103.0), &candidates),
        Point2::new(104.0, 103.0)
    );
    assert_eq!(
        session.snap_to_candidates(Point2::new(150.0, 150.0), &candidates),
        Point2::new(150.0, 150.0)
    );
}

#[test]
fn snap_with_closures_matches_session_contract() {
    let engine = SnapEngine::new(SnapConfig::default());
    let shift = Point2::new(3.0, 0.0);
    let snapped = engine.snap_with(
        Point2::new(14.0, 9.0),
        |p| p + shift,
        |p| p - shift,
        |_| 5.0,
    );
    // (14, 9) -> (11, 9) -> (10, 10) -> (13, 10)
    assert_eq!(snapped, Point2::new(13.0, 10.0));
}
