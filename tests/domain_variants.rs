use gridwarp_engine::domain::{
    Domain, DomainError, DomainId, DomainKind, DomainMap, DomainOptions, DomainSpec,
    InverseSettings, build_domain, create_domain,
};
use gridwarp_engine::geom::{BlendMode, Direction, Point2};

fn build(kind: DomainKind, spec: &DomainSpec) -> Domain {
    build_domain(DomainId::new(1), kind, spec).expect("valid domain")
}

fn seeded(seed: u32) -> DomainOptions {
    DomainOptions {
        seed: Some(seed),
        ..DomainOptions::default()
    }
}

#[test]
fn every_kind_builds_with_defaults() {
    let spec = DomainSpec::new(Point2::new(10.0, -5.0), 40.0);
    for kind in DomainKind::ALL {
        let domain = build(kind, &spec);
        assert_eq!(domain.kind(), kind);
        assert_eq!(domain.center(), Point2::new(10.0, -5.0));
        assert_eq!(domain.radius(), 40.0);
        assert_eq!(domain.base().blend_mode, BlendMode::Smooth);
    }
}

#[test]
fn weight_is_one_at_center_and_zero_outside() {
    for mode in BlendMode::ALL {
        let spec = DomainSpec::new(Point2::ORIGIN, 50.0).with_blend_mode(mode);
        let domain = build(DomainKind::Harmonic, &spec);
        assert_eq!(domain.weight_at(Point2::ORIGIN), 1.0, "{mode}");
        assert_eq!(domain.weight_at(Point2::new(50.0, 0.0)), 0.0, "{mode}");
        assert_eq!(domain.weight_at(Point2::new(0.0, -80.0)), 0.0, "{mode}");

        let mut previous = 1.0;
        for step in 0..=10_i32 {
            let w = domain.weight_at(Point2::new(f64::from(step) * 5.0, 0.0));
            assert!((0.0..=1.0).contains(&w));
            assert!(w <= previous, "{mode} weight must not grow with distance");
            previous = w;
        }
    }
}

#[test]
fn harmonic_displacement_at_center() {
    let domain = build(DomainKind::Harmonic, &DomainSpec::new(Point2::new(3.0, 4.0), 20.0));
    // sin(0) = 0 on x, cos(0) = 1 on y, default amplitude 10.
    let out = domain.transform(Point2::new(3.0, 4.0), Direction::Forward);
    assert!(out.distance_to(Point2::new(3.0, 14.0)) < 1e-12);
    let back = domain.transform(Point2::new(3.0, 4.0), Direction::Backward);
    assert!(back.distance_to(Point2::new(3.0, -6.0)) < 1e-12);
}

#[test]
fn curvature_bumps_cancel_at_center() {
    let spec = DomainSpec::new(Point2::ORIGIN, 100.0).with_amplitude(4.0);
    let domain = build(DomainKind::Curvature, &spec);
    let center = domain.transform(Point2::ORIGIN, Direction::Forward);
    assert!(center.length() < 1e-9);

    // On the positive bump the shift is positive on both axes.
    let on_bump = domain.transform(Point2::new(50.0, 50.0), Direction::Forward);
    assert!(on_bump.x > 50.0 && on_bump.y > 50.0);
    assert!((on_bump.x - 50.0 - (on_bump.y - 50.0)).abs() < 1e-12);

    let off_bump = domain.transform(Point2::new(-50.0, 50.0), Direction::Forward);
    assert!(off_bump.x < -50.0);
}

#[test]
fn noise_is_deterministic_per_seed_and_bounded() {
    let spec = DomainSpec::new(Point2::ORIGIN, 100.0)
        .with_amplitude(3.0)
        .with_options(seeded(42));
    let a = build(DomainKind::Noise, &spec);
    let b = build(DomainKind::Noise, &spec);
    let other = build(DomainKind::Noise, &spec.with_options(seeded(43)));

    let mut differs = false;
    for i in 0..20_i32 {
        let p = Point2::new(f64::from(i) * 7.3, f64::from(i) * -3.1);
        let out = a.transform(p, Direction::Forward);
        assert_eq!(out, b.transform(p, Direction::Forward));
        assert!((out.x - p.x).abs() <= 3.0 + 1e-9);
        assert!((out.y - p.y).abs() <= 3.0 + 1e-9);
        // One noise value shifts both coordinates.
        assert!(((out.x - p.x) - (out.y - p.y)).abs() < 1e-9);
        differs |= out != other.transform(p, Direction::Forward);
    }
    assert!(differs);
}

#[test]
fn conic_without_eccentricity_is_identity() {
    let spec = DomainSpec::new(Point2::new(5.0, 5.0), 30.0).with_options(DomainOptions {
        eccentricity: 0.0,
        ..DomainOptions::default()
    });
    let domain = build(DomainKind::Conic, &spec);
    let p = Point2::new(12.0, -3.0);
    assert!(domain.transform(p, Direction::Forward).distance_to(p) < 1e-9);
}

#[test]
fn conic_keeps_center_fixed() {
    let domain = build(DomainKind::Conic, &DomainSpec::new(Point2::new(-8.0, 2.0), 30.0));
    let out = domain.transform(Point2::new(-8.0, 2.0), Direction::Forward);
    assert!(out.distance_to(Point2::new(-8.0, 2.0)) < 1e-9);
}

#[test]
fn cylindrical_inverse_is_exact() {
    let domain = build(DomainKind::Cylindrical, &DomainSpec::new(Point2::ORIGIN, 60.0));
    let p = Point2::new(-20.0, 35.0);
    let image = domain.transform(p, Direction::Forward);
    let strict = InverseSettings {
        max_iterations: 0,
        ..InverseSettings::default()
    };
    // No iterations are needed.
    assert!(domain.inverse(image, &strict).distance_to(p) < 1e-9);
}

#[test]
fn default_inverse_converges_for_gentle_maps() {
    let spec = DomainSpec::new(Point2::ORIGIN, 100.0).with_amplitude(1.5);
    let domain = build(DomainKind::Harmonic, &spec);
    let settings = InverseSettings::default();
    let p = Point2::new(20.0, -10.0);
    let image = domain.transform(p, Direction::Forward);
    let found = domain.inverse(image, &settings);
    assert!(domain.transform(found, Direction::Forward).distance_to(image) < settings.tolerance);
}

#[test]
fn curvature_factors_per_kind() {
    let spec = DomainSpec::new(Point2::ORIGIN, 100.0);
    let at = Point2::new(50.0, 0.0);

    let spherical = build(DomainKind::Spherical, &spec);
    assert_eq!(spherical.curvature_factor(Point2::ORIGIN), 1.0);
    assert!((spherical.curvature_factor(at) - 0.875).abs() < 1e-12);
    assert_eq!(spherical.curvature_factor(Point2::new(500.0, 0.0)), 0.3);

    assert_eq!(build(DomainKind::Cylindrical, &spec).curvature_factor(at), 0.7);
    // Default eccentricity 0.5.
    assert!((build(DomainKind::Conic, &spec).curvature_factor(at) - 0.85).abs() < 1e-12);
    let flat_conic = spec.with_options(DomainOptions {
        eccentricity: -10.0,
        ..DomainOptions::default()
    });
    assert_eq!(build(DomainKind::Conic, &flat_conic).curvature_factor(at), 0.1);

    for kind in [DomainKind::Noise, DomainKind::Harmonic, DomainKind::Curvature] {
        assert_eq!(build(kind, &spec).curvature_factor(at), 1.0);
    }
}

#[test]
fn invalid_specs_are_rejected() {
    let bad_radius = DomainSpec::new(Point2::ORIGIN, 0.0);
    assert!(matches!(
        create_domain(DomainId::new(1), "spherical", &bad_radius),
        Err(DomainError::InvalidRadius(_))
    ));
    let bad_center = DomainSpec::new(Point2::new(f64::NAN, 0.0), 10.0);
    assert!(matches!(
        create_domain(DomainId::new(1), "noise", &bad_center),
        Err(DomainError::NonFiniteCenter)
    ));
    assert!(matches!(
        create_domain(DomainId::new(1), "toroidal", &DomainSpec::new(Point2::ORIGIN, 10.0)),
        Err(DomainError::UnknownKind(_))
    ));
}
