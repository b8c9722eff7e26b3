//! Transformation domains: localized deformations of the plane.
//!
//! A domain has a center, a radius, an amplitude and a blend mode, plus the
//! knobs of its variant. The [`DomainMap`] trait is the interface the
//! transformation engine works against; [`Domain`] is the closed set of
//! variants held by the [`DomainRegistry`].
//!
//! # Example
//!
//! ```ignore
//! use gridwarp_engine::domain::{DomainKind, DomainSpec, build_domain};
//! use gridwarp_engine::geom::Point2;
//!
//! let spec = DomainSpec::new(Point2::new(0.0, 0.0), 100.0);
//! let domain = build_domain(DomainId::new(1), DomainKind::Spherical, &spec)?;
//! let weight = domain.weight_at(Point2::new(50.0, 0.0));
//! ```

mod conic;
mod curvature;
mod cylindrical;
mod harmonic;
mod noise;
pub mod registry;
mod spherical;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geom::{BlendMode, Direction, Point2};

pub use conic::ConicDomain;
pub use curvature::CurvatureDomain;
pub use cylindrical::CylindricalDomain;
pub use harmonic::HarmonicDomain;
pub use noise::NoiseDomain;
pub use registry::{DEFAULT_MAX_ACTIVE_DOMAINS, DomainRegistry};
pub use spherical::SphericalDomain;

/// Amplitude used when a creation request does not specify one.
pub const DEFAULT_AMPLITUDE: f64 = 10.0;

// ============================================================================
// Error types
// ============================================================================

/// Errors raised while constructing a domain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("unknown domain type `{0}`")]
    UnknownKind(String),
    #[error("domain radius must be finite and positive, got {0}")]
    InvalidRadius(f64),
    #[error("domain center must be finite")]
    NonFiniteCenter,
    #[error("domain parameter `{name}` is out of range: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

// ============================================================================
// Identity and kind
// ============================================================================

/// Identity of a domain; increases with creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DomainId(u64);

impl DomainId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "domain#{}", self.0)
    }
}

/// The six domain variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainKind {
    Spherical,
    Cylindrical,
    Conic,
    Noise,
    Harmonic,
    /// Gaussian curvature bump.
    Curvature,
}

impl DomainKind {
    pub const ALL: [Self; 6] = [
        Self::Spherical,
        Self::Cylindrical,
        Self::Conic,
        Self::Noise,
        Self::Harmonic,
        Self::Curvature,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Spherical => "spherical",
            Self::Cylindrical => "cylindrical",
            Self::Conic => "conic",
            Self::Noise => "noise",
            Self::Harmonic => "harmonic",
            Self::Curvature => "curvature",
        }
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DomainKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spherical" => Ok(Self::Spherical),
            "cylindrical" => Ok(Self::Cylindrical),
            "conic" => Ok(Self::Conic),
            "noise" => Ok(Self::Noise),
            "harmonic" => Ok(Self::Harmonic),
            "curvature" | "gaussian" => Ok(Self::Curvature),
            _ => Err(DomainError::UnknownKind(s.to_owned())),
        }
    }
}

// ============================================================================
// Creation request
// ============================================================================

/// Variant-specific knobs. Fields not used by a variant are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomainOptions {
    /// Conic eccentricity.
    pub eccentricity: f64,
    /// Harmonic frequency along x.
    pub frequency_x: f64,
    /// Harmonic frequency along y.
    pub frequency_y: f64,
    /// Harmonic phase in radians.
    pub phase: f64,
    /// Noise lattice scale (world units → lattice units).
    pub scale: f64,
    pub octaves: u32,
    pub persistence: f64,
    /// Noise seed; a random seed is drawn when absent.
    pub seed: Option<u32>,
    /// Width of the curvature bumps in normalized local coordinates.
    pub spread: f64,
}

impl Default for DomainOptions {
    fn default() -> Self {
        Self {
            eccentricity: 0.5,
            frequency_x: 0.05,
            frequency_y: 0.05,
            phase: 0.0,
            scale: 0.02,
            octaves: 3,
            persistence: 0.5,
            seed: None,
            spread: 0.3,
        }
    }
}

/// A request to create a domain: `{center, radius, amplitude?, blendMode?, options?}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSpec {
    pub center: Point2,
    pub radius: f64,
    #[serde(default)]
    pub amplitude: Option<f64>,
    #[serde(default)]
    pub blend_mode: Option<BlendMode>,
    #[serde(default)]
    pub options: DomainOptions,
}

impl DomainSpec {
    #[must_use]
    pub fn new(center: Point2, radius: f64) -> Self {
        Self {
            center,
            radius,
            amplitude: None,
            blend_mode: None,
            options: DomainOptions::default(),
        }
    }

    #[must_use]
    pub const fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = Some(amplitude);
        self
    }

    #[must_use]
    pub const fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = Some(blend_mode);
        self
    }

    #[must_use]
    pub const fn with_options(mut self, options: DomainOptions) -> Self {
        self.options = options;
        self
    }
}

/// Fields shared by every variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainBase {
    pub center: Point2,
    pub radius: f64,
    pub amplitude: f64,
    pub blend_mode: BlendMode,
}

impl DomainBase {
    fn from_spec(spec: &DomainSpec) -> Result<Self, DomainError> {
        if !spec.center.is_finite() {
            return Err(DomainError::NonFiniteCenter);
        }
        if !(spec.radius.is_finite() && spec.radius > 0.0) {
            return Err(DomainError::InvalidRadius(spec.radius));
        }
        let amplitude = spec.amplitude.unwrap_or(DEFAULT_AMPLITUDE);
        check_finite("amplitude", amplitude)?;
        Ok(Self {
            center: spec.center,
            radius: spec.radius,
            amplitude,
            blend_mode: spec.blend_mode.unwrap_or_default(),
        })
    }

    /// Offset from the center divided by the radius.
    #[must_use]
    pub fn normalized_offset(&self, point: Point2) -> Point2 {
        (point - self.center) / self.radius
    }
}

fn check_finite(name: &'static str, value: f64) -> Result<f64, DomainError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::InvalidParameter { name, value })
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<f64, DomainError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DomainError::InvalidParameter { name, value })
    }
}

// ============================================================================
// Inversion settings
// ============================================================================

/// Iteration budget and stopping rule of the fixed-point inverse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InverseSettings {
    pub max_iterations: usize,
    /// Residual magnitude (in output space) below which the iteration stops.
    pub tolerance: f64,
    /// Fraction of the residual applied to the guess each step.
    pub damping: f64,
}

impl Default for InverseSettings {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 0.1,
            damping: 0.5,
        }
    }
}

/// Result of a fixed-point inversion run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseReport {
    pub point: Point2,
    pub iterations: usize,
    /// Magnitude of the last residual that was evaluated.
    pub residual: f64,
    pub converged: bool,
}

/// Damped fixed-point inversion of `forward` at `target`.
///
/// Starts from `target` and repeatedly nudges the guess by `damping` times the
/// residual `target - forward(guess)` until the residual is below the
/// tolerance or the iteration budget runs out. The best guess is returned
/// either way.
pub fn fixed_point_inverse<F>(target: Point2, settings: &InverseSettings, forward: F) -> InverseReport
where
    F: Fn(Point2) -> Point2,
{
    fixed_point_inverse_from(target, target, settings, forward)
}

/// [`fixed_point_inverse`] with an explicit initial guess.
pub fn fixed_point_inverse_from<F>(
    start: Point2,
    target: Point2,
    settings: &InverseSettings,
    forward: F,
) -> InverseReport
where
    F: Fn(Point2) -> Point2,
{
    let mut guess = start;
    let mut residual_len = f64::INFINITY;

    for iteration in 0..settings.max_iterations {
        let image = forward(guess);
        if !image.is_finite() {
            break;
        }
        let residual = target - image;
        residual_len = residual.length();
        if residual_len < settings.tolerance {
            return InverseReport {
                point: guess,
                iterations: iteration,
                residual: residual_len,
                converged: true,
            };
        }
        guess = guess + residual * settings.damping;
    }

    log::trace!(
        "fixed-point inverse did not converge at ({}, {}); residual {residual_len}",
        target.x,
        target.y
    );
    InverseReport {
        point: guess,
        iterations: settings.max_iterations,
        residual: residual_len,
        converged: false,
    }
}

// ============================================================================
// Interface
// ============================================================================

/// Behavior shared by every domain variant.
pub trait DomainMap {
    fn base(&self) -> &DomainBase;

    /// Influence of this domain at `point`, in `[0, 1]`.
    fn weight_at(&self, point: Point2) -> f64 {
        let base = self.base();
        base.blend_mode
            .weight(point.distance_to(base.center), base.radius)
    }

    /// The raw (unweighted) deformation of this domain.
    fn transform(&self, point: Point2, direction: Direction) -> Point2;

    /// Approximate preimage of `target` under the forward transform.
    fn inverse(&self, target: Point2, settings: &InverseSettings) -> Point2 {
        fixed_point_inverse(target, settings, |guess| {
            self.transform(guess, Direction::Forward)
        })
        .point
    }

    /// Local grid-density factor in `(0, 1]`.
    fn curvature_factor(&self, _point: Point2) -> f64 {
        1.0
    }
}

// ============================================================================
// Closed set of variants
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DomainVariant {
    Spherical(SphericalDomain),
    Cylindrical(CylindricalDomain),
    Conic(ConicDomain),
    Noise(NoiseDomain),
    Harmonic(HarmonicDomain),
    Curvature(CurvatureDomain),
}

impl DomainVariant {
    /// Validates `spec` and builds the variant for `kind`.
    ///
    /// # Errors
    /// Returns [`DomainError`] when the center, radius, amplitude or one of
    /// the options used by `kind` is out of range.
    pub fn build(kind: DomainKind, spec: &DomainSpec) -> Result<Self, DomainError> {
        let base = DomainBase::from_spec(spec)?;
        let options = &spec.options;
        let variant = match kind {
            DomainKind::Spherical => Self::Spherical(SphericalDomain::new(base)),
            DomainKind::Cylindrical => Self::Cylindrical(CylindricalDomain::new(base)),
            DomainKind::Conic => Self::Conic(ConicDomain::new(
                base,
                check_finite("eccentricity", options.eccentricity)?,
            )),
            DomainKind::Noise => {
                if options.octaves == 0 {
                    return Err(DomainError::InvalidParameter {
                        name: "octaves",
                        value: 0.0,
                    });
                }
                let seed = options.seed.unwrap_or_else(rand::random::<u32>);
                Self::Noise(NoiseDomain::new(
                    base,
                    check_positive("scale", options.scale)?,
                    options.octaves,
                    check_finite("persistence", options.persistence)?,
                    seed,
                ))
            }
            DomainKind::Harmonic => Self::Harmonic(HarmonicDomain::new(
                base,
                Point2::new(
                    check_finite("frequencyX", options.frequency_x)?,
                    check_finite("frequencyY", options.frequency_y)?,
                ),
                check_finite("phase", options.phase)?,
            )),
            DomainKind::Curvature => Self::Curvature(CurvatureDomain::new(
                base,
                check_positive("spread", options.spread)?,
            )),
        };
        Ok(variant)
    }

    #[must_use]
    pub const fn kind(&self) -> DomainKind {
        match self {
            Self::Spherical(_) => DomainKind::Spherical,
            Self::Cylindrical(_) => DomainKind::Cylindrical,
            Self::Conic(_) => DomainKind::Conic,
            Self::Noise(_) => DomainKind::Noise,
            Self::Harmonic(_) => DomainKind::Harmonic,
            Self::Curvature(_) => DomainKind::Curvature,
        }
    }

    fn as_map(&self) -> &dyn DomainMap {
        match self {
            Self::Spherical(d) => d,
            Self::Cylindrical(d) => d,
            Self::Conic(d) => d,
            Self::Noise(d) => d,
            Self::Harmonic(d) => d,
            Self::Curvature(d) => d,
        }
    }
}

/// A registered domain: its identity plus its variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    id: DomainId,
    variant: DomainVariant,
}

impl Domain {
    #[must_use]
    pub const fn new(id: DomainId, variant: DomainVariant) -> Self {
        Self { id, variant }
    }

    #[must_use]
    pub const fn id(&self) -> DomainId {
        self.id
    }

    #[must_use]
    pub const fn kind(&self) -> DomainKind {
        self.variant.kind()
    }

    #[must_use]
    pub const fn variant(&self) -> &DomainVariant {
        &self.variant
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        self.base().center
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.base().radius
    }
}

impl DomainMap for Domain {
    fn base(&self) -> &DomainBase {
        self.variant.as_map().base()
    }

    fn weight_at(&self, point: Point2) -> f64 {
        self.variant.as_map().weight_at(point)
    }

    fn transform(&self, point: Point2, direction: Direction) -> Point2 {
        self.variant.as_map().transform(point, direction)
    }

    fn inverse(&self, target: Point2, settings: &InverseSettings) -> Point2 {
        self.variant.as_map().inverse(target, settings)
    }

    fn curvature_factor(&self, point: Point2) -> f64 {
        self.variant.as_map().curvature_factor(point)
    }
}

/// Builds a standalone domain.
///
/// # Errors
/// See [`DomainVariant::build`].
pub fn build_domain(id: DomainId, kind: DomainKind, spec: &DomainSpec) -> Result<Domain, DomainError> {
    Ok(Domain::new(id, DomainVariant::build(kind, spec)?))
}

/// Builds a standalone domain from a type name.
///
/// # Errors
/// Returns [`DomainError::UnknownKind`] when `kind` is not one of the six
/// recognized names, or any error of [`DomainVariant::build`].
pub fn create_domain(id: DomainId, kind: &str, spec: &DomainSpec) -> Result<Domain, DomainError> {
    let kind: DomainKind = kind.parse()?;
    build_domain(id, kind, spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        for kind in DomainKind::ALL {
            assert_eq!(kind.name().parse::<DomainKind>().unwrap(), kind);
        }
        assert_eq!("Gaussian".parse::<DomainKind>().unwrap(), DomainKind::Curvature);
        assert_eq!(
            "hyperbolic".parse::<DomainKind>(),
            Err(DomainError::UnknownKind("hyperbolic".to_owned()))
        );
    }

    #[test]
    fn test_create_domain_rejects_unknown_kind() {
        let spec = DomainSpec::new(Point2::ORIGIN, 10.0);
        let err = create_domain(DomainId::new(1), "toroidal", &spec).unwrap_err();
        assert!(matches!(err, DomainError::UnknownKind(name) if name == "toroidal"));
    }

    #[test]
    fn test_build_validates_base() {
        let bad_radius = DomainSpec::new(Point2::ORIGIN, 0.0);
        assert_eq!(
            build_domain(DomainId::new(1), DomainKind::Spherical, &bad_radius),
            Err(DomainError::InvalidRadius(0.0))
        );

        let bad_center = DomainSpec::new(Point2::new(f64::NAN, 0.0), 10.0);
        assert_eq!(
            build_domain(DomainId::new(1), DomainKind::Spherical, &bad_center),
            Err(DomainError::NonFiniteCenter)
        );
    }

    #[test]
    fn test_build_validates_options() {
        let spec = DomainSpec::new(Point2::ORIGIN, 10.0).with_options(DomainOptions {
            octaves: 0,
            ..DomainOptions::default()
        });
        assert!(matches!(
            build_domain(DomainId::new(1), DomainKind::Noise, &spec),
            Err(DomainError::InvalidParameter { name: "octaves", .. })
        ));

        // octaves are irrelevant for a spherical domain
        assert!(build_domain(DomainId::new(1), DomainKind::Spherical, &spec).is_ok());
    }

    #[test]
    fn test_defaults_applied() {
        let spec = DomainSpec::new(Point2::new(1.0, 2.0), 10.0);
        let domain = build_domain(DomainId::new(3), DomainKind::Harmonic, &spec).unwrap();
        assert_eq!(domain.base().amplitude, DEFAULT_AMPLITUDE);
        assert_eq!(domain.base().blend_mode, BlendMode::Smooth);
        assert_eq!(domain.kind(), DomainKind::Harmonic);
        assert_eq!(domain.id(), DomainId::new(3));
    }

    #[test]
    fn test_fixed_point_inverse_of_translation() {
        let shift = Point2::new(3.0, -2.0);
        let report = fixed_point_inverse(
            Point2::new(10.0, 10.0),
            &InverseSettings::default(),
            |p| p + shift,
        );
        assert!(report.converged);
        assert!(report.point.distance_to(Point2::new(7.0, 12.0)) < 0.1);
    }

    #[test]
    fn test_fixed_point_inverse_budget_exhausted() {
        let settings = InverseSettings {
            max_iterations: 3,
            tolerance: 1e-9,
            damping: 0.5,
        };
        let report = fixed_point_inverse(Point2::ORIGIN, &settings, |p| p + Point2::new(100.0, 0.0));
        assert!(!report.converged);
        assert_eq!(report.iterations, 3);
        assert!(report.point.is_finite());
    }

    #[test]
    fn test_fixed_point_inverse_from_start_guess() {
        let settings = InverseSettings::default();
        let shift = Point2::new(3.0, -2.0);
        let target = Point2::new(10.0, 10.0);

        let report = fixed_point_inverse_from(Point2::new(7.0, 12.0), target, &settings, |p| p + shift);
        assert!(report.converged);
        assert_eq!(report.iterations, 0);
        assert_eq!(report.point, Point2::new(7.0, 12.0));

        let cold = fixed_point_inverse(target, &settings, |p| p + shift);
        assert!(cold.iterations > 0);
    }
}
