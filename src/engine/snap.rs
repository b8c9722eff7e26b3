//! Coordinate snapping in deformed grid space.
//!
//! Grid snapping round-trips a point through the inverse transform, rounds it
//! to the local grid spacing in undeformed space and maps the result forward
//! again, so snapped points land on the deformed grid the user sees.
//! Candidate snapping instead attracts the point toward the nearest of a
//! given set of points, entirely in the caller's coordinate space.

use serde::{Deserialize, Serialize};

use crate::geom::Point2;

/// What [`SnapEngine::snap`] snaps to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapMode {
    /// Round to the deformed grid.
    #[default]
    Grid,
    /// Attract toward nearby deformed grid intersections.
    Intersection,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapConfig {
    pub enabled: bool,
    pub mode: SnapMode,
    /// Capture distance for candidate snapping.
    pub tolerance: f64,
    /// Fraction of the way a captured point moves toward its candidate, in `[0, 1]`.
    pub snap_strength: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: SnapMode::Grid,
            tolerance: 10.0,
            snap_strength: 1.0,
        }
    }
}

impl SnapConfig {
    /// Clamps strength to `[0, 1]` and tolerance to `>= 0`; non-finite values
    /// fall back to the defaults.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            tolerance: if self.tolerance.is_finite() {
                self.tolerance.max(0.0)
            } else {
                defaults.tolerance
            },
            snap_strength: if self.snap_strength.is_finite() {
                self.snap_strength.clamp(0.0, 1.0)
            } else {
                defaults.snap_strength
            },
            ..self
        }
    }
}

/// The three queries grid snapping needs from the transformation engine.
pub trait SnapSpace {
    fn transform_point(&self, point: Point2) -> Point2;
    fn inverse_transform_point(&self, point: Point2) -> Point2;
    /// Grid spacing at a point in undeformed space.
    fn grid_size_at(&self, point: Point2) -> f64;
}

/// [`SnapSpace`] built from three closures.
pub struct FnSpace<T, I, G> {
    pub transform: T,
    pub inverse: I,
    pub grid_size: G,
}

impl<T, I, G> SnapSpace for FnSpace<T, I, G>
where
    T: Fn(Point2) -> Point2,
    I: Fn(Point2) -> Point2,
    G: Fn(Point2) -> f64,
{
    fn transform_point(&self, point: Point2) -> Point2 {
        (self.transform)(point)
    }

    fn inverse_transform_point(&self, point: Point2) -> Point2 {
        (self.inverse)(point)
    }

    fn grid_size_at(&self, point: Point2) -> f64 {
        (self.grid_size)(point)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SnapEngine {
    config: SnapConfig,
}

impl SnapEngine {
    #[must_use]
    pub fn new(config: SnapConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SnapConfig) {
        self.config = config.sanitized();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    pub fn set_mode(&mut self, mode: SnapMode) {
        self.config.mode = mode;
    }

    /// Sets the snap strength, clamped to `[0, 1]`.
    pub fn set_strength(&mut self, strength: f64) {
        self.set_config(SnapConfig {
            snap_strength: strength,
            ..self.config
        });
    }

    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.set_config(SnapConfig {
            tolerance,
            ..self.config
        });
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.config.enabled && self.config.mode != SnapMode::None
    }

    /// Snaps `point` according to the configured mode.
    #[must_use]
    pub fn snap(&self, point: Point2, space: &impl SnapSpace) -> Point2 {
        if !self.is_active() {
            return point;
        }
        match self.config.mode {
            SnapMode::Grid => snap_to_grid(point, space),
            SnapMode::Intersection => {
                let candidates = self.grid_intersections_near(point, space, 1);
                self.snap_to_candidates(point, &candidates)
            }
            SnapMode::None => point,
        }
    }

    /// [`snap`](Self::snap) with the three queries passed as closures.
    #[must_use]
    pub fn snap_with<T, I, G>(&self, point: Point2, transform: T, inverse: I, grid_size: G) -> Point2
    where
        T: Fn(Point2) -> Point2,
        I: Fn(Point2) -> Point2,
        G: Fn(Point2) -> f64,
    {
        self.snap(
            point,
            &FnSpace {
                transform,
                inverse,
                grid_size,
            },
        )
    }

    /// Pulls `point` toward the nearest candidate within the tolerance.
    ///
    /// The result is `lerp(point, candidate, snap_strength)`. Without a
    /// captured candidate, or when snapping is inactive, `point` is returned.
    #[must_use]
    pub fn snap_to_candidates(&self, point: Point2, candidates: &[Point2]) -> Point2 {
        if !self.is_active() {
            return point;
        }
        match nearest_within(point, candidates, self.config.tolerance) {
            Some(candidate) => point.lerp(candidate, self.config.snap_strength),
            None => point,
        }
    }

    /// Deformed grid intersections in the `(2 rings + 1)²` block around the
    /// grid node nearest to `point` (found in undeformed space).
    #[must_use]
    pub fn grid_intersections_near(&self, point: Point2, space: &impl SnapSpace, rings: usize) -> Vec<Point2> {
        let original = space.inverse_transform_point(point);
        let size = space.grid_size_at(original);
        if !(size.is_finite() && size > 0.0) {
            return Vec::new();
        }
        let node = original.round_to_multiple(size);
        let rings = i32::try_from(rings).unwrap_or(i32::MAX).min(64);
        let mut out = Vec::with_capacity(((2 * rings + 1) * (2 * rings + 1)) as usize);
        for j in -rings..=rings {
            for i in -rings..=rings {
                let lattice = node + Point2::new(f64::from(i) * size, f64::from(j) * size);
                out.push(space.transform_point(lattice));
            }
        }
        out
    }
}

fn snap_to_grid(point: Point2, space: &impl SnapSpace) -> Point2 {
    let original = space.inverse_transform_point(point);
    let size = space.grid_size_at(original);
    if !(size.is_finite() && size > 0.0) {
        return point;
    }
    space.transform_point(original.round_to_multiple(size))
}

fn nearest_within(point: Point2, candidates: &[Point2], tolerance: f64) -> Option<Point2> {
    let limit = tolerance * tolerance;
    candidates
        .iter()
        .copied()
        .map(|c| (c, point.distance_squared_to(c)))
        .filter(|&(_, d2)| d2 <= limit)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}
