//! Gaussian curvature bump: four signed Gaussian bumps in local coordinates.

use crate::geom::{Direction, Point2};

use super::{DomainBase, DomainMap};

/// Bump positions (normalized local coordinates) and signs.
const BUMPS: [(f64, f64, f64); 4] = [
    (0.5, 0.5, 1.0),
    (-0.5, 0.5, -1.0),
    (-0.5, -0.5, 1.0),
    (0.5, -0.5, -1.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct CurvatureDomain {
    base: DomainBase,
    spread: f64,
}

impl CurvatureDomain {
    #[must_use]
    pub const fn new(base: DomainBase, spread: f64) -> Self {
        Self { base, spread }
    }

    /// Signed bump sum at `point`, roughly in [-1, 1].
    #[must_use]
    pub fn height(&self, point: Point2) -> f64 {
        let local = self.base.normalized_offset(point);
        let two_sigma_sq = 2.0 * self.spread * self.spread;
        BUMPS
            .iter()
            .map(|&(bx, by, sign)| {
                let d2 = local.distance_squared_to(Point2::new(bx, by));
                sign * (-d2 / two_sigma_sq).exp()
            })
            .sum()
    }
}

impl DomainMap for CurvatureDomain {
    fn base(&self) -> &DomainBase {
        &self.base
    }

    fn transform(&self, point: Point2, direction: Direction) -> Point2 {
        let shift = self.base.amplitude * self.height(point) * direction.sign();
        point + Point2::new(shift, shift)
    }
}
