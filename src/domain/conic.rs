//! Conic domain: eccentricity-parameterized Möbius map.

use crate::geom::{Direction, Point2, Tolerance, conic_map};

use super::{DomainBase, DomainMap};

#[derive(Debug, Clone, PartialEq)]
pub struct ConicDomain {
    base: DomainBase,
    eccentricity: f64,
}

impl ConicDomain {
    #[must_use]
    pub const fn new(base: DomainBase, eccentricity: f64) -> Self {
        Self { base, eccentricity }
    }

    #[must_use]
    pub const fn eccentricity(&self) -> f64 {
        self.eccentricity
    }
}

impl DomainMap for ConicDomain {
    fn base(&self) -> &DomainBase {
        &self.base
    }

    fn transform(&self, point: Point2, direction: Direction) -> Point2 {
        conic_map(
            point,
            self.base.center,
            self.base.radius,
            self.eccentricity,
            direction,
            Tolerance::SINGULAR,
        )
    }

    fn curvature_factor(&self, _point: Point2) -> f64 {
        (1.0 - 0.3 * self.eccentricity.abs()).max(0.1)
    }
}
