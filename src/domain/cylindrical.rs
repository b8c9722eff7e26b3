//! Cylindrical domain. The only variant with an exact inverse.

use crate::geom::{Direction, Point2, cylindrical_map};

use super::{DomainBase, DomainMap, InverseSettings};

const CURVATURE_FACTOR: f64 = 0.7;

#[derive(Debug, Clone, PartialEq)]
pub struct CylindricalDomain {
    base: DomainBase,
}

impl CylindricalDomain {
    #[must_use]
    pub const fn new(base: DomainBase) -> Self {
        Self { base }
    }
}

impl DomainMap for CylindricalDomain {
    fn base(&self) -> &DomainBase {
        &self.base
    }

    fn transform(&self, point: Point2, direction: Direction) -> Point2 {
        cylindrical_map(point, self.base.center, self.base.radius, direction)
    }

    fn inverse(&self, target: Point2, _settings: &InverseSettings) -> Point2 {
        self.transform(target, Direction::Backward)
    }

    fn curvature_factor(&self, _point: Point2) -> f64 {
        CURVATURE_FACTOR
    }
}
