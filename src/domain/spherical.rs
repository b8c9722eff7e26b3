//! Spherical domain: stereographic lift of the plane onto a sphere.

use crate::geom::{
    Direction, Point2, Point3, Tolerance, stereographic_backward, stereographic_forward,
};

use super::{DomainBase, DomainMap};

/// Lower bound of the spherical curvature factor.
const MIN_CURVATURE_FACTOR: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct SphericalDomain {
    base: DomainBase,
}

impl SphericalDomain {
    #[must_use]
    pub const fn new(base: DomainBase) -> Self {
        Self { base }
    }
}

impl DomainMap for SphericalDomain {
    fn base(&self) -> &DomainBase {
        &self.base
    }

    fn transform(&self, point: Point2, direction: Direction) -> Point2 {
        let DomainBase { center, radius, .. } = self.base;
        match direction {
            Direction::Forward => stereographic_forward(point, center, radius).xy(),
            Direction::Backward => {
                // Planar points are read as the lower hemisphere, clamped at the equator.
                let offset = point - center;
                let z = -(radius * radius - offset.length_squared()).max(0.0).sqrt();
                stereographic_backward(
                    Point3::new(point.x, point.y, z),
                    center,
                    radius,
                    Tolerance::SINGULAR.eps,
                )
            }
        }
    }

    fn curvature_factor(&self, point: Point2) -> f64 {
        let t = point.distance_to(self.base.center) / self.base.radius;
        (1.0 - 0.5 * t * t).max(MIN_CURVATURE_FACTOR)
    }
}
