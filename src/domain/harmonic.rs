//! Harmonic domain: sinusoidal ripple around the center.

use crate::geom::{Direction, Point2};

use super::{DomainBase, DomainMap};

#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicDomain {
    base: DomainBase,
    frequency: Point2,
    phase: f64,
}

impl HarmonicDomain {
    #[must_use]
    pub const fn new(base: DomainBase, frequency: Point2, phase: f64) -> Self {
        Self {
            base,
            frequency,
            phase,
        }
    }

    fn displacement(&self, point: Point2) -> Point2 {
        let offset = point - self.base.center;
        let amplitude = self.base.amplitude;
        Point2::new(
            amplitude * (offset.x * self.frequency.x + self.phase).sin(),
            amplitude * (offset.y * self.frequency.y + self.phase).cos(),
        )
    }
}

impl DomainMap for HarmonicDomain {
    fn base(&self) -> &DomainBase {
        &self.base
    }

    fn transform(&self, point: Point2, direction: Direction) -> Point2 {
        point + self.displacement(point) * direction.sign()
    }
}
