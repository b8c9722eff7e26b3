//! Noise domain: fractal value noise added to both coordinates.

use crate::geom::{Direction, FractalNoise, Point2};

use super::{DomainBase, DomainMap};

#[derive(Debug, Clone, PartialEq)]
pub struct NoiseDomain {
    base: DomainBase,
    noise: FractalNoise,
}

impl NoiseDomain {
    #[must_use]
    pub const fn new(
        base: DomainBase,
        scale: f64,
        octaves: u32,
        persistence: f64,
        seed: u32,
    ) -> Self {
        Self {
            base,
            noise: FractalNoise {
                scale,
                octaves,
                persistence,
                seed,
            },
        }
    }

    #[must_use]
    pub const fn noise(&self) -> &FractalNoise {
        &self.noise
    }

    /// The shared offset of both coordinates at `point`.
    fn offset(&self, point: Point2) -> f64 {
        self.noise.sample(point.x, point.y) * self.base.amplitude
    }
}

impl DomainMap for NoiseDomain {
    fn base(&self) -> &DomainBase {
        &self.base
    }

    fn transform(&self, point: Point2, direction: Direction) -> Point2 {
        let shift = self.offset(point) * direction.sign();
        point + Point2::new(shift, shift)
    }
}
