//! Forward and inverse point transformation over the active domains.
//!
//! The forward map is a weighted blend in output space: every domain with a
//! nonzero weight is evaluated on the original point, and the results are
//! combined with the flat (identity) residual:
//!
//! ```text
//! T(p) = flat * p + Σ wᵢ(p) · Tᵢ(p),   flat = max(0, 1 - Σ wᵢ(p))
//! ```
//!
//! Domain weights are not renormalized, so overlapping domains can push the
//! total influence above 1.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Domain, DomainId, DomainMap, DomainRegistry, InverseSettings, fixed_point_inverse,
    fixed_point_inverse_from,
};
use crate::geom::{Direction, Point2};

/// Lower bound of the effective grid size, as a fraction of the base size.
pub const MIN_GRID_SIZE_FRACTION: f64 = 0.2;

/// Per-domain weights at a point plus the flat residual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendingWeights {
    /// `(domain, weight)` pairs with weight > 0, in registration order.
    pub entries: Vec<(DomainId, f64)>,
    /// `max(0, 1 - Σ weights)`.
    pub flat: f64,
}

impl BlendingWeights {
    /// Weights of a point no domain touches.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            entries: Vec::new(),
            flat: 1.0,
        }
    }

    /// True when no domain has a nonzero weight.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the domain weights; may exceed 1.
    #[must_use]
    pub fn domain_total(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    #[must_use]
    pub fn weight_of(&self, id: DomainId) -> f64 {
        self.entries
            .iter()
            .find_map(|&(entry, w)| (entry == id).then_some(w))
            .unwrap_or(0.0)
    }
}

impl Default for BlendingWeights {
    fn default() -> Self {
        Self::identity()
    }
}

/// Stateless evaluator of the blended map over a registry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransformEngine {
    inverse: InverseSettings,
}

impl TransformEngine {
    #[must_use]
    pub const fn new(inverse: InverseSettings) -> Self {
        Self { inverse }
    }

    #[must_use]
    pub const fn inverse_settings(&self) -> &InverseSettings {
        &self.inverse
    }

    pub fn set_inverse_settings(&mut self, inverse: InverseSettings) {
        self.inverse = inverse;
    }

    #[must_use]
    pub fn blending_weights(&self, registry: &DomainRegistry, point: Point2) -> BlendingWeights {
        let entries: Vec<(DomainId, f64)> = registry
            .iter()
            .filter_map(|domain| {
                let w = domain.weight_at(point);
                (w > 0.0).then_some((domain.id(), w))
            })
            .collect();
        let total: f64 = entries.iter().map(|(_, w)| w).sum();
        BlendingWeights {
            entries,
            flat: (1.0 - total).max(0.0),
        }
    }

    /// Forward transform of `point`.
    #[must_use]
    pub fn transform_point(&self, registry: &DomainRegistry, point: Point2) -> Point2 {
        let weights = self.blending_weights(registry, point);
        self.blend(registry, &weights, point)
    }

    /// Forward transform of `point` using precomputed `weights`.
    #[must_use]
    pub fn blend(&self, registry: &DomainRegistry, weights: &BlendingWeights, point: Point2) -> Point2 {
        if weights.is_flat() {
            return point;
        }
        weights
            .entries
            .iter()
            .filter_map(|&(id, w)| registry.get(id).map(|domain| (domain, w)))
            .fold(point * weights.flat, |acc, (domain, w)| {
                acc + domain.transform(point, Direction::Forward) * w
            })
    }

    /// Approximate inverse of the blended map.
    ///
    /// Domains are undone in reverse registration order, each result feeding
    /// the next. For every domain the candidate preimage starts from the
    /// domain's own [`DomainMap::inverse`] and is refined against its
    /// single-domain blend `(1 - w) p + w T(p)`. The candidate is kept only
    /// where the domain actually has weight; otherwise the running estimate
    /// passes through unchanged. The result is accurate to the iteration
    /// tolerance (measured on the forward image) whenever at most one domain
    /// touches the point.
    #[must_use]
    pub fn inverse_transform_point(&self, registry: &DomainRegistry, point: Point2) -> Point2 {
        registry
            .iter()
            .rev()
            .fold(point, |current, domain| self.invert_domain(domain, current))
    }

    fn invert_domain(&self, domain: &Domain, target: Point2) -> Point2 {
        let settings = &self.inverse;
        let blended = |p: Point2| {
            let w = domain.weight_at(p);
            p * (1.0 - w) + domain.transform(p, Direction::Forward) * w
        };

        let raw = domain.inverse(target, settings);
        if raw.is_finite() && domain.weight_at(raw) > 0.0 {
            if blended(raw).distance_to(target) < settings.tolerance {
                return raw;
            }
            let refined = fixed_point_inverse_from(raw, target, settings, blended);
            if refined.converged && domain.weight_at(refined.point) > 0.0 {
                return refined.point;
            }
        }

        // Outside the domain the blend is the identity.
        if domain.weight_at(target) <= 0.0 {
            return target;
        }
        fixed_point_inverse(target, settings, blended).point
    }

    /// Local grid spacing at `point` for a nominal spacing of `base_size`.
    ///
    /// Each touching domain scales the spacing by
    /// `cf · (1 - w) + (1 - w/2) · w`; the result never drops below
    /// [`MIN_GRID_SIZE_FRACTION`] of `base_size`.
    #[must_use]
    pub fn effective_grid_size(&self, registry: &DomainRegistry, point: Point2, base_size: f64) -> f64 {
        let multiplier = registry
            .iter()
            .filter_map(|domain| {
                let w = domain.weight_at(point);
                (w > 0.0).then(|| domain.curvature_factor(point) * (1.0 - w) + (1.0 - w / 2.0) * w)
            })
            .product::<f64>();
        (base_size * MIN_GRID_SIZE_FRACTION).max(base_size * multiplier)
    }
}
