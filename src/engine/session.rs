//! A grid session: the mutable state one sculpting canvas works against.
//!
//! The session owns the domain registry, the derived caches, the viewport and
//! the engine parameters, and is the context every engine query runs in.
//! Every state-mutating call (registry add/remove/clear, viewport resize, pan,
//! zoom, parameter update) clears the derived caches before it returns, so a
//! read after a write always reflects the write.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{
    DEFAULT_MAX_ACTIVE_DOMAINS, DomainError, DomainId, DomainKind, DomainRegistry, DomainSpec,
    InverseSettings,
};
use crate::geom::Point2;

use super::cache::{CacheKey, CacheName, CacheStore, CachedValue, GridSignature, MemoCache, MemoCacheStats};
use super::grid::{GridCells, build_grid_cells};
use super::metrics::{EngineMetrics, EngineTimingReport, TimingBucket};
use super::snap::{SnapConfig, SnapEngine, SnapMode, SnapSpace};
use super::transform::{BlendingWeights, TransformEngine};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
/// Smallest accepted base grid size.
pub const MIN_BASE_GRID_SIZE: f64 = 1.0;

/// Session parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub max_active_domains: usize,
    /// Nominal grid spacing in world units.
    pub base_grid_size: f64,
    pub inverse: InverseSettings,
    pub snap: SnapConfig,
    pub viewport: Viewport,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_active_domains: DEFAULT_MAX_ACTIVE_DOMAINS,
            base_grid_size: 20.0,
            inverse: InverseSettings::default(),
            snap: SnapConfig::default(),
            viewport: Viewport::default(),
        }
    }
}

/// Screen-space window onto the world plane.
///
/// `world = (screen - size / 2 - pan) / zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pan: Point2,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            pan: Point2::ORIGIN,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    fn half_size(&self) -> Point2 {
        Point2::new(self.width * 0.5, self.height * 0.5)
    }

    #[must_use]
    pub fn screen_to_world(&self, screen: Point2) -> Point2 {
        (screen - self.half_size() - self.pan) / self.zoom
    }

    #[must_use]
    pub fn world_to_screen(&self, world: Point2) -> Point2 {
        world * self.zoom + self.half_size() + self.pan
    }

    /// World-space corners (min, max) of the visible area.
    #[must_use]
    pub fn visible_world_bounds(&self) -> (Point2, Point2) {
        (
            self.screen_to_world(Point2::ORIGIN),
            self.screen_to_world(Point2::new(self.width, self.height)),
        )
    }

    #[must_use]
    pub fn signature(&self, step: f64) -> GridSignature {
        GridSignature::new(self.width, self.height, self.pan, self.zoom, step)
    }
}

/// [`SnapSpace`] over a registry, uncached.
#[derive(Debug, Clone, Copy)]
pub struct EngineView<'a> {
    pub engine: &'a TransformEngine,
    pub registry: &'a DomainRegistry,
    pub base_grid_size: f64,
}

impl SnapSpace for EngineView<'_> {
    fn transform_point(&self, point: Point2) -> Point2 {
        self.engine.transform_point(self.registry, point)
    }

    fn inverse_transform_point(&self, point: Point2) -> Point2 {
        self.engine.inverse_transform_point(self.registry, point)
    }

    fn grid_size_at(&self, point: Point2) -> f64 {
        self.engine
            .effective_grid_size(self.registry, point, self.base_grid_size)
    }
}

#[derive(Debug)]
pub struct GridSession {
    registry: DomainRegistry,
    cache: MemoCache,
    engine: TransformEngine,
    snap: SnapEngine,
    viewport: Viewport,
    base_grid_size: f64,
    metrics: EngineMetrics,
}

impl Default for GridSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl GridSession {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let mut viewport = config.viewport;
        viewport.zoom = clamp_zoom(viewport.zoom);
        Self {
            registry: DomainRegistry::with_capacity(config.max_active_domains),
            cache: MemoCache::new(),
            engine: TransformEngine::new(config.inverse),
            snap: SnapEngine::new(config.snap),
            viewport,
            base_grid_size: sanitize_grid_size(config.base_grid_size, 20.0),
            metrics: EngineMetrics::default(),
        }
    }

    // ------------------------------------------------------------------------
    // Domain lifecycle
    // ------------------------------------------------------------------------

    /// # Errors
    /// Returns [`DomainError`] when `spec` is invalid for `kind`.
    pub fn create_domain(&mut self, kind: DomainKind, spec: &DomainSpec) -> Result<DomainId, DomainError> {
        self.registry.create(kind, spec, &mut self.cache)
    }

    /// Like [`create_domain`](Self::create_domain) with the kind given by name.
    ///
    /// # Errors
    /// Returns [`DomainError::UnknownKind`] for an unrecognized name.
    pub fn create_domain_named(&mut self, kind: &str, spec: &DomainSpec) -> Result<DomainId, DomainError> {
        let kind: DomainKind = kind.parse()?;
        self.create_domain(kind, spec)
    }

    pub fn remove_domain(&mut self, id: DomainId) -> bool {
        self.registry.remove(id, &mut self.cache)
    }

    pub fn clear_domains(&mut self) {
        self.registry.clear(&mut self.cache);
    }

    pub fn set_max_active_domains(&mut self, capacity: usize) {
        self.registry.set_capacity(capacity, &mut self.cache);
    }

    #[must_use]
    pub const fn domains(&self) -> &DomainRegistry {
        &self.registry
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Cached blending weights at `point`.
    pub fn blending_weights(&mut self, point: Point2) -> Arc<BlendingWeights> {
        let key = CacheKey::point(point);
        if let Some(CachedValue::Weights(weights)) = self.cache.get(CacheName::BlendWeights, &key) {
            return weights;
        }
        let weights = Arc::new(self.engine.blending_weights(&self.registry, point));
        self.cache
            .set(CacheName::BlendWeights, key, CachedValue::Weights(Arc::clone(&weights)));
        weights
    }

    /// Cached forward transform of `point`.
    pub fn transform_point(&mut self, point: Point2) -> Point2 {
        let key = CacheKey::point(point);
        if let Some(CachedValue::Point(cached)) = self.cache.get(CacheName::Transform, &key) {
            return cached;
        }
        let weights = self.blending_weights(point);
        let engine = &self.engine;
        let registry = &self.registry;
        let result = self
            .metrics
            .time(TimingBucket::Forward, || engine.blend(registry, &weights, point));
        self.cache
            .set(CacheName::Transform, key, CachedValue::Point(result));
        result
    }

    pub fn inverse_transform_point(&mut self, point: Point2) -> Point2 {
        let engine = &self.engine;
        let registry = &self.registry;
        self.metrics.time(TimingBucket::Inverse, || {
            engine.inverse_transform_point(registry, point)
        })
    }

    /// Effective grid size at `point` for the session's base grid size.
    pub fn effective_grid_size(&mut self, point: Point2) -> f64 {
        let base = self.base_grid_size;
        self.effective_grid_size_with(point, base)
    }

    pub fn effective_grid_size_with(&mut self, point: Point2, base_size: f64) -> f64 {
        let engine = &self.engine;
        let registry = &self.registry;
        self.metrics.time(TimingBucket::GridSize, || {
            engine.effective_grid_size(registry, point, base_size)
        })
    }

    pub fn snap(&mut self, point: Point2) -> Point2 {
        let view = EngineView {
            engine: &self.engine,
            registry: &self.registry,
            base_grid_size: self.base_grid_size,
        };
        let snap = &self.snap;
        self.metrics
            .time(TimingBucket::Snap, || snap.snap(point, &view))
    }

    pub fn snap_to_candidates(&mut self, point: Point2, candidates: &[Point2]) -> Point2 {
        let snap = &self.snap;
        self.metrics.time(TimingBucket::Snap, || {
            snap.snap_to_candidates(point, candidates)
        })
    }

    /// Deformed grid nodes covering the visible area, cached per viewport.
    pub fn grid_cells(&mut self) -> Arc<GridCells> {
        let key = CacheKey::Grid(self.viewport.signature(self.base_grid_size));
        if let Some(CachedValue::Cells(cells)) = self.cache.get(CacheName::GridCells, &key) {
            return cells;
        }
        let (min, max) = self.viewport.visible_world_bounds();
        let engine = &self.engine;
        let registry = &self.registry;
        let step = self.base_grid_size;
        let cells = Arc::new(self.metrics.time(TimingBucket::GridCells, || {
            build_grid_cells(min, max, step, |p| engine.transform_point(registry, p))
        }));
        self.cache
            .set(CacheName::GridCells, key, CachedValue::Cells(Arc::clone(&cells)));
        cells
    }

    #[must_use]
    pub fn screen_to_world(&self, screen: Point2) -> Point2 {
        self.viewport.screen_to_world(screen)
    }

    #[must_use]
    pub fn world_to_screen(&self, world: Point2) -> Point2 {
        self.viewport.world_to_screen(world)
    }

    // ------------------------------------------------------------------------
    // Viewport and parameter updates
    // ------------------------------------------------------------------------

    pub fn resize(&mut self, width: f64, height: f64) {
        if width.is_finite() {
            self.viewport.width = width.max(0.0);
        }
        if height.is_finite() {
            self.viewport.height = height.max(0.0);
        }
        self.invalidate("resize");
    }

    pub fn set_pan(&mut self, pan: Point2) {
        if pan.is_finite() {
            self.viewport.pan = pan;
        }
        self.invalidate("pan");
    }

    pub fn pan_by(&mut self, delta: Point2) {
        let pan = self.viewport.pan + delta;
        self.set_pan(pan);
    }

    /// Sets the zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.zoom = clamp_zoom(zoom);
        self.invalidate("zoom");
    }

    /// Multiplies the zoom by `factor`, keeping the world point under
    /// `screen_anchor` fixed on screen.
    pub fn zoom_at(&mut self, screen_anchor: Point2, factor: f64) {
        let world = self.viewport.screen_to_world(screen_anchor);
        self.viewport.zoom = clamp_zoom(self.viewport.zoom * factor);
        let pan = screen_anchor - self.viewport.half_size() - world * self.viewport.zoom;
        if pan.is_finite() {
            self.viewport.pan = pan;
        }
        self.invalidate("zoom");
    }

    pub fn set_base_grid_size(&mut self, size: f64) {
        self.base_grid_size = sanitize_grid_size(size, self.base_grid_size);
        self.invalidate("grid size");
    }

    pub fn set_snap_config(&mut self, config: SnapConfig) {
        self.snap.set_config(config);
        self.invalidate("snap config");
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.snap.set_enabled(enabled);
        self.invalidate("snap enabled");
    }

    pub fn set_snap_mode(&mut self, mode: SnapMode) {
        self.snap.set_mode(mode);
        self.invalidate("snap mode");
    }

    /// Sets the snap strength, clamped to `[0, 1]`.
    pub fn set_snap_strength(&mut self, strength: f64) {
        self.snap.set_strength(strength);
        self.invalidate("snap strength");
    }

    /// Sets the candidate attraction distance, clamped to `>= 0`.
    pub fn set_snap_tolerance(&mut self, tolerance: f64) {
        self.snap.set_tolerance(tolerance);
        self.invalidate("snap tolerance");
    }

    pub fn set_inverse_settings(&mut self, settings: InverseSettings) {
        self.engine.set_inverse_settings(settings);
        self.invalidate("inverse settings");
    }

    /// Applies every parameter of `config`; registered domains are kept
    /// unless the new capacity evicts them.
    pub fn apply_config(&mut self, config: &SessionConfig) {
        self.registry
            .set_capacity(config.max_active_domains, &mut self.cache);
        self.engine.set_inverse_settings(config.inverse);
        self.snap.set_config(config.snap);
        self.base_grid_size = sanitize_grid_size(config.base_grid_size, self.base_grid_size);
        self.viewport = config.viewport;
        self.viewport.zoom = clamp_zoom(self.viewport.zoom);
        self.invalidate("config");
    }

    /// Current parameters as a [`SessionConfig`].
    #[must_use]
    pub fn config(&self) -> SessionConfig {
        SessionConfig {
            max_active_domains: self.registry.capacity(),
            base_grid_size: self.base_grid_size,
            inverse: *self.engine.inverse_settings(),
            snap: *self.snap.config(),
            viewport: self.viewport,
        }
    }

    fn invalidate(&mut self, reason: &str) {
        self.cache.clear_all();
        log::debug!("derived caches invalidated ({reason})");
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub const fn base_grid_size(&self) -> f64 {
        self.base_grid_size
    }

    #[must_use]
    pub const fn snap_config(&self) -> &SnapConfig {
        self.snap.config()
    }

    #[must_use]
    pub const fn inverse_settings(&self) -> &InverseSettings {
        self.engine.inverse_settings()
    }

    #[must_use]
    pub fn cache_stats(&self) -> MemoCacheStats {
        self.cache.stats()
    }

    /// Read access to the derived caches, for inspection.
    #[must_use]
    pub const fn cache(&self) -> &MemoCache {
        &self.cache
    }

    /// Zeroes the timing counters.
    pub fn reset_timings(&mut self) {
        self.metrics.begin();
    }

    /// Accumulated timings, or `None` when metrics are compiled out.
    #[must_use]
    pub fn timing_report(&self) -> Option<EngineTimingReport> {
        self.metrics.end()
    }
}

fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        1.0
    }
}

fn sanitize_grid_size(size: f64, fallback: f64) -> f64 {
    if size.is_finite() {
        size.max(MIN_BASE_GRID_SIZE)
    } else {
        fallback
    }
}
