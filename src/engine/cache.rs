//! Derived-value caching for the grid session.
//!
//! The engine memoizes three kinds of derived values, each in its own named
//! cache:
//!
//! - forward-transform results, keyed by the exact input coordinates
//! - blending weights, keyed by the exact input coordinates
//! - grid-cell geometry, keyed by a viewport/grid-size signature
//!
//! [`CacheStore`] is the contract the registry and the session talk to;
//! [`MemoCache`] is the in-process implementation with hit/miss statistics.
//! Keys are exact bit patterns: there is no fuzzy or similarity matching.
//! Each named cache holds at most [`DEFAULT_CACHE_CAPACITY`] entries; a full
//! cache is flushed before the next new key goes in.
//!
//! # Example
//! ```ignore
//! let mut cache = MemoCache::new();
//! let key = CacheKey::point(Point2::new(1.0, 2.0));
//! cache.set(CacheName::Transform, key, CachedValue::Point(Point2::new(3.0, 4.0)));
//! assert!(cache.has(CacheName::Transform, &key));
//! cache.clear(CacheName::Transform);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::geom::Point2;

use super::grid::GridCells;
use super::transform::BlendingWeights;

/// Entry limit of each named cache in [`MemoCache::new`].
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// The named caches of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheName {
    Transform,
    BlendWeights,
    GridCells,
}

impl CacheName {
    pub const ALL: [Self; 3] = [Self::Transform, Self::BlendWeights, Self::GridCells];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::BlendWeights => "blend-weights",
            Self::GridCells => "grid-cells",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Transform => 0,
            Self::BlendWeights => 1,
            Self::GridCells => 2,
        }
    }
}

impl fmt::Display for CacheName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signature of the visible grid: viewport geometry plus grid step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSignature {
    width: u64,
    height: u64,
    pan_x: u64,
    pan_y: u64,
    zoom: u64,
    step: u64,
}

impl GridSignature {
    #[must_use]
    pub fn new(width: f64, height: f64, pan: Point2, zoom: f64, step: f64) -> Self {
        Self {
            width: width.to_bits(),
            height: height.to_bits(),
            pan_x: pan.x.to_bits(),
            pan_y: pan.y.to_bits(),
            zoom: zoom.to_bits(),
            step: step.to_bits(),
        }
    }
}

/// Cache key: exact coordinates or a grid signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Point { x: u64, y: u64 },
    Grid(GridSignature),
}

impl CacheKey {
    #[must_use]
    pub fn point(point: Point2) -> Self {
        Self::Point {
            x: point.x.to_bits(),
            y: point.y.to_bits(),
        }
    }
}

/// A cached derived value.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Point(Point2),
    Weights(Arc<BlendingWeights>),
    Cells(Arc<GridCells>),
}

/// Named key-value cache used for derived results.
pub trait CacheStore {
    /// Looks up `key` in the named cache. Takes `&mut self` so implementations
    /// can keep access statistics.
    fn get(&mut self, name: CacheName, key: &CacheKey) -> Option<CachedValue>;

    fn set(&mut self, name: CacheName, key: CacheKey, value: CachedValue);

    fn has(&self, name: CacheName, key: &CacheKey) -> bool;

    /// Drops every entry of the named cache.
    fn clear(&mut self, name: CacheName);

    /// Drops every entry of every named cache.
    fn clear_all(&mut self) {
        for name in CacheName::ALL {
            self.clear(name);
        }
    }
}

/// Cache statistics for diagnostics and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoCacheStats {
    pub transform_entries: usize,
    pub blend_weight_entries: usize,
    pub grid_cell_entries: usize,
    pub transform_hits: usize,
    pub transform_misses: usize,
    pub blend_weight_hits: usize,
    pub blend_weight_misses: usize,
    pub grid_cell_hits: usize,
    pub grid_cell_misses: usize,
    /// Number of `clear` calls that dropped at least one entry.
    pub invalidations: usize,
    /// Number of times a full cache was flushed to make room.
    pub evictions: usize,
}

impl MemoCacheStats {
    /// Returns the total number of cache entries across all caches.
    #[must_use]
    pub const fn total_entries(&self) -> usize {
        self.transform_entries + self.blend_weight_entries + self.grid_cell_entries
    }

    #[must_use]
    pub const fn total_hits(&self) -> usize {
        self.transform_hits + self.blend_weight_hits + self.grid_cell_hits
    }

    #[must_use]
    pub const fn total_misses(&self) -> usize {
        self.transform_misses + self.blend_weight_misses + self.grid_cell_misses
    }

    /// Returns the cache hit rate as a value between 0.0 and 1.0.
    /// Returns 0.0 if no cache accesses have been made.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_hits() + self.total_misses();
        if total == 0 {
            0.0
        } else {
            self.total_hits() as f64 / total as f64
        }
    }
}

/// In-process [`CacheStore`] with per-cache hit/miss counters.
#[derive(Debug)]
pub struct MemoCache {
    entries: [HashMap<CacheKey, CachedValue>; 3],
    capacity: usize,
    hits: [usize; 3],
    misses: [usize; 3],
    invalidations: usize,
    evictions: usize,
}

impl Default for MemoCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl MemoCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding at most `capacity` entries (minimum 1) per named cache.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Default::default(),
            capacity: capacity.max(1),
            hits: [0; 3],
            misses: [0; 3],
            invalidations: 0,
            evictions: 0,
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self, name: CacheName) -> usize {
        self.entries[name.index()].len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(HashMap::is_empty)
    }

    #[must_use]
    pub fn stats(&self) -> MemoCacheStats {
        let [transform, weights, cells] = &self.entries;
        MemoCacheStats {
            transform_entries: transform.len(),
            blend_weight_entries: weights.len(),
            grid_cell_entries: cells.len(),
            transform_hits: self.hits[0],
            transform_misses: self.misses[0],
            blend_weight_hits: self.hits[1],
            blend_weight_misses: self.misses[1],
            grid_cell_hits: self.hits[2],
            grid_cell_misses: self.misses[2],
            invalidations: self.invalidations,
            evictions: self.evictions,
        }
    }

    /// Resets hit/miss counters without clearing cached data.
    pub fn reset_counters(&mut self) {
        self.hits = [0; 3];
        self.misses = [0; 3];
        self.invalidations = 0;
        self.evictions = 0;
    }
}

impl CacheStore for MemoCache {
    fn get(&mut self, name: CacheName, key: &CacheKey) -> Option<CachedValue> {
        let index = name.index();
        let found = self.entries[index].get(key).cloned();
        if found.is_some() {
            self.hits[index] += 1;
        } else {
            self.misses[index] += 1;
        }
        found
    }

    fn set(&mut self, name: CacheName, key: CacheKey, value: CachedValue) {
        let entries = &mut self.entries[name.index()];
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            entries.clear();
            self.evictions += 1;
            log::trace!("{name} cache full; flushed");
        }
        entries.insert(key, value);
    }

    fn has(&self, name: CacheName, key: &CacheKey) -> bool {
        self.entries[name.index()].contains_key(key)
    }

    fn clear(&mut self, name: CacheName) {
        let entries = &mut self.entries[name.index()];
        if !entries.is_empty() {
            entries.clear();
            self.invalidations += 1;
        }
    }
}
