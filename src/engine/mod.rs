//! The transformation engine: blended forward/inverse transforms, effective
//! grid size, snapping and the session state they run against.

mod cache;
mod grid;
pub mod metrics;
mod session;
mod snap;
mod transform;

pub use cache::{
    CacheKey, CacheName, CacheStore, CachedValue, DEFAULT_CACHE_CAPACITY, GridSignature, MemoCache,
    MemoCacheStats,
};
pub use grid::{GridCells, MAX_GRID_LINES, build_grid_cells};
pub use metrics::{EngineMetrics, EngineTimingReport, TimingBucket};
pub use session::{
    EngineView, GridSession, MAX_ZOOM, MIN_BASE_GRID_SIZE, MIN_ZOOM, SessionConfig, Viewport,
};
pub use snap::{FnSpace, SnapConfig, SnapEngine, SnapMode, SnapSpace};
pub use transform::{BlendingWeights, MIN_GRID_SIZE_FRACTION, TransformEngine};

#[cfg(test)]
mod tests;
