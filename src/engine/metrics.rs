//! Opt-in timing hooks for the transformation engine.
//!
//! Timing is only collected when the `engine_metrics` feature is enabled and
//! the target is not WASM (`std::time::Instant` is unavailable there). When
//! disabled, every call compiles down to running the closure.
//!
//! # Usage
//!
//! ```ignore
//! let mut metrics = EngineMetrics::default();
//! metrics.begin();
//! let p = metrics.time(TimingBucket::Forward, || engine.transform_point(&registry, point));
//! if let Some(report) = metrics.end() {
//!     println!("forward: {} ns", report.forward_ns);
//! }
//! ```

/// Categories of engine work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Forward transforms (including cache lookups).
    Forward,
    /// Inverse transforms.
    Inverse,
    /// Effective grid size queries.
    GridSize,
    /// Snapping.
    Snap,
    /// Grid-cell geometry generation.
    GridCells,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EngineTimingReport {
    pub forward_ns: u64,
    pub inverse_ns: u64,
    pub grid_size_ns: u64,
    pub snap_ns: u64,
    pub grid_cells_ns: u64,
}

impl EngineTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.forward_ns
            .saturating_add(self.inverse_ns)
            .saturating_add(self.grid_size_ns)
            .saturating_add(self.snap_ns)
            .saturating_add(self.grid_cells_ns)
    }

    /// Returns the total time in milliseconds (for display purposes).
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for timing engine operations.
///
/// When the `engine_metrics` feature is disabled (or on WASM), all methods
/// are no-ops and [`end`](Self::end) returns `None`.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
    report: EngineTimingReport,
}

impl EngineMetrics {
    /// Resets all timing counters to zero.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
        {
            self.report = EngineTimingReport::default();
        }
    }

    /// Returns the accumulated timing report, or `None` if metrics are disabled.
    #[must_use]
    pub fn end(&self) -> Option<EngineTimingReport> {
        #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "engine_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Times the execution of `f` and accumulates the elapsed time in `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            // Cap at u64::MAX to prevent overflow
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            self.add_to_bucket(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "engine_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }

    #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
    fn add_to_bucket(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = match bucket {
            TimingBucket::Forward => &mut self.report.forward_ns,
            TimingBucket::Inverse => &mut self.report.inverse_ns,
            TimingBucket::GridSize => &mut self.report.grid_size_ns,
            TimingBucket::Snap => &mut self.report.snap_ns,
            TimingBucket::GridCells => &mut self.report.grid_cells_ns,
        };
        *slot = slot.saturating_add(nanos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_report_total() {
        let report = EngineTimingReport {
            forward_ns: 1000,
            inverse_ns: 2000,
            snap_ns: 3000,
            ..EngineTimingReport::default()
        };
        assert_eq!(report.total_ns(), 6000);
        assert!((report.total_ms() - 0.006).abs() < 1e-9);
    }

    #[test]
    fn test_time_returns_closure_result() {
        let mut metrics = EngineMetrics::default();
        metrics.begin();
        let result = metrics.time(TimingBucket::Inverse, || 42);
        assert_eq!(result, 42);
    }

    #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
    #[test]
    fn test_end_reports_when_enabled() {
        let mut metrics = EngineMetrics::default();
        metrics.begin();
        metrics.time(TimingBucket::Forward, || std::hint::black_box(1 + 1));
        assert!(metrics.end().is_some());
    }
}
