//! Lightweight profiling module - tracks ONLY current totals
//!
//! Atomic counters, bumped by the engines as they run. Nothing here feeds back
//! into simulation state, so snapshots stay deterministic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Profiling statistics snapshot
/// Contains both raw counters and derived metrics
#[derive(Debug, Clone)]
pub struct ProfileStats {
    // Allocator
    pub allocations: u64,
    pub failed_allocations: u64,
    pub releases: u64,
    pub coalesces: u64,
    pub units_allocated: u64,
    pub units_released: u64,

    // Paging
    pub steps: u64,
    pub page_hits: u64,
    pub page_faults: u64,
    pub evictions: u64,

    pub uptime_secs: u64,
}

impl ProfileStats {
    /// Average size of a successful allocation
    #[inline]
    pub fn avg_allocation_size(&self) -> u64 {
        if self.allocations > 0 {
            self.units_allocated / self.allocations
        } else {
            0
        }
    }

    /// Fraction of allocation requests that were refused (0.0 - 1.0)
    pub fn refusal_ratio(&self) -> f64 {
        let attempts = self.allocations + self.failed_allocations;
        if attempts > 0 {
            self.failed_allocations as f64 / attempts as f64
        } else {
            0.0
        }
    }

    /// Fraction of page references that were hits (0.0 - 1.0)
    pub fn hit_ratio(&self) -> f64 {
        if self.steps > 0 {
            self.page_hits as f64 / self.steps as f64
        } else {
            0.0
        }
    }
}

/// Profiler - lock-free metric tracking
#[derive(Clone)]
pub struct Profiler {
    state: Arc<ProfilerState>,
}

struct ProfilerState {
    allocations: AtomicU64,
    failed_allocations: AtomicU64,
    releases: AtomicU64,
    coalesces: AtomicU64,
    units_allocated: AtomicU64,
    units_released: AtomicU64,

    steps: AtomicU64,
    page_hits: AtomicU64,
    page_faults: AtomicU64,
    evictions: AtomicU64,

    start_time: Instant,
}

impl Profiler {
    pub fn new() -> Self {
        Self {
            state: Arc::new(ProfilerState {
                allocations: AtomicU64::new(0),
                failed_allocations: AtomicU64::new(0),
                releases: AtomicU64::new(0),
                coalesces: AtomicU64::new(0),
                units_allocated: AtomicU64::new(0),
                units_released: AtomicU64::new(0),
                steps: AtomicU64::new(0),
                page_hits: AtomicU64::new(0),
                page_faults: AtomicU64::new(0),
                evictions: AtomicU64::new(0),
                start_time: Instant::now(),
            }),
        }
    }

    /// Get current statistics snapshot
    pub fn stats(&self) -> ProfileStats {
        let s = &self.state;
        ProfileStats {
            allocations: s.allocations.load(Ordering::Relaxed),
            failed_allocations: s.failed_allocations.load(Ordering::Relaxed),
            releases: s.releases.load(Ordering::Relaxed),
            coalesces: s.coalesces.load(Ordering::Relaxed),
            units_allocated: s.units_allocated.load(Ordering::Relaxed),
            units_released: s.units_released.load(Ordering::Relaxed),
            steps: s.steps.load(Ordering::Relaxed),
            page_hits: s.page_hits.load(Ordering::Relaxed),
            page_faults: s.page_faults.load(Ordering::Relaxed),
            evictions: s.evictions.load(Ordering::Relaxed),
            uptime_secs: s.start_time.elapsed().as_secs(),
        }
    }

    pub fn record_allocation(&self, size: usize) {
        self.state.allocations.fetch_add(1, Ordering::Relaxed);
        self.state
            .units_allocated
            .fetch_add(size as u64, Ordering::Relaxed);
    }

    pub fn record_failed_allocation(&self) {
        self.state.failed_allocations.fetch_add(1, Ordering::Relaxed);
    }

    /// A block was released; `merges` is how many neighbours it absorbed
    pub fn record_release(&self, size: usize, merges: usize) {
        self.state.releases.fetch_add(1, Ordering::Relaxed);
        self.state
            .units_released
            .fetch_add(size as u64, Ordering::Relaxed);
        self.state
            .coalesces
            .fetch_add(merges as u64, Ordering::Relaxed);
    }

    pub fn record_hit(&self) {
        self.state.steps.fetch_add(1, Ordering::Relaxed);
        self.state.page_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fault(&self, evicted: bool) {
        self.state.steps.fetch_add(1, Ordering::Relaxed);
        self.state.page_faults.fetch_add(1, Ordering::Relaxed);
        if evicted {
            self.state.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Profiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profiler").field("stats", &self.stats()).finish()
    }
}
