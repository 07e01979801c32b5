//! Basic Metrics
//!
//! Operation counters, cache hit ratio and latency tracking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Operation kinds tracked by [`Metrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Insert,
    Search,
    Delete,
    Sweep,
}

impl Op {
    const ALL: [Op; 4] = [Op::Insert, Op::Search, Op::Delete, Op::Sweep];

    fn slot(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Op::Insert => "insert",
            Op::Search => "search",
            Op::Delete => "delete",
            Op::Sweep => "sweep",
        }
    }
}

/// Metrics collector
#[derive(Debug)]
pub struct Metrics {
    /// Operations per kind, indexed by `Op::slot`
    ops: [AtomicU64; 4],

    cache_hits: AtomicU64,
    cache_misses: AtomicU64,

    /// Entries removed because their TTL elapsed (lazy and swept)
    expired: AtomicU64,

    /// Latency tracking (simplified)
    latency_sum_us: AtomicU64,
    latency_count: AtomicU64,
    latency_min_us: AtomicU64,
    latency_max_us: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self {
            ops: Default::default(),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            expired: AtomicU64::new(0),
            latency_sum_us: AtomicU64::new(0),
            latency_count: AtomicU64::new(0),
            latency_min_us: AtomicU64::new(u64::MAX),
            latency_max_us: AtomicU64::new(0),
        }
    }

    /// Record an operation
    pub fn record_operation(&self, op: Op, latency: Duration) {
        self.ops[op.slot()].fetch_add(1, Ordering::Relaxed);

        let latency_us = latency.as_micros() as u64;
        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
        self.latency_count.fetch_add(1, Ordering::Relaxed);
        self.latency_min_us.fetch_min(latency_us, Ordering::Relaxed);
        self.latency_max_us.fetch_max(latency_us, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expired(&self, count: u64) {
        self.expired.fetch_add(count, Ordering::Relaxed);
    }

    /// Get total operations count
    pub fn total_ops(&self) -> u64 {
        self.ops.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    /// Get operations count for one kind
    pub fn ops(&self, op: Op) -> u64 {
        self.ops[op.slot()].load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    /// Fraction of searches answered by the recency cache
    pub fn cache_hit_ratio(&self) -> f64 {
        let hits = self.cache_hits();
        let total = hits + self.cache_misses();
        if total == 0 {
            return 0.0;
        }
        hits as f64 / total as f64
    }

    pub fn expired(&self) -> u64 {
        self.expired.load(Ordering::Relaxed)
    }

    /// Get average latency in microseconds
    pub fn avg_latency_us(&self) -> f64 {
        let count = self.latency_count.load(Ordering::Relaxed);
        if count == 0 {
            return 0.0;
        }
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        sum as f64 / count as f64
    }

    /// Get min latency in microseconds
    pub fn min_latency_us(&self) -> u64 {
        let min = self.latency_min_us.load(Ordering::Relaxed);
        if min == u64::MAX {
            0
        } else {
            min
        }
    }

    /// Get max latency in microseconds
    pub fn max_latency_us(&self) -> u64 {
        self.latency_max_us.load(Ordering::Relaxed)
    }

    /// Get a summary of metrics
    pub fn summary(&self) -> String {
        let per_op = Op::ALL
            .iter()
            .map(|op| format!("{}={}", op.name(), self.ops(*op)))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "Operations: {} ({}) | Cache hit ratio: {:.2} | Expired: {} | Latency (µs): avg={:.1}, min={}, max={}",
            self.total_ops(),
            per_op,
            self.cache_hit_ratio(),
            self.expired(),
            self.avg_latency_us(),
            self.min_latency_us(),
            self.max_latency_us()
        )
    }
}
