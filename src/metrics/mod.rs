//! Observability counters for pool traffic and maintenance.
//!
//! Lock-free relaxed atomics; hot paths count here instead of logging.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics instance for the process.
pub static METRICS: Metrics = Metrics::new();

/// Relaxed ordering for counters (eventual visibility is fine for metrics).
const RELAXED: Ordering = Ordering::Relaxed;

/// Collection of all pool metrics.
pub struct Metrics {
    // Member lifecycle counters
    pub members_created: AtomicU64,
    pub members_culled: AtomicU64,
    pub members_wiped: AtomicU64,

    // Traffic counters
    pub takes: AtomicU64,
    pub releases: AtomicU64,
    pub delayed_releases_scheduled: AtomicU64,
    pub delayed_releases_cancelled: AtomicU64,

    // Pool registry counters
    pub pools_created: AtomicU64,
    pub pools_destroyed: AtomicU64,

    // Maintenance counters
    pub cull_passes: AtomicU64,
    pub adapt_passes: AtomicU64,

    // Manager start time (set on first access)
    start_time: AtomicU64,
}

impl Metrics {
    /// Create a new metrics instance with all counters at zero.
    pub const fn new() -> Self {
        Self {
            members_created: AtomicU64::new(0),
            members_culled: AtomicU64::new(0),
            members_wiped: AtomicU64::new(0),

            takes: AtomicU64::new(0),
            releases: AtomicU64::new(0),
            delayed_releases_scheduled: AtomicU64::new(0),
            delayed_releases_cancelled: AtomicU64::new(0),

            pools_created: AtomicU64::new(0),
            pools_destroyed: AtomicU64::new(0),

            cull_passes: AtomicU64::new(0),
            adapt_passes: AtomicU64::new(0),

            start_time: AtomicU64::new(0),
        }
    }

    /// Initialize start time. Call once at manager startup.
    pub fn init_start_time(&self) {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.start_time.store(now, RELAXED);
    }

    /// Get uptime in seconds since `init_start_time`.
    pub fn uptime_secs(&self) -> u64 {
        let start = self.start_time.load(RELAXED);
        if start == 0 {
            return 0;
        }
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        now.saturating_sub(start)
    }

    /// Increment a counter.
    #[inline]
    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, RELAXED);
    }

    /// Add to a counter.
    #[inline]
    pub fn add(&self, counter: &AtomicU64, value: u64) {
        counter.fetch_add(value, RELAXED);
    }

    /// Get counter value.
    #[inline]
    pub fn get(&self, counter: &AtomicU64) -> u64 {
        counter.load(RELAXED)
    }

    /// Get a snapshot of all metrics for reporting.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.uptime_secs(),

            members_created: self.members_created.load(RELAXED),
            members_culled: self.members_culled.load(RELAXED),
            members_wiped: self.members_wiped.load(RELAXED),

            takes: self.takes.load(RELAXED),
            releases: self.releases.load(RELAXED),
            delayed_releases_scheduled: self.delayed_releases_scheduled.load(RELAXED),
            delayed_releases_cancelled: self.delayed_releases_cancelled.load(RELAXED),

            pools_created: self.pools_created.load(RELAXED),
            pools_destroyed: self.pools_destroyed.load(RELAXED),

            cull_passes: self.cull_passes.load(RELAXED),
            adapt_passes: self.adapt_passes.load(RELAXED),
        }
    }
}

/// Point-in-time snapshot of all metrics.
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,

    pub members_created: u64,
    pub members_culled: u64,
    pub members_wiped: u64,

    pub takes: u64,
    pub releases: u64,
    pub delayed_releases_scheduled: u64,
    pub delayed_releases_cancelled: u64,

    pub pools_created: u64,
    pub pools_destroyed: u64,

    pub cull_passes: u64,
    pub adapt_passes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_operations() {
        let m = Metrics::new();
        assert_eq!(m.get(&m.takes), 0);

        m.inc(&m.takes);
        assert_eq!(m.get(&m.takes), 1);

        m.add(&m.takes, 10);
        assert_eq!(m.get(&m.takes), 11);
    }

    #[test]
    fn test_snapshot() {
        let m = Metrics::new();
        m.inc(&m.members_created);
        m.inc(&m.members_created);
        m.inc(&m.cull_passes);

        let snap = m.snapshot();
        assert_eq!(snap.members_created, 2);
        assert_eq!(snap.cull_passes, 1);
        assert_eq!(snap.takes, 0);
    }

    #[test]
    fn test_uptime_requires_init() {
        let m = Metrics::new();
        assert_eq!(m.uptime_secs(), 0);

        m.init_start_time();
        // Start time is "now", so uptime is 0 or barely more
        assert!(m.uptime_secs() < 5);
    }
}
