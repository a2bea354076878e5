use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Request counters for monitoring
#[derive(Clone)]
pub struct Metrics {
    pub requests: Arc<AtomicU64>,
    pub files_served: Arc<AtomicU64>,
    pub drops_served: Arc<AtomicU64>,
    pub drop_misses: Arc<AtomicU64>,
    pub auth_failures: Arc<AtomicU64>,
    pub index_rebuilds: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(AtomicU64::new(0)),
            files_served: Arc::new(AtomicU64::new(0)),
            drops_served: Arc::new(AtomicU64::new(0)),
            drop_misses: Arc::new(AtomicU64::new(0)),
            auth_failures: Arc::new(AtomicU64::new(0)),
            index_rebuilds: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_files_served(&self) {
        self.files_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_drops_served(&self) {
        self.drops_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_drop_misses(&self) {
        self.drop_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_auth_failures(&self) {
        self.auth_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_index_rebuilds(&self) {
        self.index_rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            files_served: self.files_served.load(Ordering::Relaxed),
            drops_served: self.drops_served.load(Ordering::Relaxed),
            drop_misses: self.drop_misses.load(Ordering::Relaxed),
            auth_failures: self.auth_failures.load(Ordering::Relaxed),
            index_rebuilds: self.index_rebuilds.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub files_served: u64,
    pub drops_served: u64,
    pub drop_misses: u64,
    pub auth_failures: u64,
    pub index_rebuilds: u64,
    pub uptime_seconds: u64,
}
