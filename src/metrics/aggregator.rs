use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

// ─── Public types ────────────────────────────────────────────────

/// Thread-safe running counters shared by both backends.
/// Handlers call `record()`, the `/metrics` endpoint calls `snapshot()`.
///
/// One aggregator instance lives for the whole process; it is built
/// once in `main` and handed to every adapter as an `Arc`. All fields
/// touched by `record()` sit behind a single mutex, so a snapshot can
/// never show `total_requests` bumped without the matching
/// success/failure increment.
pub struct MetricsAggregator {
    inner: Mutex<Inner>,
}

/// Immutable read of the aggregator state at one point in time.
/// Serialized as-is by the framework backend's `/metrics` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Percent of total, 0.0 while no requests have been recorded.
    pub success_rate: f64,
    pub failure_rate: f64,
    /// Duration of the most recently completed observation (μs).
    pub last_latency_us: u64,
    pub uptime_secs: f64,
    pub started_at: DateTime<Utc>,
}

// ─── Internal state ──────────────────────────────────────────────

struct Inner {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    // Overwritten on every observation, never accumulated.
    last_latency: Duration,
    started_at: DateTime<Utc>,
    // Monotonic anchor for uptime; wall clock only for display.
    start_instant: Instant,
}

// ─── MetricsAggregator impl ──────────────────────────────────────

impl MetricsAggregator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                total_requests: 0,
                successful_requests: 0,
                failed_requests: 0,
                last_latency: Duration::ZERO,
                started_at: Utc::now(),
                start_instant: Instant::now(),
            }),
        }
    }

    /// Record one completed observation and return the resulting
    /// snapshot for reporting. Total: cannot fail — an unrecognized
    /// request arrives here as `success == false`, not as an error.
    pub fn record(&self, success: bool, latency: Duration) -> MetricsSnapshot {
        let mut inner = self.inner.lock();
        inner.total_requests += 1;
        if success {
            inner.successful_requests += 1;
        } else {
            inner.failed_requests += 1;
        }
        inner.last_latency = latency;
        inner.snapshot()
    }

    /// Read-only snapshot, used by `GET /metrics`.
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().snapshot()
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Inner impl ──────────────────────────────────────────────────

impl Inner {
    fn snapshot(&self) -> MetricsSnapshot {
        // Guard the division — rates are defined as 0 until the
        // first observation lands.
        let (success_rate, failure_rate) = if self.total_requests > 0 {
            let total = self.total_requests as f64;
            (
                self.successful_requests as f64 / total * 100.0,
                self.failed_requests as f64 / total * 100.0,
            )
        } else {
            (0.0, 0.0)
        };

        MetricsSnapshot {
            total_requests: self.total_requests,
            successful_requests: self.successful_requests,
            failed_requests: self.failed_requests,
            success_rate,
            failure_rate,
            last_latency_us: self.last_latency.as_micros() as u64,
            uptime_secs: self.start_instant.elapsed().as_secs_f64(),
            started_at: self.started_at,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────
