pub mod aggregator;
pub mod latency;
pub mod normalize;
pub mod report;

use std::time::Instant;

pub use aggregator::{MetricsAggregator, MetricsSnapshot};
pub use normalize::{classify, BackendRequest, Method, RequestView};
pub use report::SnapshotReporter;

/// The full observation chain shared by both backends:
/// normalize → classify → time → record → report.
///
/// Built once in `main` and handed to each server adapter as an
/// `Arc`; there is no global state anywhere in the crate.
pub struct MetricsPipeline {
    aggregator: MetricsAggregator,
    reporter: SnapshotReporter,
}

impl MetricsPipeline {
    pub fn new(aggregator: MetricsAggregator, reporter: SnapshotReporter) -> Self {
        Self {
            aggregator,
            reporter,
        }
    }

    /// Feed one completed request through the chain. `arrival` is the
    /// timestamp the adapter captured before doing any response work.
    ///
    /// Success is a property of the request alone; the status code the
    /// backend actually sent never enters the judgment.
    pub fn observe(&self, request: BackendRequest, arrival: Instant) {
        let completed = Instant::now();
        let view = request.normalize();
        let success = classify(&view);
        let latency = latency::elapsed(arrival, completed);
        let snapshot = self.aggregator.record(success, latency);
        self.reporter.report(&snapshot);
    }

    /// Current state without recording anything; serves `GET /metrics`.
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.aggregator.snapshot()
    }
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};

    struct NullSink;

    impl Write for NullSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn pipeline() -> MetricsPipeline {
        MetricsPipeline::new(
            MetricsAggregator::new(),
            SnapshotReporter::with_sink(Box::new(NullSink)),
        )
    }

    #[test]
    fn observations_from_both_backends_share_one_tally() {
        let pipeline = pipeline();
        let arrival = Instant::now();

        for _ in 0..10 {
            pipeline.observe(
                BackendRequest::Framework {
                    method: "GET".into(),
                    path: "/ping".into(),
                },
                arrival,
            );
        }
        for _ in 0..5 {
            pipeline.observe(
                BackendRequest::Raw {
                    command: Some("GET".into()),
                    path: Some("/missing".into()),
                },
                arrival,
            );
        }

        let snap = pipeline.snapshot();
        assert_eq!(snap.total_requests, 15);
        assert_eq!(snap.successful_requests, 10);
        assert_eq!(snap.failed_requests, 5);
        assert_eq!(format!("{:.2}", snap.success_rate), "66.67");
        assert_eq!(format!("{:.2}", snap.failure_rate), "33.33");
    }

    #[test]
    fn unparseable_raw_request_counts_as_failure() {
        let pipeline = pipeline();
        pipeline.observe(
            BackendRequest::Raw {
                command: None,
                path: None,
            },
            Instant::now(),
        );
        let snap = pipeline.snapshot();
        assert_eq!(snap.total_requests, 1);
        assert_eq!(snap.failed_requests, 1);
    }
}
