use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::aggregator::MetricsSnapshot;

// ─── SnapshotReporter ────────────────────────────────────────────

/// Renders each snapshot as a textual block and emits it to a sink
/// (stdout by default). Both backends report through the same
/// instance; the whole block goes out as one locked write so
/// concurrent reports never interleave mid-line.
pub struct SnapshotReporter {
    sink: Mutex<Box<dyn Write + Send>>,
    // Latch so a broken sink is complained about once, then ignored.
    write_failed: AtomicBool,
}

impl SnapshotReporter {
    pub fn stdout() -> Self {
        Self::with_sink(Box::new(io::stdout()))
    }

    pub fn with_sink(sink: Box<dyn Write + Send>) -> Self {
        Self {
            sink: Mutex::new(sink),
            write_failed: AtomicBool::new(false),
        }
    }

    /// Emit one snapshot. Purely presentational: a sink that refuses
    /// the write must never take the request path down with it, so
    /// failures are logged once and otherwise swallowed.
    pub fn report(&self, snapshot: &MetricsSnapshot) {
        let block = render(snapshot);
        let mut sink = self.sink.lock();
        let result = sink
            .write_all(block.as_bytes())
            .and_then(|_| sink.flush());
        if result.is_err() && !self.write_failed.swap(true, Ordering::Relaxed) {
            eprintln!("metrics sink write failed; further snapshots may be lost");
        }
    }
}

/// Stable line-oriented format: counts, two-decimal percentages,
/// four-decimal latency in seconds.
fn render(snapshot: &MetricsSnapshot) -> String {
    format!(
        "\nMetrics:\n\
         Total requests: {}\n\
         Successful requests: {} ({:.2}%)\n\
         Failed requests: {} ({:.2}%)\n\
         Request latency: {:.4} seconds\n",
        snapshot.total_requests,
        snapshot.successful_requests,
        snapshot.success_rate,
        snapshot.failed_requests,
        snapshot.failure_rate,
        snapshot.last_latency_us as f64 / 1_000_000.0,
    )
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsAggregator;
    use std::sync::Arc;
    use std::time::Duration;

    /// Write-half handle over a shared buffer so the test can read
    /// back what the reporter emitted.
    #[derive(Clone)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn renders_the_stable_block_format() {
        let agg = MetricsAggregator::new();
        for _ in 0..2 {
            agg.record(true, Duration::from_micros(1_500));
        }
        let snap = agg.record(false, Duration::from_micros(1_500));

        let buf = SharedBuf(Arc::new(Mutex::new(Vec::new())));
        let reporter = SnapshotReporter::with_sink(Box::new(buf.clone()));
        reporter.report(&snap);

        let out = String::from_utf8(buf.0.lock().clone()).unwrap();
        assert_eq!(
            out,
            "\nMetrics:\n\
             Total requests: 3\n\
             Successful requests: 2 (66.67%)\n\
             Failed requests: 1 (33.33%)\n\
             Request latency: 0.0015 seconds\n"
        );
    }

    #[test]
    fn each_report_is_a_single_write() {
        // Line-level atomicity hinges on the block reaching the sink
        // in one write call; count the calls to prove it.
        struct CountingSink(Arc<Mutex<usize>>);
        impl Write for CountingSink {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                *self.0.lock() += 1;
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let calls = Arc::new(Mutex::new(0));
        let reporter =
            SnapshotReporter::with_sink(Box::new(CountingSink(calls.clone())));
        let snap = MetricsAggregator::new().record(true, Duration::ZERO);
        reporter.report(&snap);
        assert_eq!(*calls.lock(), 1);
    }

    #[test]
    fn broken_sink_is_swallowed() {
        let reporter = SnapshotReporter::with_sink(Box::new(BrokenSink));
        let snap = MetricsAggregator::new().record(true, Duration::ZERO);
        // Must not panic or propagate, however often it is hit.
        reporter.report(&snap);
        reporter.report(&snap);
        assert!(reporter.write_failed.load(Ordering::Relaxed));
    }
}
