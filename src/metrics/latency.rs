use std::time::{Duration, Instant};

/// Wall-clock time between request arrival and completion.
/// Saturates to zero instead of panicking if the two instants are
/// somehow out of order; the caller is responsible for sampling them
/// from the same monotonic clock.
pub fn elapsed(arrival: Instant, completed: Instant) -> Duration {
    completed.saturating_duration_since(arrival)
}
