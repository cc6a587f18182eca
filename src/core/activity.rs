//! Last-activity timestamp shared by the copy loop and the idle monitor

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic record of the most recent successful transfer.
///
/// The timestamp is kept as nanoseconds since a per-clock origin so it fits
/// in an `AtomicU64`. Updates use `fetch_max`, which keeps the value
/// non-decreasing even if two writers race.
#[derive(Debug)]
pub struct ActivityClock {
    origin: Instant,
    last_nanos: AtomicU64,
}

impl ActivityClock {
    /// Create a clock whose last activity is "now"
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last_nanos: AtomicU64::new(0),
        }
    }

    /// Record activity at the current instant
    pub fn touch(&self) {
        let now = Self::nanos(self.origin.elapsed());
        self.last_nanos.fetch_max(now, Ordering::AcqRel);
    }

    /// Instant of the last recorded activity
    pub fn last_activity(&self) -> Instant {
        self.origin + Duration::from_nanos(self.last_nanos.load(Ordering::Acquire))
    }

    /// Time elapsed since the last recorded activity
    pub fn idle(&self) -> Duration {
        let last = Duration::from_nanos(self.last_nanos.load(Ordering::Acquire));
        self.origin.elapsed().saturating_sub(last)
    }

    fn nanos(elapsed: Duration) -> u64 {
        // u64 nanoseconds cover ~584 years of uptime
        u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
    }
}

impl Default for ActivityClock {
    fn default() -> Self {
        Self::new()
    }
}
