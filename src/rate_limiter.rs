//! Throttled reporting of messages a sink had to drop.
//!
//! Drops are counted on every call; a `log::warn!` summarising them is
//! emitted at most once per interval. The interval is measured with an
//! injected time provider so tests can advance time by hand.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use log::warn;

/// Source of the current time in whole seconds.
pub type TimeProvider = Box<dyn Fn() -> u64 + Send + Sync>;

/// Counts dropped messages and warns about them at a bounded rate.
pub struct RateLimiter {
    name: String,
    interval_secs: u64,
    now: TimeProvider,
    window_start: AtomicU64,
    pending: AtomicU64,
    lifetime: AtomicU64,
}

impl RateLimiter {
    /// Create a limiter whose warnings are prefixed with `name`.
    ///
    /// The first window counts as already elapsed, so the first drop is
    /// reported at once unless the clock still reads below `interval_secs`.
    pub fn new(name: &str, interval_secs: u64, now: TimeProvider) -> Self {
        let start = now().saturating_sub(interval_secs);
        Self {
            name: name.to_owned(),
            interval_secs,
            now,
            window_start: AtomicU64::new(start),
            pending: AtomicU64::new(0),
            lifetime: AtomicU64::new(0),
        }
    }

    /// Count one dropped message, warning if the current window has closed.
    pub fn record_dropped(&self) {
        self.pending.fetch_add(1, Ordering::Relaxed);
        self.lifetime.fetch_add(1, Ordering::Relaxed);

        let now = (self.now)();
        let start = self.window_start.load(Ordering::Relaxed);
        if now.saturating_sub(start) < self.interval_secs {
            return;
        }
        // Only the caller that moves the window forward reports.
        if self
            .window_start
            .compare_exchange(start, now, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            self.report_dropped();
        }
    }

    /// Warn about every drop not yet reported, regardless of the window.
    pub fn report_dropped(&self) {
        let count = self.pending.swap(0, Ordering::Relaxed);
        if count == 0 {
            return;
        }
        warn!(
            "{}: {count} messages dropped in the last interval",
            self.name
        );
    }

    /// Drops counted but not yet reported.
    pub fn pending(&self) -> u64 {
        self.pending.load(Ordering::Relaxed)
    }

    /// Drops counted over the limiter's lifetime.
    pub fn total_dropped(&self) -> u64 {
        self.lifetime.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("name", &self.name)
            .field("interval_secs", &self.interval_secs)
            .field("pending", &self.pending())
            .field("total_dropped", &self.total_dropped())
            .finish_non_exhaustive()
    }
}

/// Seconds since the UNIX epoch, or 0 if the system clock is earlier.
pub fn system_time_provider() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
