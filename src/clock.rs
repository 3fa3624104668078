//! Time sources.
//!
//! Throughput is measured on a monotonic [`Instant`], while human-readable
//! durations are rendered as calendar differences between wall-clock
//! timestamps. A [`Clock`] provides both so that tests (and simulations) can
//! substitute a [`ManualClock`].

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local, TimeDelta, Utc};
use parking_lot::Mutex;
use web_time::Instant;

/// A source of monotonic and wall-clock time.
pub trait Clock: Send + Sync {
    /// Current monotonic instant.
    fn now(&self) -> Instant;

    /// Current wall-clock timestamp.
    fn wall(&self) -> DateTime<FixedOffset>;
}

/// The real clock: [`Instant::now`] and the local time zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    wall_origin: DateTime<FixedOffset>,
    offset: Mutex<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(DateTime::<Utc>::UNIX_EPOCH.fixed_offset())
    }
}

impl ManualClock {
    /// A clock frozen at the Unix epoch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock whose wall time starts at `wall`.
    #[must_use]
    pub fn starting_at(wall: DateTime<FixedOffset>) -> Self {
        Self {
            origin: Instant::now(),
            wall_origin: wall,
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Moves both time lines forward by `by`.
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }

    /// Total time advanced since creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn wall(&self) -> DateTime<FixedOffset> {
        TimeDelta::from_std(self.elapsed())
            .ok()
            .and_then(|delta| self.wall_origin.checked_add_signed(delta))
            .unwrap_or(self.wall_origin)
    }
}
