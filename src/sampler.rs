//! Periodic throughput sampling.
//!
//! Every sample interval the [`Sampler`] records how many records were
//! completed since the previous sample. The history is bounded: once it grows
//! past [`HISTORY_CAPACITY`], the current average is appended and only the
//! newest [`HISTORY_CAPACITY`] entries are kept. Older precision is lost, but the
//! long-run average keeps influencing the estimate through the injected value.

use std::time::Duration;

use web_time::Instant;

/// Maximum number of per-interval deltas kept in the history.
pub const HISTORY_CAPACITY: usize = 500;

#[derive(Debug)]
pub(crate) struct Sampler {
    total: u64,
    last_count: u64,
    last_at: Option<Instant>,
    history: Vec<f64>,
}

impl Sampler {
    pub(crate) const fn new(total: u64) -> Self {
        Self {
            total,
            last_count: 0,
            last_at: None,
            history: Vec::new(),
        }
    }

    /// Seeds the sampler with the first reported count.
    pub(crate) fn start(&mut self, count: u64, now: Instant) {
        self.last_count = count;
        self.last_at = Some(now);
    }

    /// Records one interval and returns the projected time until `total`.
    ///
    /// Returns `None` before [`start`](Self::start), and whenever the average
    /// rate is zero or the projection is not finite.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn sample(&mut self, count: u64, now: Instant) -> Option<Duration> {
        let last_at = self.last_at?;
        let delta = count.saturating_sub(self.last_count);
        let elapsed = now.saturating_duration_since(last_at);

        self.last_count = count;
        self.last_at = Some(now);

        self.history.push(delta as f64);
        if self.history.len() > HISTORY_CAPACITY {
            if let Some(average) = self.average() {
                self.history.push(average);
            }
            let excess = self.history.len() - HISTORY_CAPACITY;
            self.history.drain(..excess);
        }

        let average = self.average()?;
        if average <= 0.0 {
            return None;
        }

        let remaining = self.total.saturating_sub(count) as f64;
        let millis = (elapsed.as_secs_f64() * 1000.0 / average * remaining).round();
        if !millis.is_finite() || millis < 0.0 {
            return None;
        }

        Duration::try_from_secs_f64(millis / 1000.0).ok()
    }

    /// Mean records completed per interval.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn average(&self) -> Option<f64> {
        if self.history.is_empty() {
            None
        } else {
            Some(self.history.iter().sum::<f64>() / self.history.len() as f64)
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.history.len()
    }
}
