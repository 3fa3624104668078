//! The progress controller.
//!
//! [`ProgressBar`] ties the other modules together. State is split the same
//! way the hot path and the timers touch it:
//!
//! * **Hot Data:** the ratcheted record count and the dirty flag are atomics.
//!   `report` updates them on every call, the timer threads read or set them
//!   without locking.
//! * **Sampling Data:** the throughput history and the last remaining-time
//!   label live behind a [`Mutex`](parking_lot::Mutex) that only the sample
//!   tick and the redraw path take.
//! * **Owned Data:** options, the output sink, the phase, and the line width
//!   are plain fields, since only the caller's thread renders.
//!
//! # Lifecycle
//!
//! A bar starts [`Phase::Uninitialized`]. The first valid report records the
//! session start, seeds the sampler and starts both timers
//! ([`Phase::Measuring`]). Reaching the total latches the elapsed-time label,
//! stops the timers and forces a final redraw ([`Phase::Complete`]); further
//! reports are accepted and ignored until [`ProgressBar::reset`].

use std::{
    fmt,
    io::{self, Write},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use compact_str::CompactString;
use parking_lot::Mutex;
use tracing::{debug, trace};
use web_time::Instant;

use crate::{
    builder::ProgressBuilder,
    clock::Clock,
    error::Error,
    eta,
    options::{Options, TickMode},
    render::{self, Frame, LineWidth},
    sampler::Sampler,
    ticker::Ticker,
};

/// Where a bar is in its run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// No progress has been reported yet.
    #[default]
    Uninitialized,
    /// Progress is being reported and measured.
    Measuring,
    /// The total has been reached.
    Complete,
}

/// State shared with the timer threads.
struct Shared {
    /// Ratcheted record count; `0` until the first report.
    current: AtomicU64,
    /// Set by the redraw timer, cleared after each render.
    dirty: AtomicBool,
    measure: Mutex<Measure>,
}

struct Measure {
    sampler: Sampler,
    remaining: CompactString,
}

impl Shared {
    fn new(total: u64) -> Self {
        Self {
            current: AtomicU64::new(0),
            dirty: AtomicBool::new(true),
            measure: Mutex::new(Measure {
                sampler: Sampler::new(total),
                remaining: CompactString::default(),
            }),
        }
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    fn sample(&self, clock: &dyn Clock) {
        let current = self.current.load(Ordering::Acquire);
        let mut measure = self.measure.lock();
        let estimate = measure.sampler.sample(current, clock.now());
        measure.remaining = eta::remaining_label(estimate, &clock.wall());
        trace!(current, ?estimate, remaining = %measure.remaining, "sampled throughput");
    }
}

/// The redraw and sampling timers of one measuring session.
struct Timers {
    _redraw: Ticker,
    _sample: Ticker,
}

impl Timers {
    fn start(options: &Options, shared: &Arc<Shared>, clock: &Arc<dyn Clock>) -> io::Result<Self> {
        let redraw_shared = shared.clone();
        let redraw = Ticker::spawn("etabar-redraw", options.redraw_interval(), move || {
            redraw_shared.mark_dirty();
        })?;

        let sample_shared = shared.clone();
        let sample_clock = clock.clone();
        let sample = Ticker::spawn("etabar-sample", options.sample_interval, move || {
            sample_shared.sample(sample_clock.as_ref());
        })?;

        Ok(Self {
            _redraw: redraw,
            _sample: sample,
        })
    }
}

/// A single-line terminal progress bar for a known number of records.
///
/// Call [`report`](Self::report) with the number of records completed so far,
/// as often as convenient; the bar redraws at most `fps` times per second.
///
/// ```no_run
/// let mut bar = etabar::ProgressBar::new(250)?;
/// for i in 0..250 {
///     // ... process record i ...
///     bar.report(i + 1)?;
/// }
/// # Ok::<(), etabar::Error>(())
/// ```
pub struct ProgressBar {
    options: Options,
    out: Box<dyn Write + Send>,
    clock: Arc<dyn Clock>,
    shared: Arc<Shared>,
    phase: Phase,
    started: Option<Instant>,
    total_time: Option<CompactString>,
    /// Set on completion until the final frame has been written.
    final_pending: bool,
    line: LineWidth,
    timers: Option<Timers>,
}

impl fmt::Debug for ProgressBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressBar")
            .field("total", &self.options.total)
            .field("current", &self.current())
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl ProgressBar {
    /// Creates a full-featured bar writing to stdout.
    ///
    /// # Errors
    ///
    /// Fails when `total` is not greater than one.
    pub fn new(total: u64) -> Result<Self, Error> {
        ProgressBuilder::new(total).build()
    }

    /// Creates the simplified bar writing to stdout.
    ///
    /// # Errors
    ///
    /// Fails when `total` is not greater than one.
    pub fn mini(total: u64) -> Result<Self, Error> {
        ProgressBuilder::mini(total).build()
    }

    /// Assembles a bar from validated parts.
    pub(crate) fn from_parts(
        options: Options,
        out: Box<dyn Write + Send>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let shared = Arc::new(Shared::new(options.total));
        Self {
            options,
            out,
            clock,
            shared,
            phase: Phase::Uninitialized,
            started: None,
            total_time: None,
            final_pending: false,
            line: LineWidth::default(),
            timers: None,
        }
    }

    /// Creates a bar with default options, writing to `out`.
    ///
    /// # Errors
    ///
    /// Fails when `total` is not greater than one.
    pub fn with_writer(total: u64, out: impl Write + Send + 'static) -> Result<Self, Error> {
        ProgressBuilder::new(total).with_writer(out).build()
    }

    // ========================================================================
    // Reporting
    // ========================================================================

    /// Reports that `current` records out of the total are done.
    ///
    /// Counts lower than an earlier report are ignored, as are all reports
    /// after completion. The line is redrawn only when a redraw is due, and
    /// always when the total is first reached. If writing the final frame
    /// fails, the next report retries it.
    ///
    /// # Errors
    ///
    /// Fails without changing any state when `current` is zero or exceeds the
    /// total. Also fails when the output cannot be written or a timer thread
    /// cannot be spawned.
    pub fn report(&mut self, current: u64) -> Result<(), Error> {
        if current < 1 {
            return Err(Error::invalid(
                "current",
                current,
                "should be integer >= 1 (when reporting a zero-based index, add one to it)",
            ));
        }
        if current > self.options.total {
            return Err(Error::invalid(
                "current",
                current,
                "should not exceed the configured total",
            ));
        }

        match self.phase {
            Phase::Complete if self.final_pending => return self.draw_final(),
            Phase::Complete => return Ok(()),
            Phase::Uninitialized => self.start_measuring(current)?,
            Phase::Measuring => {}
        }

        if current < self.shared.current.load(Ordering::Acquire) {
            return Ok(());
        }
        self.shared.current.store(current, Ordering::Release);

        if current >= self.options.total {
            self.complete();
            return self.draw_final();
        }

        if !self.shared.dirty.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        self.draw(current)
    }

    fn start_measuring(&mut self, current: u64) -> Result<(), Error> {
        // Stop any previous session's timers before starting new ones
        self.timers = None;

        let now = self.clock.now();
        self.started = Some(now);
        self.shared.measure.lock().sampler.start(current, now);

        if self.options.tick_mode == TickMode::Background {
            self.timers = Some(Timers::start(&self.options, &self.shared, &self.clock)?);
        }

        self.phase = Phase::Measuring;
        debug!(
            total = self.options.total,
            first = current,
            tick_mode = ?self.options.tick_mode,
            "started measuring progress"
        );
        Ok(())
    }

    fn complete(&mut self) {
        self.timers = None;

        let elapsed = self.elapsed().unwrap_or_default();
        self.total_time = Some(eta::total_time_label(elapsed, &self.clock.wall()));
        self.phase = Phase::Complete;
        self.final_pending = true;

        debug!(total = self.options.total, ?elapsed, "progress complete");
    }

    fn draw_final(&mut self) -> Result<(), Error> {
        self.shared.dirty.store(false, Ordering::Release);
        self.draw(self.options.total)?;
        self.final_pending = false;
        Ok(())
    }

    fn draw(&mut self, current: u64) -> Result<(), Error> {
        let remaining = match &self.total_time {
            Some(label) => label.clone(),
            None => self.shared.measure.lock().remaining.clone(),
        };

        let frame = Frame::new(&self.options, current, &remaining);
        let line = self.line.pad(frame.styled(&self.options));

        let mut output = String::with_capacity(line.len() + 2);
        if self.options.inplace {
            output.push('\r');
            output.push_str(&line);
            if self.phase == Phase::Complete {
                output.push('\n');
            }
        } else {
            output.push_str(&line);
            output.push('\n');
        }
        if self.options.term_title {
            output.push_str(&render::title_sequence(&frame.title()));
        }

        self.out.write_all(output.as_bytes())?;
        self.out.flush()?;

        trace!(
            current,
            percent = frame.percent,
            width = self.line.widest(),
            "redrew progress line"
        );
        Ok(())
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Stops the timers and clears all progress, keeping the options.
    pub fn reset(&mut self) {
        self.timers = None;
        self.shared = Arc::new(Shared::new(self.options.total));
        self.phase = Phase::Uninitialized;
        self.started = None;
        self.total_time = None;
        self.final_pending = false;
        self.line = LineWidth::default();

        debug!(total = self.options.total, "progress reset");
    }

    /// Replaces the options and clears all progress.
    ///
    /// # Errors
    ///
    /// Fails, leaving the bar untouched, when `options` do not validate.
    pub fn reset_with(&mut self, options: Options) -> Result<(), Error> {
        options.validate()?;
        self.options = options;
        self.reset();
        Ok(())
    }

    /// Marks a redraw as due. This is what the redraw timer does each tick.
    ///
    /// Only needed with [`TickMode::Manual`].
    pub fn tick(&self) {
        self.shared.mark_dirty();
    }

    /// Takes one throughput sample. This is what the sampling timer does each
    /// interval.
    ///
    /// Only needed with [`TickMode::Manual`]; does nothing before the first
    /// report.
    pub fn sample(&self) {
        if self.phase == Phase::Measuring {
            self.shared.sample(self.clock.as_ref());
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The resolved options.
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// The current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The highest count reported so far, if any.
    #[must_use]
    pub fn current(&self) -> Option<u64> {
        match self.shared.current.load(Ordering::Acquire) {
            0 => None,
            n => Some(n),
        }
    }

    /// The completion percentage of the highest count reported so far.
    #[must_use]
    pub fn percent(&self) -> u8 {
        self.current()
            .map_or(0, |current| render::percent(current, self.options.total))
    }

    /// Time since the first report.
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        let started = self.started?;
        Some(self.clock.now().saturating_duration_since(started))
    }

    /// Whether a redraw is due on the next report.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.shared.dirty.load(Ordering::Acquire)
    }

    /// Creates a consistent snapshot of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.into()
    }
}

/// A plain-data view of a [`ProgressBar`] at one point in time.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressSnapshot {
    phase: Phase,
    current: Option<u64>,
    total: u64,
    percent: u8,
    remaining: CompactString,
    elapsed: Option<Duration>,
    rate: Option<f64>,
    samples: usize,
}

impl From<&ProgressBar> for ProgressSnapshot {
    fn from(bar: &ProgressBar) -> Self {
        let measure = bar.shared.measure.lock();
        let remaining = bar
            .total_time
            .clone()
            .unwrap_or_else(|| measure.remaining.clone());
        let interval = bar.options.sample_interval.as_secs_f64();
        let rate = measure
            .sampler
            .average()
            .map(|per_interval| per_interval / interval);
        let samples = measure.sampler.len();
        drop(measure);

        Self {
            phase: bar.phase,
            current: bar.current(),
            total: bar.options.total,
            percent: bar.percent(),
            remaining,
            elapsed: bar.elapsed(),
            rate,
            samples,
        }
    }
}

impl ProgressSnapshot {
    /// Returns the phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the highest reported count, if any.
    #[must_use]
    pub const fn current(&self) -> Option<u64> {
        self.current
    }

    /// Returns the total.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Returns the completion percentage.
    #[must_use]
    pub const fn percent(&self) -> u8 {
        self.percent
    }

    /// Returns the remaining-time (or total-time) annotation.
    #[must_use]
    pub fn remaining(&self) -> &str {
        &self.remaining
    }

    /// Returns the time since the first report.
    #[must_use]
    pub const fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Returns the smoothed throughput in records per second.
    #[must_use]
    pub const fn rate(&self) -> Option<f64> {
        self.rate
    }

    /// Returns how many per-interval samples the estimate is based on.
    #[must_use]
    pub const fn samples(&self) -> usize {
        self.samples
    }
}
