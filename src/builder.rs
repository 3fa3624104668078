//! Fluent interface for constructing [`ProgressBar`] instances.
//!
//! [`ProgressBar::new`] covers the common case of a colored bar on stdout. The
//! [`ProgressBuilder`] exposes everything else.
//!
//! # Key Features
//!
//! * **Field-by-field overrides:** every setter touches exactly one field of the
//!   resolved [`Options`], so overriding the pending color keeps the default
//!   colors of the other four roles.
//! * **Validation at the end:** nothing is checked until [`build`](ProgressBuilder::build),
//!   which validates the complete configuration and either returns a working bar
//!   or the first violation. A partially configured bar is never constructed.
//! * **Injectable collaborators:** the output sink and the [`Clock`] can be
//!   replaced, which is how tests and simulations get deterministic output.

use std::{io::Write, sync::Arc, time::Duration};

use compact_str::CompactString;

use crate::{
    clock::{Clock, SystemClock},
    error::Error,
    options::{Format, Options, Paint, Palette, TickMode},
    progress::ProgressBar,
};

/// A builder pattern for constructing [`ProgressBar`] instances.
pub struct ProgressBuilder {
    options: Options,
    out: Option<Box<dyn Write + Send>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ProgressBuilder {
    /// Starts building a full-featured bar for `total` records.
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self::from_options(Options::new(total))
    }

    /// Starts building the simplified bar: narrower, ASCII glyphs, no title
    /// updates and a faster sampling interval.
    #[must_use]
    pub fn mini(total: u64) -> Self {
        Self::from_options(Options::mini(total))
    }

    /// Starts from an existing set of options.
    #[must_use]
    pub const fn from_options(options: Options) -> Self {
        Self {
            options,
            out: None,
            clock: None,
        }
    }

    /// Sets the bar width in characters.
    #[must_use]
    pub const fn with_width(mut self, width: usize) -> Self {
        self.options.width = width;
        self
    }

    /// Sets how counts are displayed.
    #[must_use]
    pub const fn with_format(mut self, format: Format) -> Self {
        self.options.format = format;
        self
    }

    /// Sets the maximum number of redraws per second.
    #[must_use]
    pub const fn with_fps(mut self, fps: u32) -> Self {
        self.options.fps = fps;
        self
    }

    /// Chooses between overwriting the current line and appending lines.
    #[must_use]
    pub const fn with_inplace(mut self, inplace: bool) -> Self {
        self.options.inplace = inplace;
        self
    }

    /// Sets the completed and pending glyphs.
    #[must_use]
    pub fn with_glyphs(
        mut self,
        completed: impl Into<CompactString>,
        pending: impl Into<CompactString>,
    ) -> Self {
        self.options.completed = completed.into();
        self.options.pending = pending.into();
        self
    }

    /// Enables or disables terminal title updates.
    #[must_use]
    pub const fn with_term_title(mut self, term_title: bool) -> Self {
        self.options.term_title = term_title;
        self
    }

    /// Replaces the whole palette.
    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.options.palette = palette;
        self
    }

    /// Sets the style of the percentage.
    #[must_use]
    pub fn with_percent_color(mut self, paint: impl Into<Paint>) -> Self {
        self.options.palette.percent = paint.into();
        self
    }

    /// Sets the style of the completed segment.
    #[must_use]
    pub fn with_completed_color(mut self, paint: impl Into<Paint>) -> Self {
        self.options.palette.completed = paint.into();
        self
    }

    /// Sets the style of the pending segment.
    #[must_use]
    pub fn with_pending_color(mut self, paint: impl Into<Paint>) -> Self {
        self.options.palette.pending = paint.into();
        self
    }

    /// Sets the style of the `<current> of <total>` counts.
    #[must_use]
    pub fn with_records_color(mut self, paint: impl Into<Paint>) -> Self {
        self.options.palette.records = paint.into();
        self
    }

    /// Sets the style of the remaining-time annotation.
    #[must_use]
    pub fn with_remaining_color(mut self, paint: impl Into<Paint>) -> Self {
        self.options.palette.remaining = paint.into();
        self
    }

    /// Sets the throughput sampling interval.
    #[must_use]
    pub const fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.options.sample_interval = interval;
        self
    }

    /// Chooses who drives the timers.
    #[must_use]
    pub const fn with_tick_mode(mut self, tick_mode: TickMode) -> Self {
        self.options.tick_mode = tick_mode;
        self
    }

    /// Sends output to `out` instead of stdout.
    #[must_use]
    pub fn with_writer(mut self, out: impl Write + Send + 'static) -> Self {
        self.out = Some(Box::new(out));
        self
    }

    /// Uses `clock` instead of the system clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// The options as configured so far.
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Validates the configuration and returns the bar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for the first field that violates its
    /// constraint.
    pub fn build(self) -> Result<ProgressBar, Error> {
        self.options.validate()?;

        let out = self
            .out
            .unwrap_or_else(|| Box::new(std::io::stdout()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Ok(ProgressBar::from_parts(self.options, out, clock))
    }
}
