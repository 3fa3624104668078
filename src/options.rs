//! Resolved configuration for a [`ProgressBar`](crate::ProgressBar).
//!
//! [`Options`] is a plain struct whose constructor fills every field with the
//! full-bar defaults. Individual fields (including single palette slots) can be
//! overridden directly or through [`ProgressBuilder`](crate::ProgressBuilder);
//! nothing is used until [`Options::validate`] has accepted the result.

use std::{fmt, sync::Arc, time::Duration};

use compact_str::CompactString;
use console::Style;

use crate::error::Error;

/// Default bar width in characters.
pub const DEFAULT_WIDTH: usize = 60;

/// Default redraw frequency (frames per second).
pub const DEFAULT_FPS: u32 = 25;

/// Default throughput sampling interval of the full bar.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(1000);

/// Sampling interval of the mini bar.
pub const MINI_SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// How the record counts are displayed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Format {
    /// Plain integers: `12 of 250`.
    #[default]
    Number,
    /// Human byte sizes: `1.02 kB of 2.05 kB`.
    Bytes,
}

/// Who drives the sampling and redraw timers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TickMode {
    /// Two background threads tick at the configured rates.
    #[default]
    Background,
    /// No threads are spawned; the caller invokes
    /// [`ProgressBar::tick`](crate::ProgressBar::tick) and
    /// [`ProgressBar::sample`](crate::ProgressBar::sample) from its own loop.
    Manual,
}

/// A string transform applied to one semantic part of the rendered line.
///
/// Usually built from a [`console::Style`], but any `Fn(&str) -> String` works.
#[derive(Clone)]
pub struct Paint(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl Paint {
    /// Wraps an arbitrary string transform.
    pub fn new(paint: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(paint))
    }

    /// The identity transform.
    #[must_use]
    pub fn plain() -> Self {
        Self::new(str::to_owned)
    }

    /// Applies the transform.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        (self.0)(text)
    }
}

impl From<Style> for Paint {
    fn from(style: Style) -> Self {
        Self::new(move |text| style.apply_to(text).to_string())
    }
}

impl fmt::Debug for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Paint(..)")
    }
}

/// One [`Paint`] per semantic role of the line.
#[derive(Clone, Debug)]
pub struct Palette {
    /// The `42%` text.
    pub percent: Paint,
    /// The completed segment of the bar.
    pub completed: Paint,
    /// The pending segment of the bar.
    pub pending: Paint,
    /// The `<current> of <total>` text.
    pub records: Paint,
    /// The remaining-time annotation.
    pub remaining: Paint,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            percent: Style::new().white().bold().into(),
            completed: Style::new().color256(163).bold().into(),
            pending: Style::new().color256(241).bold().into(),
            records: Style::new().white().into(),
            remaining: Style::new().color256(247).into(),
        }
    }
}

impl Palette {
    /// A palette that leaves every part unstyled.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            percent: Paint::plain(),
            completed: Paint::plain(),
            pending: Paint::plain(),
            records: Paint::plain(),
            remaining: Paint::plain(),
        }
    }

    /// The reduced palette of the mini bar.
    #[must_use]
    pub fn mini() -> Self {
        Self {
            completed: Style::new().cyan().into(),
            pending: Style::new().dim().into(),
            ..Self::plain()
        }
    }
}

/// Fully resolved bar configuration.
#[derive(Clone, Debug)]
pub struct Options {
    /// Number of records that make up 100%.
    pub total: u64,
    /// Bar width in characters.
    pub width: usize,
    /// Count display format.
    pub format: Format,
    /// Maximum redraws per second.
    pub fps: u32,
    /// Overwrite the current terminal line instead of appending lines.
    pub inplace: bool,
    /// Glyph repeated for the completed segment.
    pub completed: CompactString,
    /// Glyph repeated for the pending segment.
    pub pending: CompactString,
    /// Also set the terminal window title on every redraw.
    pub term_title: bool,
    /// Styles applied to each part of the line.
    pub palette: Palette,
    /// Period of the throughput sampler.
    pub sample_interval: Duration,
    /// Whether timers run on background threads or are driven by the caller.
    pub tick_mode: TickMode,
}

impl Options {
    /// Full-bar defaults for the given total.
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            total,
            width: DEFAULT_WIDTH,
            format: Format::Number,
            fps: DEFAULT_FPS,
            inplace: true,
            completed: CompactString::from("█"),
            pending: CompactString::from("░"),
            term_title: true,
            palette: Palette::default(),
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            tick_mode: TickMode::Background,
        }
    }

    /// Mini-bar defaults for the given total.
    #[must_use]
    pub fn mini(total: u64) -> Self {
        Self {
            width: 30,
            completed: CompactString::from("#"),
            pending: CompactString::from("-"),
            term_title: false,
            palette: Palette::mini(),
            sample_interval: MINI_SAMPLE_INTERVAL,
            ..Self::new(total)
        }
    }

    /// Checks every constraint, failing on the first violation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] naming the offending field.
    pub fn validate(&self) -> Result<(), Error> {
        if self.width == 0 {
            return Err(Error::invalid("width", self.width, "should be integer > 0"));
        }
        if self.total <= 1 {
            return Err(Error::invalid("total", self.total, "should be integer > 1"));
        }
        if self.fps == 0 {
            return Err(Error::invalid("fps", self.fps, "should be integer >= 1"));
        }
        if self.completed.is_empty() {
            return Err(Error::invalid("completed", "\"\"", "should be a non-empty glyph"));
        }
        if self.pending.is_empty() {
            return Err(Error::invalid("pending", "\"\"", "should be a non-empty glyph"));
        }
        if self.sample_interval.is_zero() {
            return Err(Error::invalid(
                "sample_interval",
                "0ms",
                "should be a non-zero duration",
            ));
        }
        Ok(())
    }

    /// Interval between two redraw ticks.
    pub(crate) fn redraw_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Error, Format, Options, Paint, TickMode};

    fn rejected_field(options: &Options) -> &'static str {
        match options.validate() {
            Err(Error::InvalidArgument { name, .. }) => name,
            other => panic!("expected an invalid argument, got {other:?}"),
        }
    }

    /// Defaults
    /// A fresh configuration is valid and carries the full-bar defaults.
    #[test]
    fn test_defaults_are_valid() {
        let options = Options::new(250);

        assert!(options.validate().is_ok());
        assert_eq!(options.width, 60);
        assert_eq!(options.fps, 25);
        assert_eq!(options.format, Format::Number);
        assert_eq!(options.tick_mode, TickMode::Background);
        assert!(options.inplace);
        assert!(options.term_title);
        assert_eq!(options.redraw_interval(), Duration::from_millis(40));
    }

    /// Mini Defaults
    /// The mini preset samples twice as often and skips the title.
    #[test]
    fn test_mini_defaults() {
        let options = Options::mini(10);

        assert!(options.validate().is_ok());
        assert_eq!(options.sample_interval, Duration::from_millis(500));
        assert_eq!(options.completed, "#");
        assert!(!options.term_title);
    }

    /// Rejections
    /// Each out-of-range field is named in the error.
    #[test]
    fn test_rejects_invalid_fields() {
        assert_eq!(rejected_field(&Options::new(1)), "total");
        assert_eq!(rejected_field(&Options::new(0)), "total");

        let mut options = Options::new(10);
        options.width = 0;
        assert_eq!(rejected_field(&options), "width");

        let mut options = Options::new(10);
        options.fps = 0;
        assert_eq!(rejected_field(&options), "fps");

        let mut options = Options::new(10);
        options.pending = "".into();
        assert_eq!(rejected_field(&options), "pending");

        let mut options = Options::new(10);
        options.sample_interval = Duration::ZERO;
        assert_eq!(rejected_field(&options), "sample_interval");
    }

    /// Validation Order
    /// Width is checked before total, so it is reported first.
    #[test]
    fn test_validation_order() {
        let mut options = Options::new(1);
        options.width = 0;

        let err = options.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "argument `width` (is 0) should be integer > 0"
        );
    }

    /// Paint
    /// Custom transforms and the identity transform apply as expected.
    #[test]
    fn test_paint_transforms() {
        let shout = Paint::new(|s| s.to_uppercase());

        assert_eq!(shout.apply("left"), "LEFT");
        assert_eq!(Paint::plain().apply("left"), "left");
    }
}
