//! Line rendering.
//!
//! A [`Frame`] captures everything one redraw shows. It is turned into text
//! twice, independently: [`Frame::styled`] applies the palette for the
//! terminal line, [`Frame::title`] produces plain text for the window title.
//! [`LineWidth`] then pads styled lines so that a shorter frame fully covers
//! the previous, wider one.

use compact_str::{CompactString, ToCompactString as _};
use indicatif::DecimalBytes;

use crate::options::{Format, Options};

/// Completion percentage, `round(current / total * 100)` clamped to 100.
#[must_use]
pub fn percent(current: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let (current, total) = (u128::from(current), u128::from(total));
    let rounded = (current * 200 + total) / (total * 2);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

/// Renders a record count in the configured format.
#[must_use]
pub fn count_label(value: u64, format: Format) -> CompactString {
    match format {
        Format::Number => value.to_compact_string(),
        Format::Bytes => DecimalBytes(value).to_compact_string(),
    }
}

/// The data shown by one redraw.
#[derive(Debug)]
pub(crate) struct Frame<'a> {
    pub(crate) percent: u8,
    pub(crate) completed_cells: usize,
    pub(crate) pending_cells: usize,
    pub(crate) current: CompactString,
    pub(crate) total: CompactString,
    pub(crate) remaining: &'a str,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(options: &Options, current: u64, remaining: &'a str) -> Self {
        let percent = percent(current, options.total);
        let completed_cells = options.width * usize::from(percent) / 100;

        Self {
            percent,
            completed_cells,
            pending_cells: options.width - completed_cells,
            current: count_label(current, options.format),
            total: count_label(options.total, options.format),
            remaining,
        }
    }

    /// Keeps the bar's left edge in place as the percentage gains digits.
    const fn alignment(&self) -> &'static str {
        match self.percent {
            0..=9 => "  ",
            10..=99 => " ",
            _ => "",
        }
    }

    /// The terminal line, styled with the options' palette.
    pub(crate) fn styled(&self, options: &Options) -> String {
        let palette = &options.palette;

        let completed = palette
            .completed
            .apply(&options.completed.repeat(self.completed_cells));
        let pending = if self.pending_cells > 0 {
            palette
                .pending
                .apply(&options.pending.repeat(self.pending_cells))
        } else {
            String::new()
        };

        format!(
            "{}{} {completed}{pending} {} {}",
            palette.percent.apply(&format!("{}%", self.percent)),
            self.alignment(),
            palette
                .records
                .apply(&format!("{} of {}", self.current, self.total)),
            palette.remaining.apply(self.remaining),
        )
    }

    /// Plain-text summary for the terminal title.
    pub(crate) fn title(&self) -> String {
        let title = format!(
            "{}% - {} of {} {}",
            self.percent, self.current, self.total, self.remaining
        );
        title.trim_end().to_owned()
    }
}

/// Tracks the widest line emitted so far and pads narrower ones.
#[derive(Debug, Default)]
pub(crate) struct LineWidth {
    widest: usize,
}

impl LineWidth {
    /// Pads `line` with spaces up to the widest visible width seen so far.
    ///
    /// ANSI escapes do not count towards the width.
    pub(crate) fn pad(&mut self, mut line: String) -> String {
        let width = console::measure_text_width(&line);
        if width < self.widest {
            line.push_str(&" ".repeat(self.widest - width));
        }
        self.widest = self.widest.max(width);
        line
    }

    pub(crate) const fn widest(&self) -> usize {
        self.widest
    }
}

/// Wraps `title` in the OSC 2 "set window title" sequence.
pub(crate) fn title_sequence(title: &str) -> String {
    format!("\x1b]2;{title}\x1b\\")
}
