//! Human-readable remaining and elapsed time labels.
//!
//! Durations are rendered as the calendar difference between two wall-clock
//! timestamps, so "one month" means the distance between the same day of two
//! consecutive months rather than a fixed number of seconds. Zero units are
//! omitted and hours, minutes and seconds are abbreviated (`1 day 2h 5s`).

use std::{fmt, time::Duration};

use chrono::{DateTime, Datelike as _, FixedOffset, NaiveDate, TimeDelta, Timelike as _};
use compact_str::{CompactString, format_compact};

/// Calendar difference between two timestamps, split into units.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PreciseDiff {
    /// Whole years.
    pub years: i64,
    /// Whole months after the years.
    pub months: i64,
    /// Whole days after the months.
    pub days: i64,
    /// Whole hours after the days.
    pub hours: i64,
    /// Whole minutes after the hours.
    pub minutes: i64,
    /// Whole seconds after the minutes.
    pub seconds: i64,
}

impl PreciseDiff {
    /// Difference between `a` and `b`, in either order.
    ///
    /// Units are computed field by field (year, month, day, hour, minute,
    /// second) and borrowed from the next larger unit when negative. Sub-second
    /// parts of the timestamps are ignored.
    #[must_use]
    pub fn between(a: &DateTime<FixedOffset>, b: &DateTime<FixedOffset>) -> Self {
        let (from, to) = if a > b {
            (b.with_timezone(a.offset()), *a)
        } else {
            (*a, b.with_timezone(a.offset()))
        };

        let mut years = i64::from(to.year()) - i64::from(from.year());
        let mut months = i64::from(to.month0()) - i64::from(from.month0());
        let mut days = i64::from(to.day()) - i64::from(from.day());
        let mut hours = i64::from(to.hour()) - i64::from(from.hour());
        let mut minutes = i64::from(to.minute()) - i64::from(from.minute());
        let mut seconds = i64::from(to.second()) - i64::from(from.second());

        if seconds < 0 {
            seconds += 60;
            minutes -= 1;
        }
        if minutes < 0 {
            minutes += 60;
            hours -= 1;
        }
        if hours < 0 {
            hours += 24;
            days -= 1;
        }
        if days < 0 {
            let previous_month = days_in_previous_month(to.date_naive());
            let from_day = i64::from(from.day());
            // 31 Jan -> 2 Mar: the short month cannot hold the start day
            days = if previous_month < from_day {
                days + from_day
            } else {
                days + previous_month
            };
            months -= 1;
        }
        if months < 0 {
            months += 12;
            years -= 1;
        }

        Self {
            years,
            months,
            days,
            hours,
            minutes,
            seconds,
        }
    }

    /// Whether every unit is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.years == 0
            && self.months == 0
            && self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.seconds == 0
    }

    /// The abbreviated form used by the bar: `2 days 3h 4m 5s`.
    #[must_use]
    pub fn short(&self) -> String {
        let mut parts = Vec::with_capacity(6);
        push_word(&mut parts, self.years, "year");
        push_word(&mut parts, self.months, "month");
        push_word(&mut parts, self.days, "day");
        if self.hours != 0 {
            parts.push(format!("{}h", self.hours));
        }
        if self.minutes != 0 {
            parts.push(format!("{}m", self.minutes));
        }
        if self.seconds != 0 {
            parts.push(format!("{}s", self.seconds));
        }
        parts.join(" ")
    }
}

impl fmt::Display for PreciseDiff {
    /// The long form: `1 year 2 months 3 hours 1 second`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(6);
        push_word(&mut parts, self.years, "year");
        push_word(&mut parts, self.months, "month");
        push_word(&mut parts, self.days, "day");
        push_word(&mut parts, self.hours, "hour");
        push_word(&mut parts, self.minutes, "minute");
        push_word(&mut parts, self.seconds, "second");
        f.write_str(&parts.join(" "))
    }
}

fn push_word(parts: &mut Vec<String>, value: i64, unit: &str) {
    match value {
        0 => {}
        1 => parts.push(format!("1 {unit}")),
        n => parts.push(format!("{n} {unit}s")),
    }
}

fn days_in_previous_month(date: NaiveDate) -> i64 {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| i64::from(last.day()))
}

/// Renders `duration` as it would read on a calendar starting at `now`.
///
/// Returns an empty string when the duration rounds to no whole unit, or when
/// it cannot be represented as a calendar offset.
#[must_use]
pub fn humanize(duration: Duration, now: &DateTime<FixedOffset>) -> String {
    TimeDelta::from_std(duration)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .map(|end| PreciseDiff::between(now, &end).short())
        .unwrap_or_default()
}

/// The `(… left)` annotation for a projected remaining duration.
///
/// Missing or sub-second estimates produce an empty label.
#[must_use]
pub fn remaining_label(estimate: Option<Duration>, now: &DateTime<FixedOffset>) -> CompactString {
    let Some(estimate) = estimate else {
        return CompactString::default();
    };
    let words = humanize(estimate, now);
    if words.is_empty() {
        CompactString::default()
    } else {
        format_compact!("({words} left)")
    }
}

/// The `(total time: …)` annotation shown once the bar completes.
///
/// The elapsed span ends at `now`. Runs shorter than a second read `0s`.
#[must_use]
pub fn total_time_label(elapsed: Duration, now: &DateTime<FixedOffset>) -> CompactString {
    let words = TimeDelta::from_std(elapsed)
        .ok()
        .and_then(|delta| now.checked_sub_signed(delta))
        .map(|start| PreciseDiff::between(&start, now).short())
        .unwrap_or_default();

    if words.is_empty() {
        CompactString::from("(total time: 0s)")
    } else {
        format_compact!("(total time: {words})")
    }
}
