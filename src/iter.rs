//! Iterator adapters for automatic progress reporting.
//!
//! This module provides the [`ProgressIteratorExt`] trait, which adds helper
//! methods to any Rust [`Iterator`]. Each yielded item reports its 1-based
//! position to the bar, so a loop gets a progress bar with a single method call.
//!
//! # Totals
//!
//! [`progress`](ProgressIteratorExt::progress) takes the total from
//! [`Iterator::size_hint`] and therefore needs an exact size. Iterators with
//! unknown length can use [`progress_with`](ProgressIteratorExt::progress_with)
//! and a bar built for the expected total.
//!
//! # Example
//!
//! ```no_run
//! use etabar::ProgressIteratorExt as _;
//!
//! for row in (0..250).progress()? {
//!     // ...
//! }
//! # Ok::<(), etabar::Error>(())
//! ```

use tracing::warn;

use crate::{error::Error, progress::ProgressBar};

/// An iterator adapter that reports progress for every yielded item.
pub struct ProgressIter<I> {
    iter: I,
    bar: ProgressBar,
    position: u64,
    failed: bool,
}

impl<I> ProgressIter<I> {
    /// Creates a new `ProgressIter`.
    ///
    /// Note: This is usually constructed via [`ProgressIteratorExt`] methods.
    pub const fn new(iter: I, bar: ProgressBar) -> Self {
        Self {
            iter,
            bar,
            position: 0,
            failed: false,
        }
    }

    /// The bar driven by this iterator.
    pub const fn bar(&self) -> &ProgressBar {
        &self.bar
    }

    /// Returns the bar, dropping the underlying iterator.
    pub fn into_bar(self) -> ProgressBar {
        self.bar
    }
}

impl<I: Iterator> Iterator for ProgressIter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.iter.next()?;

        self.position += 1;
        if !self.failed {
            // Items past the total keep the bar at its total
            let current = self.position.min(self.bar.options().total);
            if let Err(err) = self.bar.report(current) {
                // Iteration goes on; the bar just stops updating
                warn!(position = self.position, %err, "progress reporting stopped");
                self.failed = true;
            }
        }

        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Extension trait to easily attach a progress bar to any Iterator.
pub trait ProgressIteratorExt: Iterator + Sized {
    /// Wraps the iterator in a new full-featured bar.
    ///
    /// # Errors
    ///
    /// Fails when the iterator's length is not known exactly, or is too short
    /// for a bar (fewer than two items).
    fn progress(self) -> Result<ProgressIter<Self>, Error> {
        let total = exact_len(&self)?;
        Ok(ProgressIter::new(self, ProgressBar::new(total)?))
    }

    /// Wraps the iterator using an existing bar.
    fn progress_with(self, bar: ProgressBar) -> ProgressIter<Self> {
        ProgressIter::new(self, bar)
    }
}

impl<I: Iterator> ProgressIteratorExt for I {}

fn exact_len(iter: &impl Iterator) -> Result<u64, Error> {
    match iter.size_hint() {
        (lower, Some(upper)) if lower == upper => Ok(lower as u64),
        (lower, upper) => Err(Error::invalid(
            "total",
            format!("{lower}..{}", upper.map_or_else(String::new, |u| u.to_string())),
            "should be known; use progress_with for iterators without an exact length",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::ProgressIteratorExt as _;
    use crate::{
        Options,
        error::Error,
        progress::Phase,
        testing::{FailingSink, manual_bar, manual_bar_into},
    };

    /// Iterator Integration
    /// Every item is reported and exhaustion completes the bar.
    #[test]
    fn test_iterator_adapter() {
        let (bar, out, _clock) = manual_bar(Options::new(5));
        let data = [1, 2, 3, 4, 5];

        let mut iter = data.iter().progress_with(bar);
        let sum: i32 = iter.by_ref().sum();

        assert_eq!(sum, 15);
        let bar = iter.into_bar();
        assert_eq!(bar.current(), Some(5));
        assert_eq!(bar.phase(), Phase::Complete);
        assert!(out.contents().contains("5 of 5"));
    }

    /// Unknown Length
    /// Iterators without an exact size cannot infer a total.
    #[test]
    fn test_unknown_length_is_rejected() {
        let filtered = (0..10).filter(|n| n % 2 == 0);

        assert!(matches!(
            filtered.progress(),
            Err(Error::InvalidArgument { name: "total", .. })
        ));
    }

    /// Overlong Iterator
    /// Items beyond the total are still yielded without a reporting failure.
    #[test]
    fn test_items_beyond_total_are_yielded() {
        let (bar, _out, _clock) = manual_bar(Options::new(3));

        let mut iter = (0..5).progress_with(bar);
        let count = iter.by_ref().count();

        assert_eq!(count, 5);
        assert!(!iter.failed);
        assert_eq!(iter.bar().current(), Some(3));
        assert_eq!(iter.bar().phase(), Phase::Complete);
    }

    /// Broken Terminal
    /// A failed report stops reporting but not iteration.
    #[test]
    fn test_report_failure_keeps_iterating() {
        let (bar, _clock) = manual_bar_into(Options::new(3), FailingSink::always());

        let mut iter = (0..3).progress_with(bar);
        let items: Vec<i32> = iter.by_ref().collect();

        assert_eq!(items, vec![0, 1, 2]);
        assert!(iter.failed);
        assert_eq!(iter.bar().current(), Some(1));
    }
}
