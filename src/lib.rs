//! # `etabar`
//!
//! A single-line, in-place terminal progress bar for work with a known number
//! of records, with a time-remaining estimate derived from measured throughput.
//!
//! `etabar` is designed to be:
//!
//! * **Cheap to call:** [`ProgressBar::report`] can be called on every
//!   iteration of a tight loop. It only updates atomics unless a redraw is due,
//!   and redraws are capped at a configurable rate.
//! * **Steady:** throughput is sampled on a fixed interval and averaged over a
//!   bounded history, so the estimate does not jump with every burst.
//! * **Clean on screen:** each frame is padded to the widest frame so far, so
//!   no characters of a previous, longer line are left behind.
//!
//! ```text
//! 42%  █████████████████████████░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░ 105 of 250 (14s left)
//! ```
//!
//! ## Modules
//!
//! * [`builder`]: Fluent interface for configuring and constructing bars.
//! * [`clock`]: Monotonic and wall-clock time sources, including a manual clock.
//! * [`eta`]: Calendar-aware duration labels.
//! * [`io`]: Wrappers for [`std::io::Read`] and [`std::io::Write`] that report bytes transferred.
//! * [`iter`]: Extension traits for reporting progress from Iterators.
//! * [`options`]: The resolved configuration and its validation.
//! * [`progress`]: The [`ProgressBar`] state machine and snapshots.
//! * [`render`]: Percentage and count formatting.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod builder;
pub mod clock;
mod error;
pub mod eta;
pub mod io;
pub mod iter;
pub mod options;
pub mod progress;
pub mod render;
mod sampler;
mod ticker;

#[cfg(test)]
mod testing;

pub use builder::ProgressBuilder;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::Error;
pub use iter::{ProgressIter, ProgressIteratorExt};
pub use options::{Format, Options, Paint, Palette, TickMode};
pub use progress::{Phase, ProgressBar, ProgressSnapshot};
pub use sampler::HISTORY_CAPACITY;
