//! I/O wrappers for tracking data transfer.
//!
//! [`ProgressReader`] and [`ProgressWriter`] wrap any [`Read`] or [`Write`]
//! and report the cumulative number of bytes moved to a [`ProgressBar`],
//! typically one built with [`Format::Bytes`](crate::Format::Bytes) and the
//! expected size as its total.
//!
//! Counts past the total are clamped to it, so a stream slightly longer than
//! announced completes the bar instead of failing the transfer. A reporting
//! error (for example a broken terminal) is logged once and stops the bar from
//! updating; the bytes themselves still pass through.

use std::io::{self, Read, Write};

use tracing::warn;

use crate::progress::ProgressBar;

/// Reports the running byte count, giving up after the first failure.
struct Reporter {
    bar: ProgressBar,
    transferred: u64,
    failed: bool,
}

impl Reporter {
    const fn new(bar: ProgressBar) -> Self {
        Self {
            bar,
            transferred: 0,
            failed: false,
        }
    }

    fn add(&mut self, n: usize) {
        self.transferred += n as u64;
        if self.failed || self.transferred == 0 {
            return;
        }
        let current = self.transferred.min(self.bar.options().total);
        if let Err(err) = self.bar.report(current) {
            warn!(transferred = self.transferred, %err, "progress reporting stopped");
            self.failed = true;
        }
    }
}

/// A wrapper around [`Read`] that reports bytes read to a [`ProgressBar`].
pub struct ProgressReader<R> {
    inner: R,
    reporter: Reporter,
}

impl<R> ProgressReader<R> {
    /// Creates a new `ProgressReader` wrapping `inner`.
    pub const fn new(inner: R, bar: ProgressBar) -> Self {
        Self {
            inner,
            reporter: Reporter::new(bar),
        }
    }

    /// Bytes read so far.
    pub const fn transferred(&self) -> u64 {
        self.reporter.transferred
    }

    /// Returns the wrapped reader and the bar.
    pub fn into_parts(self) -> (R, ProgressBar) {
        (self.inner, self.reporter.bar)
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.reporter.add(n);
        Ok(n)
    }
}

/// A wrapper around [`Write`] that reports bytes written to a [`ProgressBar`].
pub struct ProgressWriter<W> {
    inner: W,
    reporter: Reporter,
}

impl<W> ProgressWriter<W> {
    /// Creates a new `ProgressWriter` wrapping `inner`.
    pub const fn new(inner: W, bar: ProgressBar) -> Self {
        Self {
            inner,
            reporter: Reporter::new(bar),
        }
    }

    /// Bytes written so far.
    pub const fn transferred(&self) -> u64 {
        self.reporter.transferred
    }

    /// Returns the wrapped writer and the bar.
    pub fn into_parts(self) -> (W, ProgressBar) {
        (self.inner, self.reporter.bar)
    }
}

impl<W: Write> Write for ProgressWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.reporter.add(n);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read as _, Write as _};

    use super::{ProgressReader, ProgressWriter};
    use crate::{
        Options,
        options::Format,
        progress::Phase,
        testing::{FailingSink, manual_bar, manual_bar_into},
    };

    /// Reader Tracking
    /// Bytes read are reported as the current count.
    #[test]
    fn test_io_reader() {
        let (bar, _out, _clock) = manual_bar(Options::new(100));
        let data = vec![0u8; 100];
        let mut reader = ProgressReader::new(Cursor::new(&data), bar);

        let mut buf = [0u8; 10];
        reader.read_exact(&mut buf).unwrap();

        assert_eq!(reader.transferred(), 10);
        let (_, bar) = reader.into_parts();
        assert_eq!(bar.current(), Some(10));
    }

    /// Writer Tracking
    /// Writing the whole payload completes the bar with byte counts.
    #[test]
    fn test_io_writer() {
        let options = Options {
            format: Format::Bytes,
            ..Options::new(5)
        };
        let (bar, out, _clock) = manual_bar(options);
        let mut writer = ProgressWriter::new(Vec::new(), bar);

        writer.write_all(&[1, 2, 3, 4, 5]).unwrap();

        let (inner, bar) = writer.into_parts();
        assert_eq!(inner, vec![1, 2, 3, 4, 5]);
        assert_eq!(bar.phase(), Phase::Complete);
        assert!(out.contents().contains("5 B of 5 B"), "{}", out.contents());
    }

    /// Overlong Stream
    /// Bytes beyond the total clamp to it instead of failing.
    #[test]
    fn test_io_overlong_stream() {
        let (bar, _out, _clock) = manual_bar(Options::new(4));
        let mut writer = ProgressWriter::new(Vec::new(), bar);

        writer.write_all(b"abcdef").unwrap();

        assert_eq!(writer.transferred(), 6);
        assert_eq!(writer.into_parts().1.current(), Some(4));
    }

    /// Broken Terminal
    /// A bar that cannot draw never costs the stream its bytes.
    #[test]
    fn test_io_survives_broken_terminal() {
        let (bar, _clock) = manual_bar_into(Options::new(10), FailingSink::always());
        let mut reader = ProgressReader::new(Cursor::new(vec![7u8; 10]), bar);

        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 4);
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();

        assert_eq!(rest.len(), 6);
        assert_eq!(reader.transferred(), 10);
        let (_, bar) = reader.into_parts();
        assert_eq!(bar.current(), Some(4));

        let (bar, _clock) = manual_bar_into(Options::new(10), FailingSink::always());
        let mut writer = ProgressWriter::new(Vec::new(), bar);
        writer.write_all(&[1u8; 10]).unwrap();
        assert_eq!(writer.into_parts().0.len(), 10);
    }
}
