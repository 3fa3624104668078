//! Helpers shared by the unit tests.

use std::{io, sync::Arc};

use parking_lot::Mutex;

use crate::{
    builder::ProgressBuilder,
    clock::ManualClock,
    options::{Options, Palette, TickMode},
    progress::ProgressBar,
};

/// An in-memory sink whose clones all see the same bytes.
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// Rendered lines, with title sequences removed.
    pub(crate) fn frames(&self) -> Vec<String> {
        let mut text = self.contents();
        while let Some(start) = text.find("\x1b]2;") {
            let end = text[start..]
                .find("\x1b\\")
                .map_or(text.len(), |offset| start + offset + 2);
            text.replace_range(start..end, "");
        }

        text.split(['\r', '\n'])
            .filter(|frame| !frame.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A sink that rejects chosen writes and passes the rest to a [`SharedBuffer`].
pub(crate) struct FailingSink {
    inner: SharedBuffer,
    writes: usize,
    /// 1-based index of the write to reject; `None` rejects every write.
    fail_on: Option<usize>,
}

impl FailingSink {
    pub(crate) fn always() -> Self {
        Self {
            inner: SharedBuffer::default(),
            writes: 0,
            fail_on: None,
        }
    }

    pub(crate) fn on_write(n: usize, inner: SharedBuffer) -> Self {
        Self {
            inner,
            writes: 0,
            fail_on: Some(n),
        }
    }
}

impl io::Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes += 1;
        if self.fail_on.is_none_or(|n| n == self.writes) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal closed"));
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A manually driven, unstyled, title-less bar on a [`ManualClock`].
pub(crate) fn manual_bar(options: Options) -> (ProgressBar, SharedBuffer, Arc<ManualClock>) {
    let out = SharedBuffer::default();
    let (bar, clock) = manual_bar_into(options, out.clone());
    (bar, out, clock)
}

/// Like [`manual_bar`], writing to `out`.
pub(crate) fn manual_bar_into(
    options: Options,
    out: impl io::Write + Send + 'static,
) -> (ProgressBar, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());

    let bar = ProgressBuilder::from_options(options)
        .with_palette(Palette::plain())
        .with_term_title(false)
        .with_tick_mode(TickMode::Manual)
        .with_writer(out)
        .with_clock(clock.clone())
        .build()
        .unwrap();

    (bar, clock)
}
