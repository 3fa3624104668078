//! Background timers.
//!
//! A [`Ticker`] owns one named thread that invokes a callback at a fixed
//! period. The thread sleeps on a [`Condvar`] so that stopping the ticker wakes
//! it immediately instead of waiting out the current period. Dropping the
//! ticker stops and joins the thread.

use std::{
    io,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::warn;
use web_time::Instant;

#[derive(Default)]
struct Signal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

/// A periodic callback running on its own thread.
pub(crate) struct Ticker {
    signal: Arc<Signal>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawns a thread calling `tick` every `period` until stopped.
    ///
    /// The first call happens one full period after spawning.
    pub(crate) fn spawn(
        name: &str,
        period: Duration,
        mut tick: impl FnMut() + Send + 'static,
    ) -> io::Result<Self> {
        let signal = Arc::new(Signal::default());
        let thread_signal = signal.clone();

        let handle = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || {
                let mut next = Instant::now() + period;
                let mut stopped = thread_signal.stopped.lock();

                while !*stopped {
                    let now = Instant::now();
                    if now < next {
                        thread_signal.wake.wait_for(&mut stopped, next - now);
                        continue;
                    }

                    // Run the callback without holding the stop lock
                    MutexGuard::unlocked(&mut stopped, &mut tick);

                    next += period;
                    let now = Instant::now();
                    if next < now {
                        // Fell behind; skip the missed ticks
                        next = now + period;
                    }
                }
            })?;

        Ok(Self {
            signal,
            handle: Some(handle),
        })
    }

    /// Stops the thread and waits for it to exit. Idempotent.
    pub(crate) fn stop(&mut self) {
        *self.signal.stopped.lock() = true;
        self.signal.wake.notify_all();

        if let Some(handle) = self.handle.take() {
            let name = handle.thread().name().unwrap_or("ticker").to_owned();
            if handle.join().is_err() {
                warn!(thread = %name, "ticker thread panicked");
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        thread,
        time::Duration,
    };

    use super::Ticker;

    /// Periodic Calls
    /// The callback runs repeatedly and stops once the ticker is dropped.
    #[test]
    fn test_ticks_until_dropped() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        let ticker = Ticker::spawn("test-ticker", Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();

        thread::sleep(Duration::from_millis(100));
        drop(ticker);

        let seen = count.load(Ordering::Relaxed);
        assert!(seen >= 2, "expected several ticks, saw {seen}");

        thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::Relaxed), seen, "no ticks after drop");
    }

    /// Prompt Stop
    /// Stopping does not wait for a long period to elapse.
    #[test]
    fn test_stop_is_prompt() {
        let mut ticker = Ticker::spawn("slow-ticker", Duration::from_secs(3600), || {}).unwrap();

        let started = std::time::Instant::now();
        ticker.stop();
        ticker.stop();

        assert!(started.elapsed() < Duration::from_secs(5));
    }

    /// Panicking Callback
    /// A tick that panics ends its thread; stopping still returns normally.
    #[test]
    fn test_stop_after_panicking_tick() {
        let mut ticker = Ticker::spawn("panicking-ticker", Duration::from_millis(1), || {
            panic!("tick failed");
        })
        .unwrap();

        thread::sleep(Duration::from_millis(50));
        ticker.stop();

        assert!(ticker.handle.is_none());
    }
}
