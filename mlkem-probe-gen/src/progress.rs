//! Status reporting for long generation runs.
//!
//! The generation loop is the only writer of a [`Status`] counter. A
//! [`Reporter`] thread samples it on a fixed interval and moves an
//! [`indicatif::ProgressBar`] on stderr until it is cancelled.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str =
    "[{elapsed_precise}] [{bar:40.cyan/blue}] {percent:>3}% {pos}/{len} {msg} ({per_sec}, eta {eta})";

/// Progress shared between the generation loop and a reporter.
#[derive(Debug)]
pub struct Status {
    done: AtomicU64,
    total: u64,
    cancelled: AtomicBool,
}

impl Status {
    /// Track a job of `total` items.
    pub fn new(total: u64) -> Self {
        Self {
            done: AtomicU64::new(0),
            total,
            cancelled: AtomicBool::new(false),
        }
    }

    /// Record that `done` items are complete.
    pub fn set_done(&self, done: u64) {
        self.done.store(done, Ordering::Relaxed);
    }

    /// Items completed so far.
    pub fn done(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }

    /// Total number of items.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Ask observers to stop.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// True once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// A stderr progress bar for `total` items labelled `unit`.
pub fn progress_bar(total: u64, unit: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    match ProgressStyle::default_bar().template(TEMPLATE) {
        Ok(style) => bar.set_style(style.progress_chars("#>-")),
        Err(e) => tracing::debug!(error = %e, "falling back to the default progress style"),
    }
    bar.set_message(unit);
    bar
}

/// Background thread moving a progress bar to match a [`Status`].
pub struct Reporter {
    status: Arc<Status>,
    handle: Option<JoinHandle<()>>,
}

impl Reporter {
    /// Start reporting on `status` with a stderr bar.
    pub fn spawn(status: Arc<Status>, interval: Duration, unit: &'static str) -> io::Result<Self> {
        let bar = progress_bar(status.total(), unit);
        Self::with_bar(status, interval, bar)
    }

    /// Start reporting on `status` through `bar`.
    pub fn with_bar(status: Arc<Status>, interval: Duration, bar: ProgressBar) -> io::Result<Self> {
        let observed = Arc::clone(&status);
        let handle = thread::Builder::new()
            .name("progress".into())
            .spawn(move || report_loop(&observed, interval, &bar))?;
        Ok(Self {
            status,
            handle: Some(handle),
        })
    }

    /// Cancel the reporter and wait for it to draw its last state.
    pub fn finish(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.status.cancel();
            handle.thread().unpark();
            if handle.join().is_err() {
                tracing::warn!("progress reporter panicked");
            }
        }
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        self.stop();
    }
}

fn report_loop(status: &Status, interval: Duration, bar: &ProgressBar) {
    loop {
        let deadline = Instant::now() + interval;
        while !status.is_cancelled() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::park_timeout(deadline - now);
        }

        bar.set_position(status.done());

        if status.is_cancelled() {
            if status.done() >= status.total() {
                bar.finish();
            } else {
                bar.abandon();
            }
            break;
        }
    }
}
