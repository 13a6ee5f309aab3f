//! Continuous watch scheduling.
//!
//! Watch mode runs one organizing pass immediately, then repeats on a
//! fixed interval until cancelled. Iterations never overlap: the interval
//! is measured from the completion of one pass to the start of the next.
//! Cancellation is cooperative and takes effect during the idle wait, so
//! it never interrupts a move in progress, yet it wakes the waiter
//! immediately instead of letting the interval run out.

use crate::engine::{EngineError, Organizer, Report};
use std::path::Path;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// Cooperative cancellation handle for the watch loop.
///
/// Clone is cheap and shares state; any clone can cancel. Cancelling
/// notifies a waiter blocked in [`CancelToken::wait_timeout`] right away.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    /// Creates a new token (not cancelled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation and wakes any current waiter.
    pub fn cancel(&self) {
        let (flag, condvar) = &*self.inner;
        let mut cancelled = flag.lock().unwrap_or_else(|e| e.into_inner());
        *cancelled = true;
        condvar.notify_all();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        let (flag, _) = &*self.inner;
        *flag.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Blocks for up to `timeout`, returning early when cancelled.
    ///
    /// Returns true if cancellation was requested before the timeout
    /// elapsed, false if the full timeout passed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, condvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut cancelled = flag.lock().unwrap_or_else(|e| e.into_inner());

        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, wait) = condvar
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(|e| e.into_inner());
            cancelled = guard;
            if wait.timed_out() {
                return *cancelled;
            }
        }
        true
    }
}

/// Aggregate outcome of a watch session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WatchStats {
    /// Passes started (including failed ones).
    pub passes: usize,
    /// Total files moved across all passes.
    pub moved: usize,
    /// Total files routed to duplicates across all passes.
    pub duplicates: usize,
    /// Total files skipped across all passes.
    pub skipped: usize,
    /// Passes that ended in a pass-level error.
    pub failures: usize,
}

/// Runs the organizer repeatedly until the token is cancelled.
///
/// The first pass starts immediately. After each pass completes,
/// `on_pass` receives its outcome (so a caller can print reports or log
/// failures), then the loop idles for `interval` or until cancellation,
/// whichever comes first. A failed pass is counted and the schedule
/// continues.
pub fn watch<F>(
    organizer: &Organizer,
    source: &Path,
    destination: &Path,
    interval: Duration,
    token: &CancelToken,
    mut on_pass: F,
) -> WatchStats
where
    F: FnMut(&Result<Report, EngineError>),
{
    let mut stats = WatchStats::default();

    loop {
        if token.is_cancelled() {
            break;
        }

        let outcome = organizer.organize(source, destination);
        stats.passes += 1;
        match &outcome {
            Ok(report) => {
                stats.moved += report.moved;
                stats.duplicates += report.duplicates;
                stats.skipped += report.skipped;
            }
            Err(_) => stats.failures += 1,
        }
        on_pass(&outcome);

        if token.wait_timeout(interval) {
            break;
        }
    }

    stats
}
