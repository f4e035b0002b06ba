//! Output lock that serializes whole-line writes.
//!
//! Every line is written and flushed while the lock is held, so two tasks
//! sharing one writer can never interleave mid-line. The lock also keeps
//! acquisition statistics for diagnostics.

use log::trace;
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Statistics about output lock usage
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LockStats {
    /// Number of successful lock acquisitions
    pub acquisition_count: usize,

    /// Number of lines written through the lock
    pub lines_written: usize,

    /// Total time spent waiting for the lock (microseconds)
    pub total_wait_time_us: u64,

    /// Total time the lock was held (microseconds)
    pub total_hold_time_us: u64,

    /// Maximum time spent waiting for the lock (microseconds)
    pub max_wait_time_us: u64,

    /// Maximum time the lock was held (microseconds)
    pub max_hold_time_us: u64,
}

#[derive(Debug, Default)]
struct Counters {
    acquisition_count: AtomicUsize,
    lines_written: AtomicUsize,
    total_wait_time_us: AtomicU64,
    total_hold_time_us: AtomicU64,
    max_wait_time_us: AtomicU64,
    max_hold_time_us: AtomicU64,
}

fn saturating_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

impl Counters {
    fn record_wait(&self, wait_time: Duration) {
        let wait_time_us = saturating_micros(wait_time);
        self.total_wait_time_us.fetch_add(wait_time_us, Ordering::Relaxed);
        self.max_wait_time_us.fetch_max(wait_time_us, Ordering::Relaxed);
        self.acquisition_count.fetch_add(1, Ordering::Relaxed);
    }

    fn record_hold(&self, hold_time: Duration) {
        let hold_time_us = saturating_micros(hold_time);
        self.total_hold_time_us.fetch_add(hold_time_us, Ordering::Relaxed);
        self.max_hold_time_us.fetch_max(hold_time_us, Ordering::Relaxed);
    }
}

/// A writer guarded by a mutex, written to one line at a time
pub struct OutputLock<W> {
    /// The guarded writer
    writer: Mutex<W>,

    /// Usage statistics
    counters: Counters,

    /// Name of this lock for diagnostics
    name: String,
}

/// Exclusive access to the writer of an [`OutputLock`]
///
/// Releasing the guard releases the lock and records how long it was held.
pub struct OutputGuard<'a, W> {
    guard: MutexGuard<'a, W>,
    acquired_at: Instant,
    counters: &'a Counters,
    name: &'a str,
}

impl<W> OutputLock<W> {
    /// Create a new output lock around `writer`
    pub fn new(writer: W) -> Self {
        Self::with_name(writer, "output")
    }

    /// Create a new output lock with a name for diagnostics
    pub fn with_name(writer: W, name: impl Into<String>) -> Self {
        Self {
            writer: Mutex::new(writer),
            counters: Counters::default(),
            name: name.into(),
        }
    }

    /// Lock the writer, blocking until it is available
    pub fn lock(&self) -> OutputGuard<'_, W> {
        let start = Instant::now();
        let guard = self.writer.lock();
        let wait_time = start.elapsed();
        self.counters.record_wait(wait_time);

        trace!(
            "Lock acquired: {} (wait time: {:.2}ms)",
            self.name,
            wait_time.as_secs_f64() * 1000.0
        );

        self.guard(guard)
    }

    /// Get the statistics for this lock
    pub fn stats(&self) -> LockStats {
        let c = &self.counters;
        LockStats {
            acquisition_count: c.acquisition_count.load(Ordering::Relaxed),
            lines_written: c.lines_written.load(Ordering::Relaxed),
            total_wait_time_us: c.total_wait_time_us.load(Ordering::Relaxed),
            total_hold_time_us: c.total_hold_time_us.load(Ordering::Relaxed),
            max_wait_time_us: c.max_wait_time_us.load(Ordering::Relaxed),
            max_hold_time_us: c.max_hold_time_us.load(Ordering::Relaxed),
        }
    }

    /// Consume the lock and return the writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn guard<'a>(&'a self, guard: MutexGuard<'a, W>) -> OutputGuard<'a, W> {
        OutputGuard {
            guard,
            acquired_at: Instant::now(),
            counters: &self.counters,
            name: &self.name,
        }
    }
}

impl<W: Write> OutputLock<W> {
    /// Write one line under the lock and flush it before releasing
    pub fn emit_line(&self, line: fmt::Arguments<'_>) -> io::Result<()> {
        self.lock().write_line(line)
    }
}

impl<W: Write> OutputGuard<'_, W> {
    /// Write `line` followed by a newline, then flush
    pub fn write_line(&mut self, line: fmt::Arguments<'_>) -> io::Result<()> {
        writeln!(self.guard, "{}", line)?;
        self.guard.flush()?;
        self.counters.lines_written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl<W> Drop for OutputGuard<'_, W> {
    fn drop(&mut self) {
        let hold_time = self.acquired_at.elapsed();
        self.counters.record_hold(hold_time);

        trace!(
            "Lock released: {} (held for: {:.2}ms)",
            self.name,
            hold_time.as_secs_f64() * 1000.0
        );
    }
}

impl<W> fmt::Debug for OutputLock<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputLock")
            .field("name", &self.name)
            .field("stats", &self.stats())
            .finish()
    }
}
