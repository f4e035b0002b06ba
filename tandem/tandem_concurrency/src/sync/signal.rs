//! One-shot completion signal.
//!
//! A single writer settles the signal exactly once, either to `Completed` or,
//! if it failed before finishing, to `Abandoned`. Any number of readers can
//! wait for it by spinning or by parking on a condition variable. Settling is
//! a release store and observing it is an acquire load, so everything the
//! writer did before settling is visible to a reader that saw it settle.

use log::{debug, trace, warn};
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

const PENDING: u8 = 0;
const COMPLETED: u8 = 1;
const ABANDONED: u8 = 2;

/// Error when waiting on a completion signal
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The signalling task ended without completing
    #[error("completion signal was abandoned")]
    Abandoned,

    /// The signal was not settled within the specified timeout
    #[error("completion signal not observed within {0:?}")]
    Timeout(Duration),
}

/// Observable state of a [`CompletionSignal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    /// Not yet settled
    Pending,

    /// Settled by a successful writer
    Completed,

    /// Settled by a writer that failed before completing
    Abandoned,
}

impl SignalState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            PENDING => Self::Pending,
            COMPLETED => Self::Completed,
            _ => Self::Abandoned,
        }
    }
}

/// How a reader waits for the signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitStrategy {
    /// Poll the signal, yielding the processor between polls
    Spin,

    /// Park on a condition variable until the signal settles
    #[default]
    Block,
}

impl WaitStrategy {
    /// Get the name of this strategy
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spin => "spin",
            Self::Block => "block",
        }
    }
}

impl fmt::Display for WaitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaitStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spin" => Ok(Self::Spin),
            "block" => Ok(Self::Block),
            other => Err(format!("unknown wait strategy: {other}")),
        }
    }
}

/// A single-writer, multi-reader one-shot signal
#[derive(Debug)]
pub struct CompletionSignal {
    state: AtomicU8,
    gate: Mutex<()>,
    settled: Condvar,
}

impl CompletionSignal {
    /// Create a new pending signal
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(PENDING),
            gate: Mutex::new(()),
            settled: Condvar::new(),
        }
    }

    /// Get the current state of the signal
    pub fn state(&self) -> SignalState {
        SignalState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Mark the signal completed.
    ///
    /// Returns true if this call settled the signal, false if it was already
    /// settled.
    pub fn complete(&self) -> bool {
        self.settle(COMPLETED)
    }

    /// Mark the signal abandoned, releasing every waiter with an error.
    ///
    /// Returns true if this call settled the signal, false if it was already
    /// settled.
    pub fn abandon(&self) -> bool {
        self.settle(ABANDONED)
    }

    /// Wait for the signal using `strategy`, optionally bounded by `timeout`
    pub fn wait(
        &self,
        strategy: WaitStrategy,
        timeout: Option<Duration>,
    ) -> Result<(), SignalError> {
        match strategy {
            WaitStrategy::Spin => self.spin_wait(timeout),
            WaitStrategy::Block => self.block_wait(timeout),
        }
    }

    /// Poll the signal until it settles, yielding between polls
    pub fn spin_wait(&self, timeout: Option<Duration>) -> Result<(), SignalError> {
        let start = Instant::now();
        let mut spins: u64 = 0;

        loop {
            match self.state() {
                SignalState::Completed => {
                    debug!("Signal observed after {} spins", spins);
                    return Ok(());
                }
                SignalState::Abandoned => return Err(SignalError::Abandoned),
                SignalState::Pending => {}
            }

            if let Some(timeout) = timeout {
                if start.elapsed() >= timeout {
                    warn!("Spin wait timed out after {} spins", spins);
                    return Err(SignalError::Timeout(timeout));
                }
            }

            spins += 1;
            thread::yield_now();
        }
    }

    /// Park on the condition variable until the signal settles
    pub fn block_wait(&self, timeout: Option<Duration>) -> Result<(), SignalError> {
        let bound = timeout.map(|timeout| (timeout, Instant::now() + timeout));
        let mut gate = self.gate.lock();

        loop {
            match self.state() {
                SignalState::Completed => return Ok(()),
                SignalState::Abandoned => return Err(SignalError::Abandoned),
                SignalState::Pending => {}
            }

            match bound {
                Some((timeout, deadline)) => {
                    if Instant::now() >= deadline {
                        warn!("Blocking wait timed out after {:?}", timeout);
                        return Err(SignalError::Timeout(timeout));
                    }
                    self.settled.wait_until(&mut gate, deadline);
                }
                None => self.settled.wait(&mut gate),
            }

            trace!("Signal waiter woke");
        }
    }

    /// Get a guard that abandons the signal unless explicitly completed
    pub fn arm(&self) -> CompletionGuard<'_> {
        CompletionGuard {
            signal: self,
            armed: true,
        }
    }

    fn settle(&self, to: u8) -> bool {
        let settled = self
            .state
            .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        if settled {
            // Taking the gate orders this notify after any waiter's state check
            let _gate = self.gate.lock();
            self.settled.notify_all();
            debug!("Signal settled: {:?}", SignalState::from_raw(to));
        }

        settled
    }
}

/// Settles a [`CompletionSignal`] when its owner finishes or fails
///
/// Dropping the guard without calling [`CompletionGuard::complete`], including
/// while unwinding from a panic, abandons the signal so waiters are released.
#[must_use = "dropping the guard abandons the signal"]
pub struct CompletionGuard<'a> {
    signal: &'a CompletionSignal,
    armed: bool,
}

impl CompletionGuard<'_> {
    /// Complete the signal and disarm the guard
    pub fn complete(mut self) -> bool {
        self.armed = false;
        self.signal.complete()
    }
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        if self.armed && self.signal.abandon() {
            warn!("Signal abandoned before completion");
        }
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}
