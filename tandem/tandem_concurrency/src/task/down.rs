//! Counter-down task.

use std::io::Write;
use std::ops::RangeInclusive;
use std::time::Duration;

use log::debug;

use super::{emit, TaskKind};
use crate::error::RunnerError;
use crate::runner::SharedState;
use crate::sync::WaitStrategy;

/// Lifecycle of a [`CountDownTask`]
///
/// `Waiting` is initial and `Done` is terminal. There is no transition back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountDownState {
    /// Waiting for the up-counter's completion signal
    Waiting,

    /// Writing descending values
    Emitting,

    /// Every value written
    Done,
}

impl CountDownState {
    /// The state that follows this one, if any
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Waiting => Some(Self::Emitting),
            Self::Emitting => Some(Self::Done),
            Self::Done => None,
        }
    }
}

/// Waits for the completion signal, then emits `range` in descending order
pub struct CountDownTask<'a, W> {
    shared: &'a SharedState<W>,
    range: RangeInclusive<u32>,
    strategy: WaitStrategy,
    timeout: Option<Duration>,
    state: CountDownState,
}

impl<'a, W: Write> CountDownTask<'a, W> {
    /// Create a task that waits with `strategy` and counts `range` downward
    pub fn new(
        shared: &'a SharedState<W>,
        range: RangeInclusive<u32>,
        strategy: WaitStrategy,
    ) -> Self {
        Self {
            shared,
            range,
            strategy,
            timeout: None,
            state: CountDownState::Waiting,
        }
    }

    /// Bound the wait for the completion signal
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> CountDownState {
        self.state
    }

    /// Run to completion, returning the number of lines written.
    ///
    /// If the signal is abandoned or the wait times out, the task stays in
    /// [`CountDownState::Waiting`] and writes nothing.
    pub fn run(&mut self) -> Result<usize, RunnerError> {
        debug!(
            "{} waiting for completion signal ({})",
            TaskKind::CountDown,
            self.strategy
        );
        self.shared.signal().wait(self.strategy, self.timeout)?;
        self.advance();

        let mut emitted = 0;
        for value in self.range.clone().rev() {
            emit(self.shared, TaskKind::CountDown, value)?;
            emitted += 1;
        }

        self.advance();
        Ok(emitted)
    }

    fn advance(&mut self) {
        if let Some(next) = self.state.next() {
            debug!("{}: {:?} -> {:?}", TaskKind::CountDown, self.state, next);
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SignalState;
    use std::thread;

    #[test]
    fn test_state_transitions() {
        assert_eq!(
            CountDownState::Waiting.next(),
            Some(CountDownState::Emitting)
        );
        assert_eq!(CountDownState::Emitting.next(), Some(CountDownState::Done));
        assert_eq!(CountDownState::Done.next(), None);
    }

    #[test]
    fn test_counts_down_after_signal() {
        let shared = SharedState::new(Vec::<u8>::new());
        shared.signal().complete();

        let mut task = CountDownTask::new(&shared, 0..=2, WaitStrategy::Spin);
        assert_eq!(task.state(), CountDownState::Waiting);

        assert_eq!(task.run().unwrap(), 3);
        assert_eq!(task.state(), CountDownState::Done);

        let output = String::from_utf8(shared.into_writer()).unwrap();
        assert_eq!(
            output,
            "Counting Down: 2\nCounting Down: 1\nCounting Down: 0\n"
        );
    }

    #[test]
    fn test_waits_for_signal() {
        let shared = SharedState::new(Vec::<u8>::new());

        thread::scope(|s| {
            let waiter = s.spawn(|| {
                let mut task = CountDownTask::new(&shared, 5..=6, WaitStrategy::Block);
                let emitted = task.run();
                (emitted.ok(), task.state())
            });

            thread::sleep(Duration::from_millis(20));
            assert_eq!(shared.output().stats().lines_written, 0);
            shared.signal().complete();

            assert_eq!(waiter.join().unwrap(), (Some(2), CountDownState::Done));
        });
    }

    #[test]
    fn test_abandoned_signal_stays_waiting() {
        let shared = SharedState::new(Vec::<u8>::new());
        shared.signal().abandon();

        let mut task = CountDownTask::new(&shared, 0..=20, WaitStrategy::Block);
        let err = task.run().unwrap_err();

        assert!(matches!(err, RunnerError::SignalAbandoned));
        assert_eq!(task.state(), CountDownState::Waiting);
        assert!(shared.into_writer().is_empty());
    }

    #[test]
    fn test_wait_timeout() {
        let shared = SharedState::new(Vec::<u8>::new());
        let timeout = Duration::from_millis(10);

        let mut task = CountDownTask::new(&shared, 0..=20, WaitStrategy::Spin)
            .with_timeout(Some(timeout));
        let err = task.run().unwrap_err();

        assert!(matches!(err, RunnerError::SignalTimeout(t) if t == timeout));
        assert_eq!(task.state(), CountDownState::Waiting);
        assert_eq!(shared.signal().state(), SignalState::Pending);
    }
}
