//! Counter-up task.

use std::io::Write;
use std::ops::RangeInclusive;

use log::debug;

use super::{emit, TaskKind};
use crate::error::RunnerError;
use crate::runner::SharedState;

/// Emits `range` in ascending order, then completes the signal
pub struct CountUpTask<'a, W> {
    shared: &'a SharedState<W>,
    range: RangeInclusive<u32>,
}

impl<'a, W: Write> CountUpTask<'a, W> {
    /// Create a task counting through `range`
    pub fn new(shared: &'a SharedState<W>, range: RangeInclusive<u32>) -> Self {
        Self { shared, range }
    }

    /// Run to completion, returning the number of lines written.
    ///
    /// The signal is completed only after the last line is written. If a
    /// write fails or the task panics, the signal is abandoned instead.
    pub fn run(self) -> Result<usize, RunnerError> {
        let guard = self.shared.signal().arm();
        let mut emitted = 0;

        for value in self.range {
            emit(self.shared, TaskKind::CountUp, value)?;
            emitted += 1;
        }

        guard.complete();
        debug!("{} finished after {} lines", TaskKind::CountUp, emitted);
        Ok(emitted)
    }
}
