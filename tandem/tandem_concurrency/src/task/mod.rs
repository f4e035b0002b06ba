//! The two counting tasks.
//!
//! Both tasks write through the same [`OutputLock`](crate::sync::OutputLock),
//! one line per value. The up-counter settles the completion signal when it
//! finishes; the down-counter waits on that signal before it starts.

pub mod down;
pub mod up;

pub use down::{CountDownState, CountDownTask};
pub use up::CountUpTask;

use std::fmt;
use std::io::Write;

use crate::error::RunnerError;
use crate::runner::SharedState;

/// Identifies one of the two counting tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Emits ascending values, then completes the signal
    CountUp,

    /// Waits for the signal, then emits descending values
    CountDown,
}

impl TaskKind {
    /// Prefix written before each value
    pub fn label(&self) -> &'static str {
        match self {
            Self::CountUp => "Counting Up",
            Self::CountDown => "Counting Down",
        }
    }

    /// Name given to the task's thread
    pub fn thread_name(&self) -> &'static str {
        match self {
            Self::CountUp => "counter-up",
            Self::CountDown => "counter-down",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.thread_name())
    }
}

/// Write one `"<label>: <value>"` line under the shared lock
fn emit<W: Write>(shared: &SharedState<W>, task: TaskKind, value: u32) -> Result<(), RunnerError> {
    shared
        .output()
        .emit_line(format_args!("{}: {}", task.label(), value))
        .map_err(|source| RunnerError::Emit { task, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_labels() {
        assert_eq!(TaskKind::CountUp.label(), "Counting Up");
        assert_eq!(TaskKind::CountDown.label(), "Counting Down");
        assert_eq!(TaskKind::CountUp.to_string(), "counter-up");
        assert_eq!(TaskKind::CountDown.to_string(), "counter-down");
    }

    #[test]
    fn test_emit_formats_line() {
        let shared = SharedState::new(Vec::<u8>::new());

        emit(&shared, TaskKind::CountDown, 7).unwrap();

        let output = String::from_utf8(shared.into_writer()).unwrap();
        assert_eq!(output, "Counting Down: 7\n");
    }
}
