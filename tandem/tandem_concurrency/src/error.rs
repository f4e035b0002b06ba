//! Errors surfaced by a run.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;
use crate::sync::SignalError;
use crate::task::TaskKind;

/// Error returned when a run cannot finish normally
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The configuration was rejected before any thread started
    #[error("configuration error")]
    Config(#[from] ConfigError),

    /// A task thread could not be spawned
    #[error("failed to spawn {task} task")]
    Spawn {
        /// Task whose thread failed to start
        task: TaskKind,
        /// Underlying I/O error
        source: io::Error,
    },

    /// A task could not write a line
    #[error("{task} task failed to write output")]
    Emit {
        /// Task that failed to write
        task: TaskKind,
        /// Underlying I/O error
        source: io::Error,
    },

    /// A task thread panicked
    #[error("{task} task panicked")]
    TaskPanicked {
        /// Task whose thread panicked
        task: TaskKind,
    },

    /// The up-counter ended without signalling completion
    #[error("counting up ended without signalling completion")]
    SignalAbandoned,

    /// The down-counter gave up waiting for the up-counter
    #[error("completion signal not observed within {0:?}")]
    SignalTimeout(Duration),
}

impl From<SignalError> for RunnerError {
    fn from(err: SignalError) -> Self {
        match err {
            SignalError::Abandoned => Self::SignalAbandoned,
            SignalError::Timeout(timeout) => Self::SignalTimeout(timeout),
        }
    }
}
