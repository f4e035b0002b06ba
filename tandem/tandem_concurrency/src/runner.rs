//! Spawning and joining the two counting tasks.
//!
//! The runner builds the shared state, lends it to both tasks through a thread
//! scope, joins both unconditionally and hands the writer back in the report.

use std::io::Write;
use std::thread::{self, ScopedJoinHandle};

use log::{debug, info};

use crate::config::RunnerConfig;
use crate::error::RunnerError;
use crate::sync::{CompletionSignal, LockStats, OutputLock, WaitStrategy};
use crate::task::{CountDownTask, CountUpTask, TaskKind};

/// State shared by both counting tasks for the duration of a run
#[derive(Debug)]
pub struct SharedState<W> {
    output: OutputLock<W>,
    signal: CompletionSignal,
}

impl<W> SharedState<W> {
    /// Create shared state writing to `writer`, with a pending signal
    pub fn new(writer: W) -> Self {
        Self {
            output: OutputLock::with_name(writer, "shared-output"),
            signal: CompletionSignal::new(),
        }
    }

    /// The lock every line is written under
    pub fn output(&self) -> &OutputLock<W> {
        &self.output
    }

    /// The up-counter's completion signal
    pub fn signal(&self) -> &CompletionSignal {
        &self.signal
    }

    /// Consume the state and return the writer
    pub fn into_writer(self) -> W {
        self.output.into_inner()
    }
}

/// Outcome of a finished run
#[derive(Debug)]
pub struct RunReport<W> {
    /// Lines written by the up-counter
    pub up_emitted: usize,

    /// Lines written by the down-counter
    pub down_emitted: usize,

    /// How the down-counter waited
    pub wait: WaitStrategy,

    /// Output lock statistics at the end of the run
    pub lock_stats: LockStats,

    /// The writer both tasks wrote to
    pub writer: W,
}

/// Runs the up-counter and the down-counter on two threads
#[derive(Debug, Clone, Default)]
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    /// Create a runner, rejecting an invalid configuration
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this runner uses
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run both tasks to completion against `writer`.
    ///
    /// Both threads are always joined before this returns. When both tasks
    /// fail, the up-counter's error is reported since it is the cause.
    pub fn run<W: Write + Send>(&self, writer: W) -> Result<RunReport<W>, RunnerError> {
        let config = &self.config;
        let shared = SharedState::new(writer);

        info!(
            "Starting run: {}..={} ({} wait)",
            config.start, config.end, config.wait
        );

        let (up_emitted, down_emitted) = thread::scope(|s| {
            let up = thread::Builder::new()
                .name(TaskKind::CountUp.thread_name().to_string())
                .spawn_scoped(s, || CountUpTask::new(&shared, config.range()).run())
                .map_err(|source| RunnerError::Spawn {
                    task: TaskKind::CountUp,
                    source,
                })?;

            let down = thread::Builder::new()
                .name(TaskKind::CountDown.thread_name().to_string())
                .spawn_scoped(s, || {
                    CountDownTask::new(&shared, config.range(), config.wait)
                        .with_timeout(config.wait_timeout())
                        .run()
                })
                .map_err(|source| RunnerError::Spawn {
                    task: TaskKind::CountDown,
                    source,
                })?;

            debug!("Both tasks spawned");

            let up_result = join(up, TaskKind::CountUp);
            let down_result = join(down, TaskKind::CountDown);

            Ok::<_, RunnerError>((up_result?, down_result?))
        })?;

        let lock_stats = shared.output().stats();
        info!(
            "Run finished: {} up, {} down, {} lock acquisitions (max wait {}us)",
            up_emitted, down_emitted, lock_stats.acquisition_count, lock_stats.max_wait_time_us
        );

        Ok(RunReport {
            up_emitted,
            down_emitted,
            wait: config.wait,
            lock_stats,
            writer: shared.into_writer(),
        })
    }
}

fn join<T>(
    handle: ScopedJoinHandle<'_, Result<T, RunnerError>>,
    task: TaskKind,
) -> Result<T, RunnerError> {
    handle
        .join()
        .map_err(|_| RunnerError::TaskPanicked { task })?
}
