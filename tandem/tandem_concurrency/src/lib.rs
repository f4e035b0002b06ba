#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! # Tandem Concurrency
//!
//! Two threads coordinating through a shared output lock and a one-shot
//! completion signal.
//!
//! One task counts upward and signals completion; the other waits for that
//! signal and then counts downward. Every line is written under the same lock,
//! so lines never interleave, and the signal orders every upward line before
//! every downward line.
//!
//! ## Layout
//!
//! - [`sync`]: the output lock and the completion signal
//! - [`task`]: the counting tasks
//! - [`runner`]: shared state construction, spawning and joining
//! - [`config`]: run configuration loaded from TOML
//! - [`error`]: errors surfaced by a run

/// Run configuration
pub mod config;

/// Errors surfaced by a run
pub mod error;

/// Spawning and joining the two counting tasks
pub mod runner;

/// Synchronization primitives shared by the counting tasks
pub mod sync;

/// The counting tasks themselves
pub mod task;

// Re-export key types for easier access
pub use config::{ConfigError, RunnerConfig};
pub use error::RunnerError;
pub use runner::{RunReport, Runner, SharedState};
pub use sync::{CompletionSignal, LockStats, OutputLock, SignalState, WaitStrategy};
pub use task::{CountDownState, TaskKind};
