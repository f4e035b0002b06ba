//! Synchronization primitives for the counting hand-off.
//!
//! - An output lock that serializes whole-line writes and keeps statistics
//! - A one-shot completion signal with spinning and blocking waits

pub mod lock;
pub mod signal;

// Re-export key types from lock
pub use lock::{LockStats, OutputGuard, OutputLock};

// Re-export key types from signal
pub use signal::{CompletionGuard, CompletionSignal, SignalError, SignalState, WaitStrategy};
