//! Benchmark session runner.
//!
//! Opens a session on the harness, runs the selected tasks through a
//! [`TaskSolver`](shopbot_core::TaskSolver) one at a time, reports scores and
//! submits the session when the whole set ran.

pub mod runner;
pub mod summary;

pub use runner::{RunOptions, RunnerError, Session, TaskRunner, error_chain};
pub use summary::{RunSummary, TaskOutcome};
