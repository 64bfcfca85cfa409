// src/exec/mod.rs

//! Stage execution layer.
//!
//! Runs the stages the scheduler marks ready and reports back to the
//! orchestration runtime via `RuntimeEvent`s.
//!
//! - [`executor_loop`] owns the loop that spawns one Tokio task per
//!   scheduled stage.
//! - [`stage_runner`] runs a single stage and emits its completion.
//! - [`backend`] provides the `ExecutorBackend` trait and the production
//!   `StageExecutor`, which tests can replace with a fake implementation.

pub mod backend;
pub mod executor_loop;
pub mod stage_runner;

pub use backend::{ExecutorBackend, StageExecutor};
pub use executor_loop::spawn_executor;
