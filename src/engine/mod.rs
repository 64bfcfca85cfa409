// src/engine/mod.rs

//! Orchestration engine for sitepipe.
//!
//! This module ties together:
//! - the plan scheduler
//! - the trigger queue (what happens when a stage is re-triggered while it
//!   is still running)
//! - the main runtime event loop that reacts to:
//!   - manual and file-watch triggers
//!   - stage completion events
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::stages::StageReport;

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Outcome of a stage run as seen by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

/// Why a task was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Triggered due to a filesystem event.
    FileWatch,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// Exit the runtime once the plan is idle and no triggers are queued.
    /// Off for watch sessions, which run until shutdown.
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from the CLI, watchers and executors.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A stage task should be (re)run.
    TaskTriggered {
        task: TaskName,
        reason: TriggerReason,
    },
    /// A stage invocation finished.
    TaskCompleted {
        task: TaskName,
        report: StageReport,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::TriggerQueue;
pub use runtime::Runtime;
