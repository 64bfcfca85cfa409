// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! The core consumes [`RuntimeEvent`]s and produces an updated state plus a
//! list of commands describing what the IO shell should do next. It has no
//! channels, no Tokio types and performs no IO, so it can be driven
//! step by step from tests.

use crate::dag::{RunPlan, Scheduler};
use crate::engine::event_handlers::{
    CoreStep, handle_task_completion, handle_task_trigger, start_new_run_from_triggers,
};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeEvent, RuntimeOptions, TaskName};
use crate::stages::RunSummary;
use crate::types::OverlapPolicy;

/// Pure core runtime state.
///
/// This owns:
/// - the plan scheduler
/// - the trigger queue
/// - the summary of every report received so far
/// - runtime options (e.g. `exit_when_idle`)
#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: Scheduler,
    queue: TriggerQueue,
    summary: RunSummary,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(scheduler: Scheduler, policy: OverlapPolicy, options: RuntimeOptions) -> Self {
        Self {
            scheduler,
            queue: TriggerQueue::new(policy),
            summary: RunSummary::new(),
            options,
        }
    }

    pub fn from_plan(plan: &RunPlan, policy: OverlapPolicy, options: RuntimeOptions) -> Self {
        Self::new(Scheduler::from_plan(plan), policy, options)
    }

    /// Expose whether the scheduler is idle (for tests).
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    /// Expose queue emptiness (for tests).
    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn into_summary(self) -> RunSummary {
        self.summary
    }

    /// Start one run containing all of `tasks` at once.
    ///
    /// Used for the initial run of a one-shot task, so that every stage of
    /// the plan shares a run and dependency failures propagate.
    pub fn seed(&mut self, tasks: Vec<TaskName>) -> CoreStep {
        let mut step = start_new_run_from_triggers(&mut self.scheduler, tasks);
        if step.commands.is_empty() && self.options.exit_when_idle && self.is_idle() {
            step.keep_running = false;
        }
        step
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TaskTriggered { task, reason } => {
                handle_task_trigger(&mut self.scheduler, &mut self.queue, task, reason)
            }
            RuntimeEvent::TaskCompleted { task, report } => handle_task_completion(
                &mut self.scheduler,
                &mut self.queue,
                &mut self.summary,
                &self.options,
                task,
                report,
            ),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
