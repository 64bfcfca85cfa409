// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::BTreeSet;

use tracing::debug;

use crate::dag::{ScheduledTask, Scheduler, TaskRunState};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeOptions, TaskName, TaskOutcome, TriggerReason};
use crate::stages::{RunSummary, StageReport};
use crate::types::OverlapPolicy;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Send these stages to the executor.
    DispatchTasks(Vec<ScheduledTask>),
    /// Request that the runtime exits (one-shot tasks, once idle).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    /// Stage names dispatched by this step, in order.
    pub fn dispatched(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                CoreCommand::DispatchTasks(tasks) => Some(tasks),
                CoreCommand::RequestExit => None,
            })
            .flatten()
            .map(|t| t.name.as_str())
            .collect()
    }
}

/// Handle a task trigger event.
///
/// - If the scheduler is idle, start a new run seeded with this trigger plus
///   anything still queued.
/// - If a run is active:
///   - a task not yet in the run is merged into it;
///   - a task that is pending already will run, so the trigger is dropped;
///   - a task that is running follows the overlap policy (queue one re-run,
///     or dispatch another invocation right away);
///   - a task that already finished in this run is re-armed.
pub fn handle_task_trigger(
    scheduler: &mut Scheduler,
    queue: &mut TriggerQueue,
    task: TaskName,
    reason: TriggerReason,
) -> CoreStep {
    let mut commands = Vec::new();
    debug!(task = %task, ?reason, "handling trigger");

    if scheduler.is_idle() {
        let mut triggers: BTreeSet<TaskName> = queue.drain_pending().into_iter().collect();
        triggers.insert(task);
        return start_new_run_from_triggers(scheduler, triggers.into_iter().collect());
    }

    match scheduler.run_state_of(&task) {
        None => {
            debug!(task = %task, "trigger for a task outside the plan; ignoring");
        }
        Some(TaskRunState::NotInRun) => {
            push_dispatch(&mut commands, scheduler.handle_trigger(&task));
        }
        Some(TaskRunState::Pending) => {
            debug!(task = %task, "task already pending; trigger absorbed");
        }
        Some(TaskRunState::Running) => match queue.policy() {
            OverlapPolicy::Coalesce => queue.record_trigger(&task),
            OverlapPolicy::Overlap => {
                if let Some(extra) = scheduler.overlap(&task) {
                    commands.push(CoreCommand::DispatchTasks(vec![extra]));
                }
            }
        },
        Some(TaskRunState::DoneSuccess) | Some(TaskRunState::DoneFailed) => {
            push_dispatch(&mut commands, scheduler.rearm(&task));
        }
    }

    CoreStep::running(commands)
}

/// Handle a stage completion event.
///
/// The report is recorded, dependents are released (or skipped on failure),
/// and a coalesced re-run of the same stage is started if one is waiting.
pub fn handle_task_completion(
    scheduler: &mut Scheduler,
    queue: &mut TriggerQueue,
    summary: &mut RunSummary,
    options: &RuntimeOptions,
    task: TaskName,
    report: StageReport,
) -> CoreStep {
    let mut commands = Vec::new();

    let outcome = if report.is_success() {
        TaskOutcome::Success
    } else {
        TaskOutcome::Failed
    };
    summary.record(report);

    push_dispatch(&mut commands, scheduler.handle_completion(&task, outcome));

    for skipped in scheduler.drain_skipped() {
        summary.record(StageReport::skipped(skipped.stage, skipped.blocked_by));
    }

    let finished = !matches!(
        scheduler.run_state_of(&task),
        Some(TaskRunState::Running) | Some(TaskRunState::Pending)
    );
    if finished && queue.take(&task) {
        if scheduler.is_idle() {
            let mut triggers = queue.drain_pending();
            triggers.push(task);
            commands.extend(start_new_run_from_triggers(scheduler, triggers).commands);
        } else {
            push_dispatch(&mut commands, scheduler.rearm(&task));
        }
    }

    commands.extend(maybe_start_queued_run(scheduler, queue));

    let mut keep_running = true;
    if options.exit_when_idle && scheduler.is_idle() && queue.is_empty() {
        keep_running = false;
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}

/// Seed a new run from a set of triggers.
pub fn start_new_run_from_triggers(
    scheduler: &mut Scheduler,
    triggers: Vec<TaskName>,
) -> CoreStep {
    let mut commands = Vec::new();

    if triggers.is_empty() {
        return CoreStep::running(commands);
    }

    scheduler.start_new_run();
    push_dispatch(&mut commands, scheduler.handle_triggers(triggers.as_slice()));

    CoreStep::running(commands)
}

/// If the scheduler is idle and there are queued triggers, start a new run.
fn maybe_start_queued_run(scheduler: &mut Scheduler, queue: &mut TriggerQueue) -> Vec<CoreCommand> {
    if !scheduler.is_idle() || queue.is_empty() {
        return Vec::new();
    }
    start_new_run_from_triggers(scheduler, queue.drain_pending()).commands
}

fn push_dispatch(commands: &mut Vec<CoreCommand>, ready: Vec<ScheduledTask>) {
    if !ready.is_empty() {
        commands.push(CoreCommand::DispatchTasks(ready));
    }
}
