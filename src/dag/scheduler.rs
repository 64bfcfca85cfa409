// src/dag/scheduler.rs

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::dag::graph::DagGraph;
use crate::dag::plan::RunPlan;
use crate::engine::{TaskName, TaskOutcome};
use crate::types::StageKind;

/// Per-run state of a task, as seen from outside the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    /// Not participating in the current run (or no run is active).
    NotInRun,
    /// Triggered for this run but waiting on dependencies.
    Pending,
    /// Dispatched to the executor and not yet completed.
    Running,
    /// Completed successfully in this run.
    DoneSuccess,
    /// Failed in this run, or blocked by a failed dependency.
    DoneFailed,
}

#[derive(Debug, Clone)]
struct TaskInfo {
    name: TaskName,
    stage: StageKind,
    deps: Vec<TaskName>,

    /// Per-run state (None if not participating in the current run).
    run_state: Option<TaskRunState>,

    /// Invocations dispatched and not yet completed. Above one only with
    /// the `overlap` watch policy.
    in_flight: usize,
}

/// Description of a stage the scheduler wants the executor to run now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub name: TaskName,
    pub stage: StageKind,
    pub run_id: u64,
}

/// A triggered task that never ran because a dependency failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTask {
    pub name: TaskName,
    pub stage: StageKind,
    pub blocked_by: TaskName,
}

/// Scheduler holds the immutable plan DAG plus mutable per-run state.
///
/// It is responsible for:
/// - remembering which tasks are part of the current run
/// - pulling the dependents of a triggered task into the run
/// - deciding when a triggered task is ready (dependencies in the run
///   succeeded, no dependent still running)
/// - scheduling dependents when a task succeeds
/// - failing dependents when a task fails
#[derive(Debug)]
pub struct Scheduler {
    graph: DagGraph,
    tasks: HashMap<TaskName, TaskInfo>,

    /// Monotonically increasing run ID.
    run_counter: u64,
    /// Currently active run ID, or `None` if there is no active run.
    current_run_id: Option<u64>,

    /// Dependents failed since the last [`Scheduler::drain_skipped`].
    skipped: Vec<SkippedTask>,
}

impl Scheduler {
    pub fn from_plan(plan: &RunPlan) -> Self {
        let graph = DagGraph::from_plan(plan);

        let tasks = plan
            .schedulable()
            .into_iter()
            .map(|(name, stage, _)| {
                (
                    name.clone(),
                    TaskInfo {
                        deps: graph.dependencies_of(&name).to_vec(),
                        name,
                        stage,
                        run_state: None,
                        in_flight: 0,
                    },
                )
            })
            .collect();

        Self {
            graph,
            tasks,
            run_counter: 0,
            current_run_id: None,
            skipped: Vec::new(),
        }
    }

    /// Returns `true` if there is currently no active run.
    pub fn is_idle(&self) -> bool {
        self.current_run_id.is_none()
    }

    /// State of `task` in the current run; `None` for unknown tasks.
    pub fn run_state_of(&self, task: &str) -> Option<TaskRunState> {
        self.tasks
            .get(task)
            .map(|info| info.run_state.unwrap_or(TaskRunState::NotInRun))
    }

    /// Start a new run, resetting per-run state but keeping historical
    /// success information.
    pub fn start_new_run(&mut self) {
        self.run_counter += 1;
        self.current_run_id = Some(self.run_counter);

        for info in self.tasks.values_mut() {
            info.run_state = None;
            info.in_flight = 0;
        }

        debug!(run_id = self.run_counter, "scheduler: starting new run");
    }

    /// Add `task` and every stage downstream of it to the current run.
    ///
    /// Returns the tasks that are now ready to be executed.
    pub fn handle_trigger(&mut self, task: &str) -> Vec<ScheduledTask> {
        self.handle_triggers(&[task])
    }

    /// Add several tasks at once; readiness is only evaluated after all of
    /// them (and their dependents) joined the run.
    pub fn handle_triggers<S: AsRef<str>>(&mut self, tasks: &[S]) -> Vec<ScheduledTask> {
        if self.current_run_id.is_none() {
            warn!("handle_trigger called with no active run; implicitly starting a new run");
            self.start_new_run();
        }

        for task in tasks {
            let task = task.as_ref();
            if self.tasks.contains_key(task) {
                self.mark_task_and_dependents_pending(task);
            } else {
                warn!(task = %task, "trigger for unknown task; ignoring");
            }
        }

        let ready = self.collect_new_ready_tasks();
        self.maybe_finish_run();
        ready
    }

    /// Put a task that already finished in this run back to `Pending` so it
    /// runs again (watch re-triggers).
    pub fn rearm(&mut self, task: &str) -> Vec<ScheduledTask> {
        if self.current_run_id.is_none() {
            return self.handle_trigger(task);
        }

        match self.tasks.get_mut(task) {
            Some(info) => match info.run_state {
                Some(TaskRunState::DoneSuccess)
                | Some(TaskRunState::DoneFailed)
                | Some(TaskRunState::NotInRun)
                | None => {
                    info.run_state = Some(TaskRunState::Pending);
                    debug!(task = %info.name, "task re-armed for another invocation");
                }
                Some(TaskRunState::Pending) | Some(TaskRunState::Running) => {
                    debug!(task = %info.name, "task still active; rearm ignored");
                }
            },
            None => warn!(task = %task, "rearm for unknown task; ignoring"),
        }

        let ready = self.collect_new_ready_tasks();
        self.maybe_finish_run();
        ready
    }

    /// Dispatch one more invocation of a task that is already `Running`.
    ///
    /// The task only becomes terminal once every invocation has completed.
    pub fn overlap(&mut self, task: &str) -> Option<ScheduledTask> {
        let run_id = self.current_run_id?;
        let info = self.tasks.get_mut(task)?;
        if info.run_state != Some(TaskRunState::Running) {
            return None;
        }
        info.in_flight += 1;
        debug!(task = %info.name, in_flight = info.in_flight, "dispatching overlapping invocation");
        Some(ScheduledTask {
            name: info.name.clone(),
            stage: info.stage,
            run_id,
        })
    }

    /// Handle completion of one invocation of a task.
    ///
    /// - On success, mark it `DoneSuccess`, re-arm dependents that already
    ///   finished, and schedule whatever became ready.
    /// - On failure, mark it `DoneFailed` and fail every triggered dependent
    ///   in this run.
    pub fn handle_completion(&mut self, task: &str, outcome: TaskOutcome) -> Vec<ScheduledTask> {
        if self.current_run_id.is_none() {
            warn!(task = %task, "handle_completion called with no active run; ignoring");
            return Vec::new();
        }

        let mut newly_ready = Vec::new();

        match self.tasks.get_mut(task) {
            Some(info) => {
                info.in_flight = info.in_flight.saturating_sub(1);
                if info.in_flight > 0 {
                    debug!(
                        task = %info.name,
                        in_flight = info.in_flight,
                        "invocation completed; others still running"
                    );
                    return newly_ready;
                }

                match outcome {
                    TaskOutcome::Success => {
                        info.run_state = Some(TaskRunState::DoneSuccess);
                        debug!(task = %info.name, "task completed successfully");
                        self.rearm_finished_dependents(task);
                        newly_ready.extend(self.collect_new_ready_tasks());
                    }
                    TaskOutcome::Failed => {
                        info.run_state = Some(TaskRunState::DoneFailed);
                        warn!(task = %info.name, "task failed; failing dependents in this run");
                        self.mark_dependents_failed(task);
                    }
                }
            }
            None => {
                warn!(task = %task, "completion for unknown task; ignoring");
            }
        }

        self.maybe_finish_run();
        newly_ready
    }

    /// Tasks blocked by an upstream failure since the last call.
    pub fn drain_skipped(&mut self) -> Vec<SkippedTask> {
        std::mem::take(&mut self.skipped)
    }

    /// Clear `current_run_id` once every participating task is terminal.
    fn maybe_finish_run(&mut self) {
        if self.current_run_id.is_none() {
            return;
        }

        let any_active = self.tasks.values().any(|info| {
            matches!(
                info.run_state,
                Some(TaskRunState::Pending) | Some(TaskRunState::Running)
            )
        });

        if !any_active {
            info!(
                run_id = self.current_run_id,
                "scheduler: all tasks terminal; marking run as finished"
            );
            self.current_run_id = None;
        }
    }

    /// Mark every `Pending` task whose dependencies are satisfied as
    /// `Running` and return it.
    fn collect_new_ready_tasks(&mut self) -> Vec<ScheduledTask> {
        let Some(run_id) = self.current_run_id else {
            return Vec::new();
        };

        let mut candidates: Vec<TaskName> = self
            .tasks
            .values()
            .filter(|info| {
                matches!(info.run_state, Some(TaskRunState::Pending))
                    && self.deps_satisfied(info)
                    && !self.dependent_running(&info.name)
            })
            .map(|info| info.name.clone())
            .collect();
        candidates.sort();

        let mut ready = Vec::with_capacity(candidates.len());
        for name in candidates {
            if let Some(info) = self.tasks.get_mut(&name) {
                debug!(task = %info.name, "dependencies satisfied; marking Running");
                info.run_state = Some(TaskRunState::Running);
                info.in_flight = 1;
                ready.push(ScheduledTask {
                    name: info.name.clone(),
                    stage: info.stage,
                    run_id,
                });
            }
        }

        ready
    }

    /// A dependency is satisfied if it succeeded in this run or is not part
    /// of it.
    fn deps_satisfied(&self, info: &TaskInfo) -> bool {
        info.deps.iter().all(|dep_name| match self.tasks.get(dep_name) {
            Some(dep) => matches!(dep.run_state, Some(TaskRunState::DoneSuccess) | None),
            None => {
                warn!(task = %info.name, dep = %dep_name, "dependency missing from tasks map");
                false
            }
        })
    }

    /// A dependent still running would race the task on shared outputs.
    fn dependent_running(&self, name: &str) -> bool {
        self.graph.dependents_of(name).iter().any(|dependent| {
            self.tasks
                .get(dependent)
                .is_some_and(|d| d.run_state == Some(TaskRunState::Running))
        })
    }

    /// Mark the task and all its transitive dependents as `Pending` if they
    /// are not already part of the current run.
    fn mark_task_and_dependents_pending(&mut self, root: &str) {
        let mut stack = vec![root.to_string()];

        while let Some(name) = stack.pop() {
            if let Some(info) = self.tasks.get_mut(&name) {
                match info.run_state {
                    None => {
                        info.run_state = Some(TaskRunState::Pending);
                        debug!(task = %info.name, "task marked as Pending in this run");
                    }
                    Some(_) => {
                        debug!(
                            task = %info.name,
                            "task already participating in current run; ignoring additional trigger"
                        );
                    }
                }
            }
            stack.extend(self.graph.dependents_of(&name).iter().cloned());
        }
    }

    /// After `task` succeeds again, dependents that already finished in this
    /// run are stale; put them back to `Pending`. Dependents held back by
    /// another failed dependency stay as they are.
    fn rearm_finished_dependents(&mut self, task: &str) {
        let dependents = self.graph.dependents_of(task).to_vec();
        for name in dependents {
            let Some(info) = self.tasks.get(&name) else {
                continue;
            };
            let finished = matches!(
                info.run_state,
                Some(TaskRunState::DoneSuccess) | Some(TaskRunState::DoneFailed)
            );
            let blocked = info.deps.iter().any(|dep| {
                self.tasks
                    .get(dep)
                    .is_some_and(|d| d.run_state == Some(TaskRunState::DoneFailed))
            });
            if finished && !blocked {
                if let Some(info) = self.tasks.get_mut(&name) {
                    info.run_state = Some(TaskRunState::Pending);
                    debug!(task = %info.name, upstream = %task, "dependent re-armed after upstream rerun");
                }
            }
        }
    }

    /// Mark all triggered dependents (transitively) of a failed task as
    /// `DoneFailed` for this run.
    fn mark_dependents_failed(&mut self, failed_task: &str) {
        let mut stack: Vec<TaskName> = self.graph.dependents_of(failed_task).to_vec();

        while let Some(name) = stack.pop() {
            if let Some(info) = self.tasks.get_mut(&name) {
                if info.run_state == Some(TaskRunState::Pending) {
                    info.run_state = Some(TaskRunState::DoneFailed);
                    self.skipped.push(SkippedTask {
                        name: info.name.clone(),
                        stage: info.stage,
                        blocked_by: failed_task.to_string(),
                    });
                    warn!(
                        task = %info.name,
                        blocked_by = %failed_task,
                        "skipping dependent due to upstream failure"
                    );
                    stack.extend(self.graph.dependents_of(&name).iter().cloned());
                }
            }
        }
    }
}
