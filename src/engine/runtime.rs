// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::ExecutorBackend;
use crate::stages::RunSummary;

use super::core::CoreRuntime;
use super::{CoreCommand, CoreStep, RuntimeEvent, TaskName};

/// The IO shell around [`CoreRuntime`].
///
/// It pulls [`RuntimeEvent`]s off the channel, lets the core decide, and
/// hands whatever stages the core releases to the executor backend.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    events: mpsc::Receiver<RuntimeEvent>,
    executor: E,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(core: CoreRuntime, events: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            events,
            executor,
        }
    }

    /// Run until the core asks to stop, shutdown is requested, or every
    /// event sender is gone.
    ///
    /// `initial` forms the first run; watch sessions pass an empty list and
    /// wait for file changes.
    pub async fn run(mut self, initial: Vec<TaskName>) -> Result<RunSummary> {
        info!(stages = initial.len(), "runtime started");

        let seed = self.core.seed(initial);
        let mut keep_running = self.apply(seed).await?;

        while keep_running {
            let Some(event) = self.events.recv().await else {
                debug!("all event senders dropped");
                break;
            };
            debug!(?event, "runtime event");
            let step = self.core.step(event);
            keep_running = self.apply(step).await?;
        }

        let summary = self.core.into_summary();
        info!(reports = summary.len(), "runtime stopped");
        Ok(summary)
    }

    /// Carry out one core decision; returns whether to keep going.
    async fn apply(&mut self, step: CoreStep) -> Result<bool> {
        for command in step.commands {
            match command {
                CoreCommand::DispatchTasks(tasks) if !tasks.is_empty() => {
                    debug!(
                        stages = ?tasks.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
                        "dispatching"
                    );
                    self.executor.spawn_ready_tasks(tasks).await?;
                }
                CoreCommand::DispatchTasks(_) => {}
                CoreCommand::RequestExit => debug!("core is idle; exit requested"),
            }
        }
        Ok(step.keep_running)
    }
}
