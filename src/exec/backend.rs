// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of a raw mpsc sender,
//! so tests can swap in a fake executor that records what was scheduled and
//! emits `TaskCompleted` events directly.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::errors::{Error, Result};
use crate::stages::StageSet;

use super::executor_loop::spawn_executor;

/// Trait abstracting how scheduled stages are executed.
pub trait ExecutorBackend: Send {
    /// Dispatch the given stages for execution.
    ///
    /// Implementations must eventually answer every dispatched stage with a
    /// `RuntimeEvent::TaskCompleted`.
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production backend: forwards scheduled stages to the background
/// executor loop, which runs them against a shared [`StageSet`].
pub struct StageExecutor {
    tx: mpsc::Sender<ScheduledTask>,
}

impl StageExecutor {
    /// Spawn the background executor loop immediately.
    pub fn new(stages: Arc<StageSet>, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        let tx = spawn_executor(stages, runtime_tx);
        Self { tx }
    }
}

impl ExecutorBackend for StageExecutor {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();

        Box::pin(async move {
            for task in tasks {
                tx.send(task).await.map_err(Error::from)?;
            }
            Ok(())
        })
    }
}
