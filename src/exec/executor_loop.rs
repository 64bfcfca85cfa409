// src/exec/executor_loop.rs

//! Main executor loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::exec::stage_runner::run_stage;
use crate::stages::StageSet;

/// Spawn the background executor loop.
///
/// Every scheduled stage runs in its own Tokio task, so independent stages
/// interleave on I/O. Whether a stage may run twice at once is decided by
/// the scheduler, not here.
pub fn spawn_executor(
    stages: Arc<StageSet>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> mpsc::Sender<ScheduledTask> {
    let (tx, mut rx) = mpsc::channel::<ScheduledTask>(32);

    tokio::spawn(async move {
        info!("executor loop started");

        while let Some(task) = rx.recv().await {
            let stages = Arc::clone(&stages);
            let rt_tx = runtime_tx.clone();
            let name = task.name.clone();
            tokio::spawn(async move {
                run_stage(task, stages, rt_tx).await;
                debug!(task = %name, "stage runner future finished");
            });
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}
