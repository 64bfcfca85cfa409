// src/exec/stage_runner.rs

//! Individual stage runner.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::stages::StageSet;

/// Run one stage and emit exactly one `TaskCompleted` for it.
///
/// Stage errors never escape: [`StageSet::run`] turns them into a failed
/// report.
pub async fn run_stage(
    task: ScheduledTask,
    stages: Arc<StageSet>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    info!(task = %task.name, run_id = task.run_id, "starting stage");
    let started = Instant::now();

    let report = stages.run(task.stage).await;

    info!(
        task = %task.name,
        run_id = task.run_id,
        success = report.is_success(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "stage finished"
    );

    if let Err(err) = runtime_tx
        .send(RuntimeEvent::TaskCompleted {
            task: task.name.clone(),
            report,
        })
        .await
    {
        warn!(task = %task.name, "failed to report stage completion: {err}");
    }
}
