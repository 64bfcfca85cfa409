// tests/runtime_fake_executor.rs

mod common;
use crate::common::{FakeExecutor, TestResult, init_tracing, with_timeout};

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use sitepipe::dag::{RunPlan, TaskRegistry};
use sitepipe::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use sitepipe::stages::{RunSummary, StageOutcome};
use sitepipe::types::OverlapPolicy;

async fn run_with(plan: &RunPlan, failing: &[&str]) -> Result<(Vec<String>, RunSummary), Box<dyn std::error::Error>> {
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let mut executor = FakeExecutor::new(rt_tx.clone(), executed.clone());
    for task in failing {
        executor = executor.failing(task);
    }

    let core = CoreRuntime::from_plan(
        plan,
        OverlapPolicy::Coalesce,
        RuntimeOptions {
            exit_when_idle: true,
        },
    );
    let runtime = Runtime::new(core, rt_rx, executor);
    let initial = plan.node_names().map(str::to_string).collect();

    let summary = with_timeout(runtime.run(initial)).await?;
    let executed = executed.lock().unwrap().clone();
    Ok((executed, summary))
}

#[tokio::test]
async fn build_runs_every_stage_once_in_order() -> TestResult {
    init_tracing();

    let plan = TaskRegistry::standard().plan("build")?;
    let (executed, summary) = run_with(&plan, &[]).await?;

    assert_eq!(executed.len(), 7);
    assert_eq!(executed[0], "clean");
    let pos = |name: &str| executed.iter().position(|t| t == name).unwrap();
    assert!(pos("static") < pos("images"));

    assert_eq!(summary.len(), 7);
    assert!(!summary.has_failures());
    Ok(())
}

#[tokio::test]
async fn clean_failure_stops_the_build() -> TestResult {
    init_tracing();

    let plan = TaskRegistry::standard().plan("build")?;
    let (executed, summary) = run_with(&plan, &["clean"]).await?;

    assert_eq!(executed, ["clean".to_string()]);
    assert!(summary.has_failures());

    let skipped = summary
        .reports()
        .iter()
        .filter(|r| matches!(r.outcome, StageOutcome::Skipped { .. }))
        .count();
    assert_eq!(skipped, 6);
    assert!(summary.failed_stages().contains(&"clean".to_string()));
    Ok(())
}

#[tokio::test]
async fn asset_stage_failure_does_not_stop_siblings() -> TestResult {
    let plan = TaskRegistry::standard().plan("build")?;
    let (executed, summary) = run_with(&plan, &["styles"]).await?;

    assert_eq!(executed.len(), 7);
    assert_eq!(summary.failed_stages(), ["styles".to_string()]);
    Ok(())
}

#[tokio::test]
async fn runtime_exits_on_shutdown_for_watch_sessions() -> TestResult {
    let plan = TaskRegistry::standard().plan("dev")?;
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(rt_tx.clone(), executed.clone());

    let core = CoreRuntime::from_plan(
        &plan,
        OverlapPolicy::Coalesce,
        RuntimeOptions {
            exit_when_idle: false,
        },
    );
    let runtime = Runtime::new(core, rt_rx, executor);

    rt_tx
        .send(RuntimeEvent::TaskTriggered {
            task: "html".to_string(),
            reason: sitepipe::engine::TriggerReason::FileWatch,
        })
        .await?;
    rt_tx.send(RuntimeEvent::ShutdownRequested).await?;

    let summary = with_timeout(runtime.run(Vec::new())).await?;
    assert_eq!(*executed.lock().unwrap(), ["html".to_string()]);
    // The completion may or may not arrive before shutdown.
    assert!(summary.len() <= 1);
    Ok(())
}
