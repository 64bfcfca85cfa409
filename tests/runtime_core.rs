// tests/runtime_core.rs

mod common;
use crate::common::{TestResult, init_tracing};

use sitepipe::dag::{TaskRegistry, TaskRunState};
use sitepipe::engine::{CoreRuntime, RuntimeEvent, RuntimeOptions, TriggerReason};
use sitepipe::stages::StageReport;
use sitepipe::types::{OverlapPolicy, StageKind};

fn watch_core(policy: OverlapPolicy) -> CoreRuntime {
    let plan = TaskRegistry::standard().plan("dev").expect("dev plan");
    CoreRuntime::from_plan(
        &plan,
        policy,
        RuntimeOptions {
            exit_when_idle: false,
        },
    )
}

fn file_change(task: &str) -> RuntimeEvent {
    RuntimeEvent::TaskTriggered {
        task: task.to_string(),
        reason: TriggerReason::FileWatch,
    }
}

fn completed(task: &str, stage: StageKind) -> RuntimeEvent {
    RuntimeEvent::TaskCompleted {
        task: task.to_string(),
        report: StageReport::succeeded(stage, 1),
    }
}

#[test]
fn coalesce_runs_once_more_after_many_triggers() -> TestResult {
    init_tracing();
    let mut core = watch_core(OverlapPolicy::Coalesce);

    let step = core.step(file_change("styles"));
    assert_eq!(step.dispatched(), ["styles"]);

    for _ in 0..5 {
        let step = core.step(file_change("styles"));
        assert!(step.dispatched().is_empty());
        assert!(step.keep_running);
    }
    assert!(!core.queue_is_empty());

    let step = core.step(completed("styles", StageKind::Styles));
    assert_eq!(step.dispatched(), ["styles"]);
    assert!(core.queue_is_empty());

    let step = core.step(completed("styles", StageKind::Styles));
    assert!(step.dispatched().is_empty());
    assert!(core.is_idle());
    assert_eq!(core.summary().runs_of(StageKind::Styles), 2);
    Ok(())
}

#[test]
fn coalesced_rerun_starts_while_other_stages_still_run() -> TestResult {
    let mut core = watch_core(OverlapPolicy::Coalesce);

    core.step(file_change("styles"));
    let step = core.step(file_change("scripts"));
    assert_eq!(step.dispatched(), ["scripts"]);

    core.step(file_change("styles"));
    let step = core.step(completed("styles", StageKind::Styles));
    assert_eq!(step.dispatched(), ["styles"]);
    assert_eq!(core.scheduler().run_state_of("scripts"), Some(TaskRunState::Running));
    Ok(())
}

#[test]
fn overlap_dispatches_every_trigger() -> TestResult {
    let mut core = watch_core(OverlapPolicy::Overlap);

    assert_eq!(core.step(file_change("html")).dispatched(), ["html"]);
    for _ in 0..3 {
        assert_eq!(core.step(file_change("html")).dispatched(), ["html"]);
    }
    assert!(core.queue_is_empty());

    for _ in 0..4 {
        assert!(core.step(completed("html", StageKind::Html)).dispatched().is_empty());
    }
    assert!(core.is_idle());
    assert_eq!(core.summary().runs_of(StageKind::Html), 4);
    Ok(())
}

#[test]
fn trigger_after_completion_starts_a_fresh_run() -> TestResult {
    let mut core = watch_core(OverlapPolicy::Coalesce);

    core.step(file_change("images"));
    core.step(completed("images", StageKind::Images));
    assert!(core.is_idle());

    let step = core.step(file_change("images"));
    assert_eq!(step.dispatched(), ["images"]);
    Ok(())
}

#[test]
fn watch_session_keeps_running_until_shutdown() -> TestResult {
    let mut core = watch_core(OverlapPolicy::Coalesce);

    let seed = core.seed(Vec::new());
    assert!(seed.keep_running);
    assert!(seed.commands.is_empty());

    core.step(file_change("static"));
    let step = core.step(completed("static", StageKind::Static));
    assert!(step.keep_running);

    let step = core.step(RuntimeEvent::ShutdownRequested);
    assert!(!step.keep_running);
    Ok(())
}

#[test]
fn failed_then_fixed_watch_stage_is_not_reported_as_failing() -> TestResult {
    let mut core = watch_core(OverlapPolicy::Coalesce);

    core.step(file_change("styles"));
    core.step(RuntimeEvent::TaskCompleted {
        task: "styles".to_string(),
        report: StageReport::failed(StageKind::Styles, "syntax error"),
    });
    assert_eq!(core.summary().failed_stages(), ["styles".to_string()]);

    core.step(file_change("styles"));
    core.step(completed("styles", StageKind::Styles));
    assert!(!core.summary().has_failures());
    Ok(())
}

#[test]
fn static_and_images_changes_never_run_concurrently() -> TestResult {
    init_tracing();
    let mut core = watch_core(OverlapPolicy::Coalesce);

    let step = core.step(file_change("static"));
    assert_eq!(step.dispatched(), ["static"]);
    assert_eq!(core.scheduler().run_state_of("images"), Some(TaskRunState::Pending));

    // A png change arriving while `static` copies files waits for it.
    let step = core.step(file_change("images"));
    assert!(step.dispatched().is_empty());

    let step = core.step(completed("static", StageKind::Static));
    assert_eq!(step.dispatched(), ["images"]);

    core.step(completed("images", StageKind::Images));
    assert!(core.is_idle());
    assert_eq!(core.summary().runs_of(StageKind::Images), 1);
    Ok(())
}

#[test]
fn static_change_during_images_runs_after_it_then_reoptimizes() -> TestResult {
    let mut core = watch_core(OverlapPolicy::Coalesce);

    let step = core.step(file_change("images"));
    assert_eq!(step.dispatched(), ["images"]);

    let step = core.step(file_change("static"));
    assert!(step.dispatched().is_empty());
    assert_eq!(core.scheduler().run_state_of("static"), Some(TaskRunState::Pending));

    let step = core.step(completed("images", StageKind::Images));
    assert_eq!(step.dispatched(), ["static"]);

    // `static` may have overwritten optimized files; `images` runs again.
    let step = core.step(completed("static", StageKind::Static));
    assert_eq!(step.dispatched(), ["images"]);

    core.step(completed("images", StageKind::Images));
    assert!(core.is_idle());
    assert_eq!(core.summary().runs_of(StageKind::Images), 2);
    Ok(())
}
