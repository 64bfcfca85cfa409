// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod stages;
pub mod transform;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, Layout, load_or_default};
use crate::dag::{RunPlan, TaskAction, TaskRegistry};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TaskName};
use crate::errors::SitepipeError;
use crate::exec::StageExecutor;
use crate::stages::{RunSummary, StageSet, output_claims};
use crate::transform::Toolchain;
use crate::watch::{StageWatchProfile, WatcherHandle, binding_globs, spawn_watcher};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and the path layout
/// - planning (with the output disjointness check)
/// - scheduler / queue / runtime
/// - stage executor
/// - file watcher and Ctrl-C handling for watch tasks
pub async fn run(args: CliArgs) -> Result<()> {
    let registry = TaskRegistry::standard();

    if args.tasks {
        print_tasks(&registry);
        return Ok(());
    }

    let task = args.task.as_deref().context("no task given")?;

    let (cfg, cfg_path) = load_or_default(args.config.as_deref().map(Path::new))?;
    let root = resolve_root(args.root.as_deref(), cfg_path.as_deref());
    let layout = Layout::from_config(&root, &cfg);
    info!(task, root = ?root, config = ?cfg_path, "resolved project");

    let plan = plan_task(&registry, task, &cfg)?;

    if args.dry_run {
        print_dry_run(&plan, &cfg, &layout);
        return Ok(());
    }

    let toolchain = Toolchain::from_config(&cfg, &layout);
    let summary = execute(&plan, &cfg, &layout, toolchain).await?;

    log_summary(&summary);
    let failed = summary.failed_stages();
    if !failed.is_empty() {
        return Err(SitepipeError::StagesFailed(failed).into());
    }
    Ok(())
}

/// Expand `task` and check that its concurrent stages write disjoint
/// outputs.
pub fn plan_task(registry: &TaskRegistry, task: &str, cfg: &ConfigFile) -> errors::Result<RunPlan> {
    let plan = registry.plan(task)?;
    plan.check_disjoint_outputs(|stage| output_claims(stage, cfg))?;
    Ok(plan)
}

/// Run a plan to completion (one-shot tasks) or until Ctrl-C (watch tasks)
/// and return every stage report.
pub async fn execute(
    plan: &RunPlan,
    cfg: &ConfigFile,
    layout: &Layout,
    toolchain: Toolchain,
) -> Result<RunSummary> {
    let stages = Arc::new(StageSet::from_config(cfg, layout, toolchain));

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let executor = StageExecutor::new(stages, rt_tx.clone());

    let watching = !plan.watches.is_empty();
    let _watcher_handle = if watching {
        let handle = start_watcher(plan, cfg, layout, rt_tx.clone())?;
        spawn_ctrl_c(rt_tx.clone());
        Some(handle)
    } else {
        None
    };

    let options = RuntimeOptions {
        exit_when_idle: !watching,
    };
    let core = CoreRuntime::from_plan(plan, cfg.watch.on_overlap, options);

    // Every stage of the plan joins the initial run; watch-only stages wait
    // for their first change.
    let initial: Vec<TaskName> = plan.node_names().map(str::to_string).collect();

    let runtime = Runtime::new(core, rt_rx, executor);
    let summary = runtime.run(initial).await?;
    Ok(summary)
}

fn start_watcher(
    plan: &RunPlan,
    cfg: &ConfigFile,
    layout: &Layout,
    rt_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let profiles = plan
        .watches
        .iter()
        .map(|binding| {
            let globs = binding_globs(binding.stage, cfg, layout);
            info!(task = %binding.task, ?globs, "binding watcher");
            StageWatchProfile::new(binding.stage, &globs)
        })
        .collect::<Result<Vec<_>>>()?;

    let src = layout.src_dir();
    std::fs::create_dir_all(&src).with_context(|| format!("creating source root {src:?}"))?;

    spawn_watcher(
        layout.root(),
        src,
        profiles,
        rt_tx,
        Duration::from_millis(cfg.watch.debounce_ms),
    )
}

/// Ctrl-C → graceful shutdown.
fn spawn_ctrl_c(tx: mpsc::Sender<RuntimeEvent>) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            return;
        }
        info!("Ctrl+C received; shutting down");
        let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
    });
}

/// Project root: `--root`, else the config file's directory, else the
/// current working directory.
fn resolve_root(explicit: Option<&str>, config_path: Option<&Path>) -> PathBuf {
    if let Some(root) = explicit {
        return PathBuf::from(root);
    }
    match config_path.and_then(Path::parent) {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn log_summary(summary: &RunSummary) {
    for report in summary.reports() {
        if report.is_success() {
            info!("{report}");
        } else {
            error!("{report}");
        }
    }
}

fn print_tasks(registry: &TaskRegistry) {
    println!("tasks:");
    for desc in registry.descriptors() {
        let kind = match &desc.action {
            TaskAction::Stage(_) => "stage".to_string(),
            TaskAction::Watch(stage) => format!("watch {stage}"),
            TaskAction::Sequence(steps) => {
                let phases: Vec<String> = steps.iter().map(|s| s.tasks.join(" + ")).collect();
                format!("sequence [{}]", phases.join(" -> "))
            }
            TaskAction::Group => format!("group of {}", desc.dependencies.join(", ")),
        };
        println!("  - {:<15} {kind}", desc.name);
    }
}

/// Print the expanded plan without running anything.
fn print_dry_run(plan: &RunPlan, cfg: &ConfigFile, layout: &Layout) {
    println!("sitepipe dry-run: {}", plan.task);
    println!("  root = {:?}", layout.root());
    println!("  src  = {:?}", layout.src_dir());
    println!("  dist = {:?}", layout.dist_dir());
    println!();

    println!("stages ({}):", plan.nodes.len());
    for (name, node) in plan.nodes.iter() {
        println!("  - {name}");
        if !node.after.is_empty() {
            println!("      after: {:?}", node.after);
        }
        for claim in output_claims(node.stage, cfg) {
            println!("      writes: {claim}");
        }
    }

    if !plan.watches.is_empty() {
        println!();
        println!("watches ({}):", plan.watches.len());
        for binding in plan.watches.iter() {
            println!("  - {} -> {}", binding.task, binding.stage);
            for glob in binding_globs(binding.stage, cfg, layout) {
                println!("      glob: {glob}");
            }
        }
        println!("  on_overlap = {:?}", cfg.watch.on_overlap);
        println!("  debounce_ms = {}", cfg.watch.debounce_ms);
    }
}
