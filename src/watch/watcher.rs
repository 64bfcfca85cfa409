// src/watch/watcher.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TaskName, TriggerReason};
use crate::watch::patterns::StageWatchProfile;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive; dropping this handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher over `watch_dir` (recursively) and send one
/// `RuntimeEvent::TaskTriggered` per affected stage for every burst of
/// changes.
///
/// - `root` is the project root all binding globs are relative to.
/// - `watch_dir` is the directory actually observed (normally the source root).
/// - `debounce` is the quiet period that closes a burst.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    watch_dir: impl Into<PathBuf>,
    profiles: Vec<StageWatchProfile>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    debounce: Duration,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or(root);
    let watch_dir = watch_dir.into();
    let watch_dir = watch_dir.canonicalize().unwrap_or(watch_dir);

    let profiles = Arc::new(profiles);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("sitepipe: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("sitepipe: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher
        .watch(&watch_dir, RecursiveMode::Recursive)
        .with_context(|| format!("watching {:?}", watch_dir))?;

    info!(dir = ?watch_dir, bindings = profiles.len(), "file watcher started");

    tokio::spawn(async move {
        while let Some(first) = event_rx.recv().await {
            let mut tasks = BTreeSet::new();
            collect_event(&root, &first, &profiles, &mut tasks);

            // Fold everything arriving within the debounce window into
            // this burst.
            let deadline = Instant::now() + debounce;
            let mut closed = false;
            loop {
                match tokio::time::timeout_at(deadline, event_rx.recv()).await {
                    Ok(Some(event)) => collect_event(&root, &event, &profiles, &mut tasks),
                    Ok(None) => {
                        closed = true;
                        break;
                    }
                    Err(_elapsed) => break,
                }
            }

            for task in tasks {
                debug!(task = %task, "watch match -> triggering stage");
                if let Err(err) = runtime_tx
                    .send(RuntimeEvent::TaskTriggered {
                        task,
                        reason: TriggerReason::FileWatch,
                    })
                    .await
                {
                    warn!("failed to send RuntimeEvent::TaskTriggered: {err}");
                    return;
                }
            }

            if closed {
                break;
            }
        }

        debug!("file watcher loop ended");
    });

    Ok(WatcherHandle { _inner: watcher })
}

fn collect_event(
    root: &Path,
    event: &Event,
    profiles: &[StageWatchProfile],
    tasks: &mut BTreeSet<TaskName>,
) {
    if event.kind.is_access() {
        return;
    }
    debug!(?event, "received notify event");
    tasks.extend(tasks_for_paths(root, &event.paths, profiles));
}

/// Stage tasks whose bindings match any of the changed `paths`.
pub fn tasks_for_paths(
    root: &Path,
    paths: &[PathBuf],
    profiles: &[StageWatchProfile],
) -> BTreeSet<TaskName> {
    let mut tasks = BTreeSet::new();
    for path in paths {
        let Some(rel) = relative_str(root, path) else {
            warn!("could not relativize path {:?} against root {:?}", path, root);
            continue;
        };
        for profile in profiles {
            if profile.matches(&rel) {
                tasks.insert(profile.task().to_string());
            }
        }
    }
    tasks
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Relative input paths are taken as already root-relative.
fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = if path.is_absolute() {
        path.strip_prefix(root).ok()?
    } else {
        path
    };
    Some(rel.to_string_lossy().replace('\\', "/"))
}
