// tests/watcher.rs

mod common;
use crate::common::{SiteFixture, TestResult, init_tracing, with_timeout};

use std::time::Duration;

use sitepipe::config::ConfigFile;
use sitepipe::engine::{RuntimeEvent, TriggerReason};
use sitepipe::types::StageKind;
use sitepipe::watch::{StageWatchProfile, binding_globs, spawn_watcher};
use tokio::sync::mpsc;

const DEBOUNCE: Duration = Duration::from_millis(200);

fn dev_profiles(site: &SiteFixture, cfg: &ConfigFile) -> Vec<StageWatchProfile> {
    let layout = site.layout(cfg);
    [
        StageKind::Styles,
        StageKind::Scripts,
        StageKind::Images,
        StageKind::Html,
        StageKind::Static,
    ]
    .into_iter()
    .map(|stage| StageWatchProfile::new(stage, &binding_globs(stage, cfg, &layout)).unwrap())
    .collect()
}

#[tokio::test]
async fn burst_of_script_edits_triggers_scripts_once() -> TestResult {
    init_tracing();

    let site = SiteFixture::new().file("app/js/main.js", "main();");
    let cfg = ConfigFile::default();
    let (tx, mut rx) = mpsc::channel::<RuntimeEvent>(16);

    let _handle = spawn_watcher(
        site.root(),
        site.path("app"),
        dev_profiles(&site, &cfg),
        tx,
        DEBOUNCE,
    )?;

    site.write("app/js/a.js", b"a();");
    site.write("app/js/b.js", b"b();");
    site.write("app/js/main.js", b"main(1);");

    let first = with_timeout(rx.recv()).await;
    match first {
        Some(RuntimeEvent::TaskTriggered { task, reason }) => {
            assert_eq!(task, "scripts");
            assert_eq!(reason, TriggerReason::FileWatch);
        }
        other => panic!("expected a scripts trigger, got {other:?}"),
    }

    // The whole burst folded into that one trigger.
    let extra = tokio::time::timeout(DEBOUNCE * 3, rx.recv()).await;
    assert!(extra.is_err(), "unexpected second event: {extra:?}");
    Ok(())
}

#[tokio::test]
async fn unrelated_files_trigger_nothing() -> TestResult {
    let site = SiteFixture::new().file("app/notes.txt", "draft");
    let cfg = ConfigFile::default();
    let (tx, mut rx) = mpsc::channel::<RuntimeEvent>(16);

    let _handle = spawn_watcher(
        site.root(),
        site.path("app"),
        dev_profiles(&site, &cfg),
        tx,
        DEBOUNCE,
    )?;

    site.write("app/notes.txt", b"final");

    let event = tokio::time::timeout(DEBOUNCE * 3, rx.recv()).await;
    assert!(event.is_err(), "unexpected event: {event:?}");
    Ok(())
}
