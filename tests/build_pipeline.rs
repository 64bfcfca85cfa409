// tests/build_pipeline.rs

mod common;
use crate::common::{
    ConfigFileBuilder, SiteFixture, TestResult, identity_toolchain, init_tracing, with_timeout,
};

use sitepipe::dag::TaskRegistry;
use sitepipe::errors::SitepipeError;
use sitepipe::types::StageKind;
use sitepipe::{execute, plan_task};

fn full_site() -> SiteFixture {
    SiteFixture::new()
        .file("app/index.html", "<% header %><main/><% footer %>")
        .file("app/templates/header.html", "<header/>")
        .file("app/templates/footer.html", "<footer/>")
        .file("app/css/main.scss", ".a { color: red; }")
        .file("app/js/main.js", "main();")
        .file("app/images/logo.svg", "<svg/>")
        .file("app/fonts/a.woff", "font")
        .file("dist/stale.txt", "left over")
}

fn site_config() -> sitepipe::config::ConfigFile {
    ConfigFileBuilder::bare()
        .partials(&[("<% header %>", "header.html"), ("<% footer %>", "footer.html")])
        .build()
}

#[tokio::test]
async fn build_produces_every_output() -> TestResult {
    init_tracing();

    let site = full_site();
    let cfg = site_config();
    let plan = plan_task(&TaskRegistry::standard(), "build", &cfg)?;

    let summary = with_timeout(execute(&plan, &cfg, &site.layout(&cfg), identity_toolchain())).await?;
    assert!(!summary.has_failures(), "{:?}", summary.failed_stages());
    assert_eq!(summary.len(), 7);
    assert_eq!(summary.runs_of(StageKind::Clean), 1);

    assert!(!site.exists("dist/stale.txt"));
    assert_eq!(site.read("dist/index.html"), "<header/><main/><footer/>");
    assert!(site.exists("dist/css/style.min.css"));
    assert!(site.exists("dist/css/style.min.css.map"));
    assert!(site.exists("dist/js/app.min.js"));
    assert_eq!(site.read("dist/images/logo.svg"), "<svg/>");
    assert_eq!(site.read("dist/fonts/a.woff"), "font");
    Ok(())
}

#[tokio::test]
async fn rebuilding_an_unchanged_tree_gives_identical_bytes() -> TestResult {
    let site = full_site();
    let cfg = site_config();
    let plan = plan_task(&TaskRegistry::standard(), "build", &cfg)?;
    let layout = site.layout(&cfg);

    let outputs = [
        "dist/index.html",
        "dist/css/style.min.css",
        "dist/css/style.min.css.map",
        "dist/js/app.min.js",
        "dist/js/app.min.js.map",
        "dist/images/logo.svg",
    ];

    with_timeout(execute(&plan, &cfg, &layout, identity_toolchain())).await?;
    let first: Vec<Vec<u8>> = outputs.iter().map(|o| site.read_bytes(o)).collect();

    with_timeout(execute(&plan, &cfg, &layout, identity_toolchain())).await?;
    let second: Vec<Vec<u8>> = outputs.iter().map(|o| site.read_bytes(o)).collect();

    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn empty_tree_builds_successfully() -> TestResult {
    let site = SiteFixture::new();
    let cfg = ConfigFileBuilder::new().no_linter().build();
    let plan = plan_task(&TaskRegistry::standard(), "build", &cfg)?;

    let summary = with_timeout(execute(&plan, &cfg, &site.layout(&cfg), identity_toolchain())).await?;
    assert!(!summary.has_failures(), "{:?}", summary.failed_stages());
    Ok(())
}

#[tokio::test]
async fn failing_stage_is_reported_and_siblings_still_run() -> TestResult {
    let site = full_site();
    std::fs::remove_file(site.path("app/templates/footer.html"))?;
    let cfg = site_config();
    let plan = plan_task(&TaskRegistry::standard(), "build", &cfg)?;

    let summary = with_timeout(execute(&plan, &cfg, &site.layout(&cfg), identity_toolchain())).await?;
    assert_eq!(summary.failed_stages(), ["html".to_string()]);
    assert!(site.exists("dist/js/app.min.js"));
    assert!(!site.exists("dist/index.html"));
    Ok(())
}

#[test]
fn unknown_task_is_rejected_before_running() {
    let cfg = site_config();
    let err = plan_task(&TaskRegistry::standard(), "deploy", &cfg).unwrap_err();
    assert!(matches!(err, SitepipeError::UnknownTask(name) if name == "deploy"));
}
