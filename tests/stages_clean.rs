// tests/stages_clean.rs

mod common;
use crate::common::{ConfigFileBuilder, SiteFixture, TestResult};

use sitepipe::types::StageKind;

#[tokio::test]
async fn clean_empties_the_destination_only() -> TestResult {
    let site = SiteFixture::new()
        .file("dist/index.html", "old")
        .file("dist/css/style.min.css", "old")
        .file("app/index.html", "source");
    let cfg = ConfigFileBuilder::bare().build();

    let report = site.stages(&cfg).run(StageKind::Clean).await;
    assert!(report.is_success(), "{report}");
    assert!(site.exists("dist"));
    assert!(!site.exists("dist/index.html"));
    assert!(!site.exists("dist/css"));
    assert_eq!(site.read("app/index.html"), "source");
    Ok(())
}

#[tokio::test]
async fn missing_destination_is_fine() -> TestResult {
    let site = SiteFixture::new();
    let cfg = ConfigFileBuilder::bare().build();

    let report = site.stages(&cfg).run(StageKind::Clean).await;
    assert!(report.is_success(), "{report}");
    assert!(!site.exists("dist"));
    Ok(())
}
