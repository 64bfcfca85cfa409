// tests/stages_html.rs

mod common;
use crate::common::{ConfigFileBuilder, SiteFixture, TestResult, init_tracing};

use sitepipe::stages::StageOutcome;
use sitepipe::stages::html::substitute;
use sitepipe::types::StageKind;

fn header_footer() -> sitepipe::config::ConfigFile {
    ConfigFileBuilder::bare()
        .partials(&[("<% header %>", "header.html"), ("<% footer %>", "footer.html")])
        .build()
}

#[tokio::test]
async fn partials_are_inlined() -> TestResult {
    init_tracing();

    let site = SiteFixture::new()
        .file("app/index.html", "<html><% header %>BODY<% footer %></html>")
        .file("app/templates/header.html", "H")
        .file("app/templates/footer.html", "F");
    let cfg = header_footer();

    let report = site.stages(&cfg).run(StageKind::Html).await;
    assert!(report.is_success(), "{report}");
    assert_eq!(site.read("dist/index.html"), "<html>HBODYF</html>");
    Ok(())
}

#[tokio::test]
async fn every_occurrence_is_replaced_in_every_page() -> TestResult {
    let site = SiteFixture::new()
        .file("app/a.html", "<% header %>|<% header %>")
        .file("app/b.html", "<% footer %>")
        .file("app/nested/skip.html", "<% header %>")
        .file("app/templates/header.html", "H")
        .file("app/templates/footer.html", "F");
    let cfg = header_footer();

    let report = site.stages(&cfg).run(StageKind::Html).await;
    assert_eq!(report.outcome, StageOutcome::Succeeded { files_written: 2 });
    assert_eq!(site.read("dist/a.html"), "H|H");
    assert_eq!(site.read("dist/b.html"), "F");
    assert!(!site.exists("dist/nested/skip.html"));
    Ok(())
}

#[test]
fn substitution_order_matters() {
    let partials = vec![
        ("<% header %>".to_string(), b"[<% footer %>]".to_vec()),
        ("<% footer %>".to_string(), b"F".to_vec()),
    ];
    // Markers introduced by an earlier partial are expanded by later ones.
    assert_eq!(substitute(b"<% header %>", &partials), b"[F]");

    let reversed: Vec<_> = partials.into_iter().rev().collect();
    assert_eq!(substitute(b"<% header %>", &reversed), b"[<% footer %>]");
}

#[tokio::test]
async fn non_utf8_bytes_survive_substitution() -> TestResult {
    // Latin-1 "café" around the marker, and in the partial.
    let site = SiteFixture::new()
        .bytes("app/index.html", b"caf\xe9 <% header %> caf\xe9")
        .bytes("app/templates/header.html", b"\xa9 2024")
        .file("app/templates/footer.html", "");
    let cfg = header_footer();

    let report = site.stages(&cfg).run(StageKind::Html).await;
    assert!(report.is_success(), "{report}");
    assert_eq!(
        site.read_bytes("dist/index.html"),
        b"caf\xe9 \xa9 2024 caf\xe9"
    );
    Ok(())
}

#[tokio::test]
async fn missing_partial_fails_and_writes_nothing() -> TestResult {
    let site = SiteFixture::new()
        .file("app/index.html", "<% header %><% footer %>")
        .file("app/templates/header.html", "H");
    let cfg = header_footer();

    let report = site.stages(&cfg).run(StageKind::Html).await;
    match &report.outcome {
        StageOutcome::Failed { error } => {
            assert!(error.contains("<% footer %>"), "{error}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(!site.exists("dist/index.html"));
    Ok(())
}

#[tokio::test]
async fn partials_are_read_fresh_on_every_run() -> TestResult {
    let site = SiteFixture::new()
        .file("app/index.html", "<% header %>")
        .file("app/templates/header.html", "v1")
        .file("app/templates/footer.html", "");
    let cfg = header_footer();
    let stages = site.stages(&cfg);

    assert!(stages.run(StageKind::Html).await.is_success());
    assert_eq!(site.read("dist/index.html"), "v1");

    site.write("app/templates/header.html", b"v2");
    assert!(stages.run(StageKind::Html).await.is_success());
    assert_eq!(site.read("dist/index.html"), "v2");
    Ok(())
}

#[tokio::test]
async fn no_pages_means_partials_are_not_required() -> TestResult {
    let site = SiteFixture::new();
    let cfg = ConfigFileBuilder::bare().build();

    let report = site.stages(&cfg).run(StageKind::Html).await;
    assert_eq!(report.outcome, StageOutcome::Succeeded { files_written: 0 });
    Ok(())
}
