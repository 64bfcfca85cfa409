// tests/stages_lint.rs

mod common;
use crate::common::{ConfigFileBuilder, SiteFixture, TestResult, init_tracing};

use sitepipe::config::CommandSpec;
use sitepipe::stages::{LintFinding, StageOutcome, parse_lint_output};
use sitepipe::types::StageKind;

#[test]
fn findings_are_parsed_from_linter_output() {
    let output = "\
app/css/main.scss:3:5 [W] Indentation: Line should be indented 2 spaces
app/css/main.scss:10 [E] Syntax Error: Invalid CSS
Some unrelated banner line
";
    let findings = parse_lint_output(output);
    assert_eq!(
        findings,
        vec![
            LintFinding {
                file: "app/css/main.scss".to_string(),
                line: 3,
                severity: "W".to_string(),
                message: "Indentation: Line should be indented 2 spaces".to_string(),
            },
            LintFinding {
                file: "app/css/main.scss".to_string(),
                line: 10,
                severity: "E".to_string(),
                message: "Syntax Error: Invalid CSS".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn missing_linter_falls_back_and_never_fails() -> TestResult {
    init_tracing();

    let site = SiteFixture::new().file("app/css/main.scss", ".a { color: ; }}}");
    let mut cfg = ConfigFileBuilder::bare().build();
    cfg.styles.linter = Some(CommandSpec::new("sitepipe-no-such-linter", &[]));

    let report = site.stages(&cfg).run(StageKind::StyleLint).await;
    assert_eq!(report.outcome, StageOutcome::Succeeded { files_written: 0 });
    assert!(!site.exists("dist"));
    Ok(())
}

#[tokio::test]
async fn no_stylesheets_means_nothing_to_lint() -> TestResult {
    let site = SiteFixture::new();
    let cfg = ConfigFileBuilder::new().build();

    let report = site.stages(&cfg).run(StageKind::StyleLint).await;
    assert!(report.is_success(), "{report}");
    Ok(())
}

#[test]
fn partials_are_not_lint_entries() -> TestResult {
    let site = SiteFixture::new()
        .file("app/css/_vars.scss", ".partial{color:red}")
        .file("app/css/main.scss", "@import 'vars';")
        .file("app/css/print.scss", "");

    let entries: Vec<String> = sitepipe::stages::source::stylesheet_entries(&site.path("app/css"))?
        .iter()
        .map(|f| f.rel_str())
        .collect();
    assert_eq!(entries, ["main.scss", "print.scss"]);
    Ok(())
}

#[tokio::test]
async fn fallback_check_accepts_scss_with_imports() -> TestResult {
    let site = SiteFixture::new()
        .file("app/css/_vars.scss", "$accent: red;")
        .file("app/css/main.scss", "@import 'vars';\n.a { color: $accent; }\n");
    let mut cfg = ConfigFileBuilder::bare().build();
    cfg.styles.linter = Some(CommandSpec::new("sitepipe-no-such-linter", &[]));

    let report = site.stages(&cfg).run(StageKind::StyleLint).await;
    assert!(report.is_success(), "{report}");
    Ok(())
}
