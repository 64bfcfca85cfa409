// tests/stages_bump.rs

mod common;
use crate::common::{ConfigFileBuilder, SiteFixture, TestResult};

use std::path::Path;

use semver::Version;
use sitepipe::errors::SitepipeError;
use sitepipe::stages::StageOutcome;
use sitepipe::stages::bump::{bump_manifest, increment};
use sitepipe::types::{BumpLevel, StageKind};

const PACKAGE: &str = "{\n  \"name\": \"site\",\n  \"version\": \"1.2.3\",\n  \"private\": true\n}\n";

#[tokio::test]
async fn bumped_manifests_land_in_the_destination() -> TestResult {
    let site = SiteFixture::new()
        .file("package.json", PACKAGE)
        .file("bower.json", "{\"version\":\"0.9.0\",\"name\":\"site\"}");
    let cfg = ConfigFileBuilder::bare().build();

    let report = site.stages(&cfg).run(StageKind::Bump).await;
    assert_eq!(report.outcome, StageOutcome::Succeeded { files_written: 2 });

    assert_eq!(
        site.read("dist/package.json"),
        "{\n  \"name\": \"site\",\n  \"version\": \"1.2.4\",\n  \"private\": true\n}\n"
    );
    let bower: serde_json::Value = serde_json::from_str(&site.read("dist/bower.json"))?;
    assert_eq!(bower["version"], "0.9.1");
    assert_eq!(site.read("package.json"), PACKAGE);
    Ok(())
}

#[tokio::test]
async fn missing_manifest_fails_without_writing() -> TestResult {
    let site = SiteFixture::new().file("package.json", PACKAGE);
    let cfg = ConfigFileBuilder::bare().build();

    let report = site.stages(&cfg).run(StageKind::Bump).await;
    assert!(report.is_failure());
    assert!(!site.exists("dist/package.json"));
    Ok(())
}

#[test]
fn missing_or_invalid_version_is_an_error() {
    let path = Path::new("package.json");

    let err = bump_manifest(path, "{\"name\":\"x\"}", BumpLevel::Patch).unwrap_err();
    assert!(matches!(err, SitepipeError::Version { .. }), "{err}");

    let err = bump_manifest(path, "{\"version\":3}", BumpLevel::Patch).unwrap_err();
    assert!(matches!(err, SitepipeError::Version { .. }), "{err}");

    let err = bump_manifest(path, "{\"version\":\"one\"}", BumpLevel::Patch).unwrap_err();
    assert!(matches!(err, SitepipeError::Version { .. }), "{err}");

    let err = bump_manifest(path, "not json", BumpLevel::Patch).unwrap_err();
    assert!(matches!(err, SitepipeError::Json(_)), "{err}");
}

#[test]
fn indentation_and_key_order_are_kept() -> TestResult {
    let text = "{\n\t\"version\": \"2.0.0\",\n\t\"a\": 1\n}";
    let (out, from, to) = bump_manifest(Path::new("p.json"), text, BumpLevel::Minor)?;
    assert_eq!(from, Version::new(2, 0, 0));
    assert_eq!(to, Version::new(2, 1, 0));
    assert_eq!(out, "{\n\t\"version\": \"2.1.0\",\n\t\"a\": 1\n}");
    Ok(())
}

#[test]
fn increment_follows_semver_rules() -> TestResult {
    let cases = [
        ("1.2.3", BumpLevel::Patch, "1.2.4"),
        ("1.2.3", BumpLevel::Minor, "1.3.0"),
        ("1.2.3", BumpLevel::Major, "2.0.0"),
        ("1.2.3-beta.1", BumpLevel::Patch, "1.2.3"),
        ("1.2.0-rc.1", BumpLevel::Minor, "1.2.0"),
        ("1.2.3-rc.1", BumpLevel::Minor, "1.3.0"),
        ("2.0.0-alpha", BumpLevel::Major, "2.0.0"),
        ("1.2.3+build.7", BumpLevel::Patch, "1.2.4"),
    ];
    for (from, level, expected) in cases {
        let got = increment(&Version::parse(from)?, level);
        assert_eq!(got.to_string(), expected, "{from} at {level:?}");
    }
    Ok(())
}
