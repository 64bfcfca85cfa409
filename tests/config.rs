// tests/config.rs

use std::error::Error;
use std::path::{Path, PathBuf};

use sitepipe::config::{
    CommandSpec, ConfigFile, Layout, PartialSpec, load_and_validate, load_from_path,
    validate_config,
};
use sitepipe::types::{BumpLevel, OverlapPolicy};

type TestResult = Result<(), Box<dyn Error>>;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

#[test]
fn defaults_match_the_conventional_layout() -> TestResult {
    let cfg = ConfigFile::default();
    validate_config(&cfg)?;

    assert_eq!(cfg.paths.dist, "./dist/");
    assert_eq!(cfg.paths.src, "./app/");
    assert_eq!(cfg.styles.output, "style.css");
    assert_eq!(cfg.scripts.output, "app.js");
    assert_eq!(
        cfg.scripts.vendor,
        ["js/vendor/jquery-2.1.4.min.js", "js/vendor/bootstrap.min.js"]
    );
    assert_eq!(cfg.html.partials.len(), 3);
    assert_eq!(cfg.html.partials[2], PartialSpec::new("<% buttons %>", "button.html"));
    assert_eq!(cfg.watch.on_overlap, OverlapPolicy::Coalesce);
    assert_eq!(cfg.watch.debounce_ms, 100);
    assert_eq!(cfg.bump.level, BumpLevel::Patch);

    let layout = Layout::from_config("/site", &cfg);
    assert_eq!(layout.css_src_dir(), Path::new("/site/app/css"));
    assert_eq!(layout.js_dist_dir(), Path::new("/site/dist/js"));
    assert_eq!(layout.templates_dir(), Path::new("/site/app/templates"));
    Ok(())
}

#[test]
fn empty_file_yields_defaults() -> TestResult {
    let cfg: ConfigFile = toml::from_str("")?;
    assert_eq!(cfg.paths.src, ConfigFile::default().paths.src);
    assert_eq!(cfg.static_files.globs, ["images/**/*", "fonts/**/*"]);
    Ok(())
}

#[test]
fn fixture_config_loads_every_section() -> TestResult {
    let cfg = load_and_validate(fixture("Sitepipe.toml"))?;

    assert_eq!(cfg.paths.dist, "./public/");
    assert_eq!(cfg.styles.output, "main.css");
    assert_eq!(cfg.styles.browsers, ["last 2 versions", "> 1%"]);
    assert_eq!(
        cfg.styles.compiler,
        Some(CommandSpec::new("sass", &["--stdin", "--no-source-map"]))
    );
    assert_eq!(cfg.scripts.minifier.as_ref().map(|m| m.program.as_str()), Some("uglifyjs"));
    assert_eq!(cfg.images.png_level, 4);
    assert_eq!(cfg.html.partials.len(), 2);
    assert_eq!(cfg.static_files.globs.len(), 3);
    assert_eq!(cfg.bump.level, BumpLevel::Minor);
    assert_eq!(cfg.watch.on_overlap, OverlapPolicy::Overlap);
    assert_eq!(cfg.watch.debounce_ms, 250);
    // Unset keys keep their defaults.
    assert_eq!(cfg.styles.linter, Some(CommandSpec::new("scss-lint", &[])));

    let layout = Layout::from_config("/p", &cfg);
    assert_eq!(layout.css_dist_dir(), Path::new("/p/public/styles"));
    Ok(())
}

#[test]
fn missing_file_is_an_error() {
    assert!(load_from_path(fixture("does-not-exist.toml")).is_err());
}

#[test]
fn dist_containing_src_is_rejected() {
    let mut cfg = ConfigFile::default();
    cfg.paths.dist = "./".to_string();
    assert!(validate_config(&cfg).is_err());

    cfg.paths.dist = "./build".to_string();
    cfg.paths.src = "build/app".to_string();
    let err = validate_config(&cfg).unwrap_err();
    assert!(err.to_string().contains("clean"), "{err}");
}

#[test]
fn png_level_is_bounded() {
    let mut cfg = ConfigFile::default();
    cfg.images.png_level = 7;
    assert!(validate_config(&cfg).is_err());
}

#[test]
fn output_names_must_be_plain_file_names() {
    let mut cfg = ConfigFile::default();
    cfg.styles.output = "css/style.css".to_string();
    assert!(validate_config(&cfg).is_err());
}

#[test]
fn invalid_static_glob_is_rejected() {
    let mut cfg = ConfigFile::default();
    cfg.static_files.globs = vec!["fonts/[".to_string()];
    assert!(validate_config(&cfg).is_err());
}

#[test]
fn unknown_overlap_policy_fails_to_parse() {
    let parsed: Result<ConfigFile, _> = toml::from_str("[watch]\non_overlap = \"sometimes\"\n");
    assert!(parsed.is_err());
    assert_eq!("Overlap".parse::<OverlapPolicy>(), Ok(OverlapPolicy::Overlap));
}
