// tests/cli.rs

use clap::Parser;
use sitepipe::cli::{CliArgs, LogLevel};

#[test]
fn task_is_positional() {
    let args = CliArgs::try_parse_from(["sitepipe", "styles:watch"]).unwrap();
    assert_eq!(args.task.as_deref(), Some("styles:watch"));
    assert!(!args.dry_run);
    assert!(!args.tasks);
    assert!(args.config.is_none());
}

#[test]
fn flags_are_parsed() {
    let args = CliArgs::try_parse_from([
        "sitepipe",
        "build",
        "--config",
        "site/Sitepipe.toml",
        "--root",
        "site",
        "--log-level",
        "debug",
        "--dry-run",
    ])
    .unwrap();
    assert_eq!(args.config.as_deref(), Some("site/Sitepipe.toml"));
    assert_eq!(args.root.as_deref(), Some("site"));
    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    assert!(args.dry_run);
}

#[test]
fn task_list_needs_no_task() {
    let args = CliArgs::try_parse_from(["sitepipe", "--tasks"]).unwrap();
    assert!(args.tasks);
    assert!(args.task.is_none());
}

#[test]
fn a_task_is_required_otherwise() {
    assert!(CliArgs::try_parse_from(["sitepipe"]).is_err());
    assert!(CliArgs::try_parse_from(["sitepipe", "build", "--log-level", "loud"]).is_err());
}
