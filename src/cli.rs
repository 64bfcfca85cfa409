// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `sitepipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sitepipe",
    version,
    about = "Build, optimize and watch the assets of a static site.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run (e.g. `build`, `dev`, `styles`, `styles:watch`).
    #[arg(value_name = "TASK", required_unless_present = "tasks")]
    pub task: Option<String>,

    /// Path to the config file (TOML).
    ///
    /// When omitted, `Sitepipe.toml` is used if present, otherwise the
    /// built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Project root that all configured paths are relative to.
    ///
    /// Defaults to the directory of the config file, or the current
    /// working directory.
    #[arg(long, value_name = "DIR")]
    pub root: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SITEPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Expand the task into its execution plan and print it without running.
    #[arg(long)]
    pub dry_run: bool,

    /// List the registered tasks and exit.
    #[arg(long)]
    pub tasks: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
