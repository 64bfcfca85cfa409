// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// The transformation stages known to the pipeline.
///
/// Each stage owns one task name (`styles`) and, when it has inputs worth
/// watching, one watch task name (`styles:watch`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageKind {
    Clean,
    StyleLint,
    Styles,
    Scripts,
    Images,
    Html,
    Static,
    Bump,
}

impl StageKind {
    pub const ALL: [StageKind; 8] = [
        StageKind::Clean,
        StageKind::StyleLint,
        StageKind::Styles,
        StageKind::Scripts,
        StageKind::Images,
        StageKind::Html,
        StageKind::Static,
        StageKind::Bump,
    ];

    /// Name of the task that runs this stage once.
    pub fn task_name(self) -> &'static str {
        match self {
            StageKind::Clean => "clean",
            StageKind::StyleLint => "scss-lint",
            StageKind::Styles => "styles",
            StageKind::Scripts => "scripts",
            StageKind::Images => "images",
            StageKind::Html => "html",
            StageKind::Static => "static",
            StageKind::Bump => "bump",
        }
    }

    /// Name of the task that binds a watcher to this stage, if any.
    pub fn watch_task_name(self) -> Option<&'static str> {
        match self {
            StageKind::Styles => Some("styles:watch"),
            StageKind::Scripts => Some("scripts:watch"),
            StageKind::Images => Some("images:watch"),
            StageKind::Html => Some("html:watch"),
            StageKind::Static => Some("static:watch"),
            StageKind::Clean | StageKind::StyleLint | StageKind::Bump => None,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.task_name())
    }
}

/// What to do when a watched stage is re-triggered while it is still running.
///
/// - `Coalesce`: keep at most one pending re-run per stage and start it once
///   the in-flight run completes (single-flight).
/// - `Overlap`: start another invocation immediately; the last writer wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    Coalesce,
    Overlap,
}

impl Default for OverlapPolicy {
    fn default() -> Self {
        OverlapPolicy::Coalesce
    }
}

impl FromStr for OverlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "coalesce" => Ok(OverlapPolicy::Coalesce),
            "overlap" => Ok(OverlapPolicy::Overlap),
            other => Err(format!(
                "invalid on_overlap: {other} (expected \"coalesce\" or \"overlap\")"
            )),
        }
    }
}

/// Which semver component the bump stage increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
    Major,
    Minor,
    Patch,
}

impl Default for BumpLevel {
    fn default() -> Self {
        BumpLevel::Patch
    }
}
