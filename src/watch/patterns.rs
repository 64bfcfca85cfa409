// src/watch/patterns.rs

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::config::{ConfigFile, Layout};
use crate::engine::TaskName;
use crate::types::StageKind;

/// Compiled glob patterns for one watch binding.
///
/// Patterns are relative to the project root; the watcher passes relative
/// paths such as `"app/css/main.scss"` into [`StageWatchProfile::matches`].
#[derive(Clone)]
pub struct StageWatchProfile {
    task: TaskName,
    stage: StageKind,
    watch_set: GlobSet,
}

impl fmt::Debug for StageWatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageWatchProfile")
            .field("task", &self.task)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

impl StageWatchProfile {
    pub fn new(stage: StageKind, globs: &[String]) -> Result<Self> {
        let watch_set = build_globset(globs)
            .with_context(|| format!("building watch globset for stage {stage}"))?;
        Ok(Self {
            task: stage.task_name().to_string(),
            stage,
            watch_set,
        })
    }

    /// Name of the task re-run when this profile matches.
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Returns true if the given root-relative path belongs to this binding.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.watch_set.is_match(rel_path)
    }
}

/// Root-relative globs a stage re-runs on.
///
/// Stages without watchable inputs (`clean`, `scss-lint`, `bump`) have none.
pub fn binding_globs(stage: StageKind, cfg: &ConfigFile, layout: &Layout) -> Vec<String> {
    let none = Path::new("");
    match stage {
        StageKind::Styles => vec![layout.src_glob(layout.css_rel(), "**/*.scss")],
        StageKind::Scripts => vec![layout.src_glob(layout.js_rel(), "**/*.js")],
        StageKind::Images => vec![layout.src_glob(
            none,
            &format!("**/{}", extension_glob(&cfg.images.extensions)),
        )],
        StageKind::Html => vec![layout.src_glob(none, "**/*.html")],
        StageKind::Static => cfg
            .static_files
            .globs
            .iter()
            .map(|g| layout.src_glob(none, g))
            .collect(),
        StageKind::Clean | StageKind::StyleLint | StageKind::Bump => Vec::new(),
    }
}

/// `*.png` for one extension, `*.{png,jpg}` for several.
pub fn extension_glob(extensions: &[String]) -> String {
    match extensions {
        [single] => format!("*.{single}"),
        many => format!("*.{{{}}}", many.join(",")),
    }
}

/// Build a GlobSet where `*` does not cross directory separators and `**`
/// spans any depth.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
