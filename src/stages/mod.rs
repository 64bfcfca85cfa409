// src/stages/mod.rs

//! The transformation stages.
//!
//! Each stage reads its sources below the source root, runs them through
//! its transformation chain and writes below the destination root. Stages
//! are built once per invocation from the configuration and the resolved
//! [`Layout`]; running one always produces a [`StageReport`].

pub mod bump;
pub mod clean;
pub mod html;
pub mod images;
pub mod lint;
pub mod output;
pub mod report;
pub mod scripts;
pub mod source;
pub mod sourcemap;
pub mod static_copy;
pub mod styles;

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;

use tracing::error;

use crate::config::{ConfigFile, Layout, clean_relative};
use crate::dag::{ClaimFilter, OutputClaim};
use crate::errors::Result;
use crate::transform::Toolchain;
use crate::types::StageKind;

pub use bump::BumpStage;
pub use clean::CleanStage;
pub use html::HtmlStage;
pub use images::ImagesStage;
pub use lint::{LintFinding, StyleLintStage, parse_lint_output};
pub use report::{RunSummary, StageOutcome, StageReport};
pub use scripts::ScriptsStage;
pub use static_copy::StaticStage;
pub use styles::StylesStage;

/// Boxed future returned by [`Stage::run`]; resolves to the number of
/// output files produced.
pub type StageFuture<'a> = Pin<Box<dyn Future<Output = Result<usize>> + Send + 'a>>;

/// One transformation stage.
pub trait Stage: Send + Sync {
    fn kind(&self) -> StageKind;

    fn run(&self) -> StageFuture<'_>;
}

/// All stages of one invocation, shared by the executor.
pub struct StageSet {
    stages: BTreeMap<StageKind, Box<dyn Stage>>,
}

impl std::fmt::Debug for StageSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageSet")
            .field("stages", &self.stages.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl StageSet {
    pub fn from_config(cfg: &ConfigFile, layout: &Layout, toolchain: Toolchain) -> Self {
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(CleanStage::new(layout)),
            Box::new(StyleLintStage::new(cfg, layout)),
            Box::new(StylesStage::new(cfg, layout, toolchain.styles)),
            Box::new(ScriptsStage::new(cfg, layout, toolchain.scripts)),
            Box::new(ImagesStage::new(cfg, layout, toolchain.images)),
            Box::new(HtmlStage::new(cfg, layout)),
            Box::new(StaticStage::new(cfg, layout)),
            Box::new(BumpStage::new(cfg, layout)),
        ];
        Self::from_stages(stages)
    }

    pub fn from_stages(stages: Vec<Box<dyn Stage>>) -> Self {
        Self {
            stages: stages.into_iter().map(|s| (s.kind(), s)).collect(),
        }
    }

    /// Run one stage, turning any error into a failed report.
    pub async fn run(&self, kind: StageKind) -> StageReport {
        let Some(stage) = self.stages.get(&kind) else {
            error!(stage = %kind, "no stage registered");
            return StageReport::failed(kind, "no stage registered");
        };
        match stage.run().await {
            Ok(files_written) => StageReport::succeeded(kind, files_written),
            Err(err) => {
                error!(stage = %kind, error = %err, "stage failed");
                StageReport::failed(kind, err)
            }
        }
    }
}

/// The part of the destination tree `stage` writes, relative to the
/// destination root.
pub fn output_claims(stage: StageKind, cfg: &ConfigFile) -> Vec<OutputClaim> {
    match stage {
        StageKind::Clean => vec![OutputClaim::everything()],
        StageKind::StyleLint => Vec::new(),
        StageKind::Styles => vec![named_outputs(&cfg.paths.css, &cfg.styles.output)],
        StageKind::Scripts => vec![named_outputs(&cfg.paths.js, &cfg.scripts.output)],
        StageKind::Images => vec![OutputClaim::new(
            clean_relative(&cfg.images.dir),
            true,
            ClaimFilter::extensions(cfg.images.extensions.iter().cloned()),
        )],
        StageKind::Html => vec![OutputClaim::new(
            PathBuf::new(),
            false,
            ClaimFilter::extensions(["html"]),
        )],
        StageKind::Static => cfg
            .static_files
            .globs
            .iter()
            .map(|g| glob_claim(g))
            .collect(),
        StageKind::Bump => vec![OutputClaim::new(
            PathBuf::new(),
            false,
            ClaimFilter::names(
                cfg.bump
                    .files
                    .iter()
                    .filter_map(|f| Path::new(f).file_name())
                    .map(|n| n.to_string_lossy().into_owned()),
            ),
        )],
    }
}

fn named_outputs(dir: &str, output: &str) -> OutputClaim {
    let min = output::min_name(output);
    let map = format!("{min}.map");
    OutputClaim::new(clean_relative(dir), false, ClaimFilter::names([min, map]))
}

/// Claim covering everything a static glob could copy: the literal
/// directory prefix, recursive if anything below it is a pattern.
fn glob_claim(glob: &str) -> OutputClaim {
    let parts: Vec<String> = clean_relative(glob)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let split = parts
        .iter()
        .position(|p| p.contains(['*', '?', '[', '{']))
        .unwrap_or(parts.len());
    let dir: PathBuf = parts[..split].iter().collect();

    match &parts[split..] {
        // A literal file path.
        [] => {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let parent = dir.parent().map(Path::to_path_buf).unwrap_or_default();
            OutputClaim::new(parent, false, ClaimFilter::names([name]))
        }
        [single] if !single.contains("**") => OutputClaim::new(dir, false, ClaimFilter::Any),
        _ => OutputClaim::new(dir, true, ClaimFilter::Any),
    }
}
