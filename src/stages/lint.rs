// src/stages/lint.rs

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::LazyLock;

use regex::Regex;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::{CommandSpec, ConfigFile, Layout};
use crate::errors::{Result, SitepipeError};
use crate::stages::source::{self, SourceFile};
use crate::stages::{Stage, StageFuture};
use crate::transform::sass::compile_scss;
use crate::types::StageKind;

/// `file:line[:col] [W] Rule: message`, as printed by scss-lint.
static FINDING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<file>[^:\s][^:]*):(?P<line>\d+)(?::\d+)?\s+\[(?P<severity>[A-Z])\]\s+(?P<message>.+)$",
    )
    .expect("lint finding regex is valid")
});

/// One advisory finding reported by the linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFinding {
    pub file: String,
    pub line: usize,
    pub severity: String,
    pub message: String,
}

/// Extract findings from linter output; other lines are ignored.
pub fn parse_lint_output(output: &str) -> Vec<LintFinding> {
    output
        .lines()
        .filter_map(|line| {
            let caps = FINDING_RE.captures(line.trim_end())?;
            Some(LintFinding {
                file: caps["file"].to_string(),
                line: caps["line"].parse().ok()?,
                severity: caps["severity"].to_string(),
                message: caps["message"].trim().to_string(),
            })
        })
        .collect()
}

/// Lints the top-level stylesheets. Findings are logged, never fatal.
#[derive(Debug, Clone)]
pub struct StyleLintStage {
    root: PathBuf,
    css_dir: PathBuf,
    linter: Option<CommandSpec>,
    rules: PathBuf,
}

impl StyleLintStage {
    pub fn new(cfg: &ConfigFile, layout: &Layout) -> Self {
        Self {
            root: layout.root().to_path_buf(),
            css_dir: layout.css_src_dir(),
            linter: cfg.styles.linter.clone(),
            rules: layout.in_root(&cfg.styles.lint_config),
        }
    }

    async fn lint(&self) -> Result<usize> {
        let files = source::stylesheet_entries(&self.css_dir)?;
        if files.is_empty() {
            debug!(dir = ?self.css_dir, "no stylesheets to lint");
            return Ok(0);
        }

        let findings = match &self.linter {
            Some(spec) => match self.run_linter(spec, &files).await? {
                Some(findings) => findings,
                None => self.syntax_check(&files).await?,
            },
            None => self.syntax_check(&files).await?,
        };

        for finding in findings.iter() {
            warn!(
                file = %finding.file,
                line = finding.line,
                severity = %finding.severity,
                "lint: {}",
                finding.message
            );
        }
        info!(files = files.len(), findings = findings.len(), "lint finished");
        Ok(0)
    }

    /// `None` when the linter program is not installed.
    async fn run_linter(
        &self,
        spec: &CommandSpec,
        files: &[SourceFile],
    ) -> Result<Option<Vec<LintFinding>>> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if self.rules.is_file() {
            cmd.arg("--config").arg(&self.rules);
        }
        cmd.args(files.iter().map(|f| &f.path));

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    program = %spec.program,
                    "linter not found; falling back to a syntax check"
                );
                return Ok(None);
            }
            Err(err) => {
                return Err(SitepipeError::Transform {
                    tool: spec.program.clone(),
                    path: self.css_dir.clone(),
                    message: format!("could not start: {err}"),
                });
            }
        };

        if !output.status.success() {
            debug!(program = %spec.program, status = %output.status, "linter reported problems");
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(Some(parse_lint_output(&stdout)))
    }

    async fn syntax_check(&self, files: &[SourceFile]) -> Result<Vec<LintFinding>> {
        let mut findings = Vec::new();
        for file in files {
            let text = String::from_utf8_lossy(&source::read(&file.path).await?).into_owned();
            let name = file.path.to_string_lossy().into_owned();
            if let Err(message) = compile_scss(&text, &file.path) {
                findings.push(LintFinding {
                    file: name,
                    line: 0,
                    severity: "E".to_string(),
                    message,
                });
            }
        }
        Ok(findings)
    }
}

impl Stage for StyleLintStage {
    fn kind(&self) -> StageKind {
        StageKind::StyleLint
    }

    fn run(&self) -> StageFuture<'_> {
        Box::pin(self.lint())
    }
}
