// src/stages/bump.rs

use std::path::{Path, PathBuf};

use semver::{BuildMetadata, Prerelease, Version};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::info;

use crate::config::{ConfigFile, Layout};
use crate::errors::{Result, SitepipeError};
use crate::stages::output::write_if_changed;
use crate::stages::source;
use crate::stages::{Stage, StageFuture};
use crate::types::{BumpLevel, StageKind};

/// Increments the `version` of each package metadata file.
///
/// The bumped files are written to the destination root, not back over the
/// sources.
#[derive(Debug, Clone)]
pub struct BumpStage {
    files: Vec<PathBuf>,
    out_dir: PathBuf,
    level: BumpLevel,
}

impl BumpStage {
    pub fn new(cfg: &ConfigFile, layout: &Layout) -> Self {
        Self {
            files: cfg.bump.files.iter().map(|f| layout.in_root(f)).collect(),
            out_dir: layout.dist_dir(),
            level: cfg.bump.level,
        }
    }

    async fn bump(&self) -> Result<usize> {
        let mut outputs = Vec::with_capacity(self.files.len());
        for path in self.files.iter() {
            let text = String::from_utf8_lossy(&source::read(path).await?).into_owned();
            let (bumped, from, to) = bump_manifest(path, &text, self.level)?;
            let name = path
                .file_name()
                .ok_or_else(|| SitepipeError::Config(format!("{path:?} is not a file")))?;
            info!(file = ?path, %from, %to, "bumped version");
            outputs.push((self.out_dir.join(name), bumped));
        }

        for (out, text) in outputs.iter() {
            write_if_changed(out, text.as_bytes()).await?;
        }
        Ok(outputs.len())
    }
}

impl Stage for BumpStage {
    fn kind(&self) -> StageKind {
        StageKind::Bump
    }

    fn run(&self) -> StageFuture<'_> {
        Box::pin(self.bump())
    }
}

/// Bump the `version` field of a JSON manifest, keeping key order, the
/// detected indentation and the trailing newline.
///
/// Returns the new text plus the old and new versions.
pub fn bump_manifest(path: &Path, text: &str, level: BumpLevel) -> Result<(String, Version, Version)> {
    let mut doc: Value = serde_json::from_str(text)?;

    let field = doc
        .get_mut("version")
        .ok_or_else(|| SitepipeError::Version {
            path: path.to_path_buf(),
            message: "missing \"version\" field".to_string(),
        })?;
    let current = field.as_str().ok_or_else(|| SitepipeError::Version {
        path: path.to_path_buf(),
        message: "\"version\" is not a string".to_string(),
    })?;
    let from = Version::parse(current.trim()).map_err(|e| SitepipeError::Version {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let to = increment(&from, level);
    *field = Value::String(to.to_string());

    let indent = detect_indent(text);
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    doc.serialize(&mut ser)?;

    let mut out = String::from_utf8_lossy(&buf).into_owned();
    if text.ends_with('\n') {
        out.push('\n');
    }
    Ok((out, from, to))
}

/// Semver increment: a prerelease is released at its own version when the
/// components below `level` are already zero.
pub fn increment(version: &Version, level: BumpLevel) -> Version {
    let pre = !version.pre.is_empty();
    let mut next = Version::new(version.major, version.minor, version.patch);
    match level {
        BumpLevel::Major => {
            if !(pre && version.minor == 0 && version.patch == 0) {
                next.major += 1;
            }
            next.minor = 0;
            next.patch = 0;
        }
        BumpLevel::Minor => {
            if !(pre && version.patch == 0) {
                next.minor += 1;
            }
            next.patch = 0;
        }
        BumpLevel::Patch => {
            if !pre {
                next.patch += 1;
            }
        }
    }
    next.pre = Prerelease::EMPTY;
    next.build = BuildMetadata::EMPTY;
    next
}

/// Leading whitespace of the first indented line; two spaces by default.
fn detect_indent(text: &str) -> String {
    text.lines()
        .skip(1)
        .find_map(|line| {
            let ws: String = line.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
            (!ws.is_empty() && ws.len() < line.len()).then_some(ws)
        })
        .unwrap_or_else(|| "  ".to_string())
}
