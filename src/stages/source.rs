// src/stages/source.rs

//! Source enumeration shared by the stages.

use std::path::{Path, PathBuf};

use globset::GlobSet;
use walkdir::WalkDir;

use crate::errors::{Result, SitepipeError};
use crate::watch::build_globset;

/// A source file and its path relative to the walked base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub rel: PathBuf,
}

impl SourceFile {
    /// Relative path with forward slashes, as used in globs and source maps.
    pub fn rel_str(&self) -> String {
        self.rel.to_string_lossy().replace('\\', "/")
    }
}

/// Files below `base` whose base-relative path matches `globs`, sorted by
/// path so enumeration order is deterministic.
///
/// A missing `base` yields no files.
pub fn matching_files(base: &Path, globs: &[String]) -> Result<Vec<SourceFile>> {
    let set = build_globset(globs)?;
    walk_matching(base, &set)
}

/// Files directly inside `dir` with the given extension, sorted by name.
pub fn top_level_files(dir: &Path, extension: &str) -> Result<Vec<SourceFile>> {
    matching_files(dir, &[format!("*.{extension}")])
}

/// Top-level `.scss` files that are compiled on their own. Partials
/// (`_name.scss`) only enter the bundle through `@import` or `@use`.
pub fn stylesheet_entries(dir: &Path) -> Result<Vec<SourceFile>> {
    let mut files = top_level_files(dir, "scss")?;
    files.retain(|f| !f.rel_str().starts_with('_'));
    Ok(files)
}

fn walk_matching(base: &Path, set: &GlobSet) -> Result<Vec<SourceFile>> {
    if !base.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(base).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(base).to_path_buf();
            match e.into_io_error() {
                Some(io) => SitepipeError::io(path, io),
                None => SitepipeError::Config(format!("filesystem loop at {path:?}")),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(base) else {
            continue;
        };
        let rel_str = rel.to_string_lossy().replace('\\', "/");
        if set.is_match(&rel_str) {
            files.push(SourceFile {
                path: entry.path().to_path_buf(),
                rel: rel.to_path_buf(),
            });
        }
    }
    files.sort_by(|a, b| a.rel.cmp(&b.rel));
    Ok(files)
}

/// Read a file, attaching its path to any error.
pub async fn read(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| SitepipeError::io(path, e))
}
