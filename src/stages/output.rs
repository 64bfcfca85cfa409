// src/stages/output.rs

//! Writing stage outputs.

use std::path::Path;

use tracing::debug;

use crate::errors::{Result, SitepipeError};

/// Write `contents` to `path`, creating parent directories.
///
/// Returns `false` without touching the file when it already holds exactly
/// these bytes, so re-runs keep modification times.
pub async fn write_if_changed(path: &Path, contents: &[u8]) -> Result<bool> {
    match tokio::fs::read(path).await {
        Ok(existing) if existing == contents => {
            debug!(file = ?path, "output unchanged; skipping write");
            return Ok(false);
        }
        _ => {}
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SitepipeError::io(parent, e))?;
    }
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| SitepipeError::io(path, e))?;
    debug!(file = ?path, bytes = contents.len(), "wrote output");
    Ok(true)
}

/// Insert `.min` before the extension: `style.css` -> `style.min.css`.
pub fn min_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}.min.{ext}"),
        _ => format!("{name}.min"),
    }
}

/// Join byte chunks with a single `\n`.
pub fn join_lines(parts: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(b'\n');
        }
        out.extend_from_slice(part);
    }
    out
}

/// Number of lines `bytes` occupies when followed by a `\n` separator.
pub fn line_count(bytes: &[u8]) -> usize {
    bytes.iter().filter(|b| **b == b'\n').count() + 1
}
