// src/config/validate.rs

use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::config::layout::clean_relative;
use crate::config::model::ConfigFile;
use crate::watch::patterns::build_globset;

/// Run semantic validation against a loaded configuration.
///
/// This checks:
/// - `paths.dist` and `paths.src` are set, and `clean` cannot reach sources
/// - output names are plain file names
/// - glob patterns compile
/// - browsers, image extensions and partial markers are non-empty
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_paths(cfg)?;
    validate_outputs(cfg)?;
    validate_globs(cfg)?;
    validate_lists(cfg)?;
    Ok(())
}

fn validate_paths(cfg: &ConfigFile) -> Result<()> {
    let dist = clean_relative(&cfg.paths.dist);
    let src = clean_relative(&cfg.paths.src);

    if dist.as_os_str().is_empty() {
        return Err(anyhow!(
            "[paths].dist must name a directory below the project root"
        ));
    }
    if src.as_os_str().is_empty() {
        return Err(anyhow!("[paths].src must not be empty"));
    }
    if src.starts_with(&dist) {
        return Err(anyhow!(
            "[paths].dist ({:?}) must not contain [paths].src ({:?}); `clean` would delete sources",
            cfg.paths.dist,
            cfg.paths.src
        ));
    }
    Ok(())
}

fn validate_outputs(cfg: &ConfigFile) -> Result<()> {
    for (section, name) in [
        ("styles", cfg.styles.output.as_str()),
        ("scripts", cfg.scripts.output.as_str()),
    ] {
        let p = Path::new(name);
        if name.is_empty() || p.components().count() != 1 || p.file_name().is_none() {
            return Err(anyhow!(
                "[{section}].output must be a plain file name (got {name:?})"
            ));
        }
    }
    Ok(())
}

fn validate_globs(cfg: &ConfigFile) -> Result<()> {
    build_globset(&cfg.static_files.globs).context("invalid [static].globs")?;
    Ok(())
}

fn validate_lists(cfg: &ConfigFile) -> Result<()> {
    if cfg.styles.browsers.is_empty() {
        return Err(anyhow!("[styles].browsers must not be empty"));
    }
    if cfg.images.extensions.iter().any(|e| e.trim().is_empty()) || cfg.images.extensions.is_empty()
    {
        return Err(anyhow!("[images].extensions must list at least one extension"));
    }
    if cfg.images.png_level > 6 {
        return Err(anyhow!(
            "[images].png_level must be between 0 and 6 (got {})",
            cfg.images.png_level
        ));
    }
    for partial in cfg.html.partials.iter() {
        if partial.marker.is_empty() {
            return Err(anyhow!("[html].partials entries need a non-empty marker"));
        }
        if partial.file.is_empty() {
            return Err(anyhow!(
                "[html].partials entry for {:?} needs a file",
                partial.marker
            ));
        }
    }
    Ok(())
}
