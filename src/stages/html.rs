// src/stages/html.rs

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::{ConfigFile, Layout, PartialSpec};
use crate::errors::{Result, SitepipeError};
use crate::stages::output::write_if_changed;
use crate::stages::source;
use crate::stages::{Stage, StageFuture};
use crate::types::StageKind;

/// Inlines the configured partials into every top-level HTML page.
#[derive(Debug, Clone)]
pub struct HtmlStage {
    src_dir: PathBuf,
    templates_dir: PathBuf,
    out_dir: PathBuf,
    partials: Vec<PartialSpec>,
}

impl HtmlStage {
    pub fn new(cfg: &ConfigFile, layout: &Layout) -> Self {
        Self {
            src_dir: layout.src_dir(),
            templates_dir: layout.templates_dir(),
            out_dir: layout.dist_dir(),
            partials: cfg.html.partials.clone(),
        }
    }

    /// Read every partial from disk, in declared order.
    async fn load_partials(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let mut loaded = Vec::with_capacity(self.partials.len());
        for partial in self.partials.iter() {
            let path = self.templates_dir.join(&partial.file);
            let text = match tokio::fs::read(&path).await {
                Ok(text) => text,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    return Err(SitepipeError::MissingTemplate {
                        marker: partial.marker.clone(),
                        path,
                    });
                }
                Err(err) => return Err(SitepipeError::io(path, err)),
            };
            loaded.push((partial.marker.clone(), text));
        }
        Ok(loaded)
    }

    async fn render(&self) -> Result<usize> {
        let pages = source::top_level_files(&self.src_dir, "html")?;
        if pages.is_empty() {
            debug!(dir = ?self.src_dir, "no html pages");
            return Ok(0);
        }

        let partials = self.load_partials().await?;

        let mut rendered = Vec::with_capacity(pages.len());
        for page in pages.iter() {
            let bytes = source::read(&page.path).await?;
            rendered.push((page, substitute(&bytes, &partials)));
        }

        for (page, html) in rendered.iter() {
            write_if_changed(&self.out_dir.join(&page.rel), html).await?;
        }

        info!(pages = rendered.len(), "html rendered");
        Ok(rendered.len())
    }
}

/// Replace every occurrence of each marker, one marker at a time in order.
///
/// Text inserted by an earlier partial is visible to later markers. Pages
/// and partials are handled as raw bytes, so content in other encodings
/// passes through untouched.
pub fn substitute(page: &[u8], partials: &[(String, Vec<u8>)]) -> Vec<u8> {
    partials.iter().fold(page.to_vec(), |acc, (marker, text)| {
        replace_all(&acc, marker.as_bytes(), text)
    })
}

fn replace_all(haystack: &[u8], needle: &[u8], with: &[u8]) -> Vec<u8> {
    if needle.is_empty() {
        return haystack.to_vec();
    }
    let mut out = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some(at) = rest.windows(needle.len()).position(|w| w == needle) {
        out.extend_from_slice(&rest[..at]);
        out.extend_from_slice(with);
        rest = &rest[at + needle.len()..];
    }
    out.extend_from_slice(rest);
    out
}

impl Stage for HtmlStage {
    fn kind(&self) -> StageKind {
        StageKind::Html
    }

    fn run(&self) -> StageFuture<'_> {
        Box::pin(self.render())
    }
}
