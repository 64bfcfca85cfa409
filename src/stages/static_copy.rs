// src/stages/static_copy.rs

use std::path::PathBuf;

use tracing::info;

use crate::config::{ConfigFile, Layout};
use crate::errors::Result;
use crate::stages::output::write_if_changed;
use crate::stages::source;
use crate::stages::{Stage, StageFuture};
use crate::types::StageKind;

/// Copies the files matched by the static globs byte for byte.
#[derive(Debug, Clone)]
pub struct StaticStage {
    src_dir: PathBuf,
    out_dir: PathBuf,
    globs: Vec<String>,
}

impl StaticStage {
    pub fn new(cfg: &ConfigFile, layout: &Layout) -> Self {
        Self {
            src_dir: layout.src_dir(),
            out_dir: layout.dist_dir(),
            globs: cfg.static_files.globs.clone(),
        }
    }

    async fn copy(&self) -> Result<usize> {
        let files = source::matching_files(&self.src_dir, &self.globs)?;
        for file in files.iter() {
            let bytes = source::read(&file.path).await?;
            write_if_changed(&self.out_dir.join(&file.rel), &bytes).await?;
        }
        info!(files = files.len(), "static files copied");
        Ok(files.len())
    }
}

impl Stage for StaticStage {
    fn kind(&self) -> StageKind {
        StageKind::Static
    }

    fn run(&self) -> StageFuture<'_> {
        Box::pin(self.copy())
    }
}
