// src/stages/images.rs

use std::path::PathBuf;

use anyhow::anyhow;
use tracing::{error, info};

use crate::config::{ConfigFile, Layout, clean_relative};
use crate::errors::Result;
use crate::stages::output::write_if_changed;
use crate::stages::source;
use crate::stages::{Stage, StageFuture};
use crate::transform::{Asset, TransformChain};
use crate::types::StageKind;
use crate::watch::extension_glob;

/// Optimizes every image below the image directory into the same relative
/// path under the destination.
///
/// A file that fails to optimize is skipped; the others are still written
/// and the stage then fails naming the skipped files.
#[derive(Debug, Clone)]
pub struct ImagesStage {
    in_dir: PathBuf,
    out_dir: PathBuf,
    pattern: String,
    chain: TransformChain,
}

impl ImagesStage {
    pub fn new(cfg: &ConfigFile, layout: &Layout, chain: TransformChain) -> Self {
        let dir = clean_relative(&cfg.images.dir);
        Self {
            in_dir: layout.src_dir().join(&dir),
            out_dir: layout.dist_dir().join(&dir),
            pattern: format!("**/{}", extension_glob(&cfg.images.extensions)),
            chain,
        }
    }

    async fn optimize(&self) -> Result<usize> {
        let files = source::matching_files(&self.in_dir, std::slice::from_ref(&self.pattern))?;

        let mut written = 0;
        let mut failed = Vec::new();
        for file in files.iter() {
            let result = async {
                let bytes = source::read(&file.path).await?;
                let optimized = self.chain.apply(Asset::new(&file.path, bytes)).await?;
                write_if_changed(&self.out_dir.join(&file.rel), &optimized.contents).await
            }
            .await;

            match result {
                Ok(_) => written += 1,
                Err(err) => {
                    error!(file = ?file.path, error = %err, "image optimization failed; skipping");
                    failed.push(file.rel_str());
                }
            }
        }

        info!(optimized = written, failed = failed.len(), "images processed");
        if failed.is_empty() {
            Ok(written)
        } else {
            Err(anyhow!("{} image(s) failed: {}", failed.len(), failed.join(", ")).into())
        }
    }
}

impl Stage for ImagesStage {
    fn kind(&self) -> StageKind {
        StageKind::Images
    }

    fn run(&self) -> StageFuture<'_> {
        Box::pin(self.optimize())
    }
}
