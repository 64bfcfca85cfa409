// src/stages/clean.rs

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::Layout;
use crate::errors::{Result, SitepipeError};
use crate::stages::{Stage, StageFuture};
use crate::types::StageKind;

/// Empties the destination root, keeping the root directory itself.
#[derive(Debug, Clone)]
pub struct CleanStage {
    dist: PathBuf,
}

impl CleanStage {
    pub fn new(layout: &Layout) -> Self {
        Self {
            dist: layout.dist_dir(),
        }
    }

    async fn clean(&self) -> Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.dist).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = ?self.dist, "destination does not exist; nothing to clean");
                return Ok(0);
            }
            Err(err) => return Err(SitepipeError::io(&self.dist, err)),
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SitepipeError::io(&self.dist, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| SitepipeError::io(&path, e))?;
            let result = if file_type.is_dir() {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };
            result.map_err(|e| SitepipeError::io(&path, e))?;
            removed += 1;
        }

        info!(dir = ?self.dist, removed, "cleaned destination");
        Ok(removed)
    }
}

impl Stage for CleanStage {
    fn kind(&self) -> StageKind {
        StageKind::Clean
    }

    fn run(&self) -> StageFuture<'_> {
        Box::pin(self.clean())
    }
}
