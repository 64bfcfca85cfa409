// src/transform/png.rs

use oxipng::{Options, optimize_from_memory};
use tracing::debug;

use crate::errors::SitepipeError;
use crate::transform::{Asset, Transform, TransformFuture};

/// Lossless PNG recompression with oxipng. Anything that is not a PNG
/// passes through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct PngOptimizer {
    level: u8,
}

impl PngOptimizer {
    pub fn new(level: u8) -> Self {
        Self { level }
    }
}

impl Transform for PngOptimizer {
    fn name(&self) -> &str {
        "oxipng"
    }

    fn apply(&self, asset: Asset) -> TransformFuture<'_> {
        let level = self.level;
        Box::pin(async move {
            if !is_png(&asset) {
                return Ok(asset);
            }

            let path = asset.path.clone();
            let input = asset.contents;
            let before = input.len();

            let result = tokio::task::spawn_blocking(move || {
                optimize_from_memory(&input, &Options::from_preset(level))
            })
            .await
            .map_err(anyhow::Error::from)?;

            let optimized = result.map_err(|e| SitepipeError::Transform {
                tool: "oxipng".to_string(),
                path: path.clone(),
                message: e.to_string(),
            })?;

            debug!(file = ?path, before, after = optimized.len(), "optimized png");
            Ok(Asset::new(path, optimized))
        })
    }
}

fn is_png(asset: &Asset) -> bool {
    asset
        .path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}
