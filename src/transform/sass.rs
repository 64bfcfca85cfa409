// src/transform/sass.rs

use std::path::Path;

use grass::{Options, OutputStyle};

use crate::errors::SitepipeError;
use crate::transform::{Asset, Transform, TransformFuture};

/// Compiles SCSS to plain CSS with grass. `@import` and `@use` resolve
/// against the directory of the stylesheet being compiled.
#[derive(Debug, Clone, Copy, Default)]
pub struct SassCompiler;

impl SassCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl Transform for SassCompiler {
    fn name(&self) -> &str {
        "grass"
    }

    fn apply(&self, asset: Asset) -> TransformFuture<'_> {
        Box::pin(async move {
            let path = asset.path.clone();
            let source = asset.text();
            let file = path.clone();

            let result = tokio::task::spawn_blocking(move || compile_scss(&source, &file))
                .await
                .map_err(anyhow::Error::from)?;

            let css = result.map_err(|message| SitepipeError::Transform {
                tool: "grass".to_string(),
                path: path.clone(),
                message,
            })?;

            Ok(Asset::new(path, css))
        })
    }
}

/// Compile `source`, resolving imports next to `path`.
pub fn compile_scss(source: &str, path: &Path) -> std::result::Result<String, String> {
    let mut options = Options::default().style(OutputStyle::Expanded);
    if let Some(dir) = path.parent() {
        options = options.load_path(dir);
    }
    grass::from_string(source.to_string(), &options).map_err(|e| e.to_string())
}
