// src/transform/toolchain.rs

use crate::config::{ConfigFile, Layout};
use crate::transform::{
    CommandTransform, CssOptimizer, JsMinifier, PngOptimizer, SassCompiler, TransformChain,
};

/// The transformation chains of every stage, assembled from configuration.
///
/// Fields are public so callers (and tests) can replace a chain before the
/// stages are built.
#[derive(Debug, Clone, Default)]
pub struct Toolchain {
    /// Applied to each stylesheet before concatenation.
    pub styles: TransformChain,
    /// Applied to the concatenated script bundle.
    pub scripts: TransformChain,
    /// Applied to each image.
    pub images: TransformChain,
}

impl Toolchain {
    pub fn from_config(cfg: &ConfigFile, layout: &Layout) -> Self {
        let external = |spec: &crate::config::CommandSpec| {
            CommandTransform::new(spec.clone()).with_current_dir(layout.root())
        };

        let styles = match &cfg.styles.compiler {
            Some(compiler) => TransformChain::new().then(external(compiler)),
            None => TransformChain::new().then(SassCompiler::new()),
        }
        .then(CssOptimizer::new(cfg.styles.browsers.clone()));

        let scripts = match &cfg.scripts.minifier {
            Some(minifier) => TransformChain::new().then(external(minifier)),
            None => TransformChain::new().then(JsMinifier::new()),
        };

        let images = match &cfg.images.optimizer {
            Some(optimizer) => TransformChain::new().then(external(optimizer)),
            None => TransformChain::new().then(PngOptimizer::new(cfg.images.png_level)),
        };

        Self {
            styles,
            scripts,
            images,
        }
    }
}
