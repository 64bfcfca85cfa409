// src/transform/mod.rs

//! Content transformations applied by the stages.
//!
//! A [`Transform`] maps one in-memory [`Asset`] to another. Stages never
//! look inside a transformation; they only run a [`TransformChain`] built
//! by the [`Toolchain`].

pub mod command;
pub mod css;
pub mod js;
pub mod png;
pub mod sass;
pub mod toolchain;

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use crate::errors::Result;

pub use command::CommandTransform;
pub use css::CssOptimizer;
pub use js::JsMinifier;
pub use png::PngOptimizer;
pub use sass::SassCompiler;
pub use toolchain::Toolchain;

/// Boxed future returned by [`Transform::apply`].
pub type TransformFuture<'a> = Pin<Box<dyn Future<Output = Result<Asset>> + Send + 'a>>;

/// A file moving through a pipeline: where it came from and its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl Asset {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// Contents as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.contents).into_owned()
    }
}

/// An opaque content transformation (compiler, prefixer, minifier,
/// optimizer).
pub trait Transform: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    fn apply(&self, asset: Asset) -> TransformFuture<'_>;
}

/// Transformations applied in order; an empty chain is the identity.
#[derive(Clone, Default)]
pub struct TransformChain {
    steps: Vec<Arc<dyn Transform>>,
}

impl fmt::Debug for TransformChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|s| s.name()))
            .finish()
    }
}

impl TransformChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, step: impl Transform + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub async fn apply(&self, mut asset: Asset) -> Result<Asset> {
        for step in self.steps.iter() {
            asset = step.apply(asset).await?;
        }
        Ok(asset)
    }
}
