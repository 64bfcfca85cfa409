use sitepipe::errors::SitepipeError;
use sitepipe::transform::{Asset, Transform, TransformFuture};

/// Uppercases text content; stands in for a real compiler.
pub struct Uppercase;

impl Transform for Uppercase {
    fn name(&self) -> &str {
        "uppercase"
    }

    fn apply(&self, asset: Asset) -> TransformFuture<'_> {
        Box::pin(async move {
            let text = asset.text().to_uppercase();
            Ok(Asset::new(asset.path, text))
        })
    }
}

/// Fails for any file whose name contains `needle`, passes others through.
pub struct FailOn {
    pub needle: String,
}

impl FailOn {
    pub fn new(needle: &str) -> Self {
        Self {
            needle: needle.to_string(),
        }
    }
}

impl Transform for FailOn {
    fn name(&self) -> &str {
        "fail-on"
    }

    fn apply(&self, asset: Asset) -> TransformFuture<'_> {
        Box::pin(async move {
            if asset.path.to_string_lossy().contains(&self.needle) {
                return Err(SitepipeError::Transform {
                    tool: "fail-on".to_string(),
                    path: asset.path,
                    message: "injected failure".to_string(),
                });
            }
            Ok(asset)
        })
    }
}
