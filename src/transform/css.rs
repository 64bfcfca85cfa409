// src/transform/css.rs

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use crate::errors::SitepipeError;
use crate::transform::{Asset, Transform, TransformFuture};

/// Vendor-prefixes for a browserslist query and minifies, using
/// lightningcss on the blocking pool.
#[derive(Debug, Clone)]
pub struct CssOptimizer {
    browsers: Vec<String>,
}

impl CssOptimizer {
    pub fn new(browsers: Vec<String>) -> Self {
        Self { browsers }
    }
}

impl Transform for CssOptimizer {
    fn name(&self) -> &str {
        "lightningcss"
    }

    fn apply(&self, asset: Asset) -> TransformFuture<'_> {
        let browsers = self.browsers.clone();
        Box::pin(async move {
            let path = asset.path.clone();
            let source = asset.text();
            let filename = path.to_string_lossy().into_owned();

            let result =
                tokio::task::spawn_blocking(move || optimize_css(&source, &filename, &browsers))
                    .await
                    .map_err(anyhow::Error::from)?;

            let code = result.map_err(|message| SitepipeError::Transform {
                tool: "lightningcss".to_string(),
                path: path.clone(),
                message,
            })?;

            Ok(Asset::new(path, code))
        })
    }
}

/// Parse, prefix for `browsers` and print minified.
pub fn optimize_css(
    source: &str,
    filename: &str,
    browsers: &[String],
) -> std::result::Result<String, String> {
    let browsers = Browsers::from_browserslist(browsers.iter().map(String::as_str))
        .map_err(|e| format!("invalid browser query: {e}"))?;
    let targets = Targets {
        browsers,
        ..Targets::default()
    };

    let mut sheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: filename.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| e.to_string())?;

    sheet
        .minify(MinifyOptions {
            targets: targets.clone(),
            ..MinifyOptions::default()
        })
        .map_err(|e| e.to_string())?;

    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;

    Ok(printed.code)
}
