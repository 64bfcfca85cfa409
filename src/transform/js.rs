// src/transform/js.rs

use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::errors::SitepipeError;
use crate::transform::{Asset, Transform, TransformFuture};

/// Minifies a script bundle in-process with oxc: dead code is compressed
/// away, locals are mangled, comments and whitespace are dropped.
///
/// Sources are parsed as classic scripts, so top-level names stay global.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsMinifier;

impl JsMinifier {
    pub fn new() -> Self {
        Self
    }
}

impl Transform for JsMinifier {
    fn name(&self) -> &str {
        "oxc"
    }

    fn apply(&self, asset: Asset) -> TransformFuture<'_> {
        Box::pin(async move {
            let path = asset.path.clone();
            let source = asset.text();

            let result = tokio::task::spawn_blocking(move || minify_js(&source))
                .await
                .map_err(anyhow::Error::from)?;

            let code = result.map_err(|message| SitepipeError::Transform {
                tool: "oxc".to_string(),
                path: path.clone(),
                message,
            })?;

            Ok(Asset::new(path, code))
        })
    }
}

/// Parse `source` as a script and print it minified.
pub fn minify_js(source: &str) -> std::result::Result<String, String> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if let Some(first) = parsed.errors.first() {
        return Err(first.to_string());
    }

    let mut program = parsed.program;
    let minified = Minifier::new(MinifierOptions::default()).build(&allocator, &mut program);

    let printed = Codegen::new()
        .with_options(CodegenOptions::minify())
        .with_scoping(minified.scoping)
        .build(&program);
    Ok(printed.code)
}
