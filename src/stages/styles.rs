// src/stages/styles.rs

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::{ConfigFile, Layout};
use crate::errors::Result;
use crate::stages::output::{join_lines, line_count, min_name, write_if_changed};
use crate::stages::source;
use crate::stages::sourcemap::SourceMapBuilder;
use crate::stages::{Stage, StageFuture};
use crate::transform::{Asset, TransformChain};
use crate::types::StageKind;

/// Compiles, prefixes and minifies the top-level stylesheets into one
/// `.min` bundle with vendor stylesheets first.
#[derive(Debug, Clone)]
pub struct StylesStage {
    src_dir: PathBuf,
    css_dir: PathBuf,
    out_dir: PathBuf,
    output: String,
    vendor: Vec<(String, PathBuf)>,
    chain: TransformChain,
}

impl StylesStage {
    pub fn new(cfg: &ConfigFile, layout: &Layout, chain: TransformChain) -> Self {
        Self {
            src_dir: layout.src_dir(),
            css_dir: layout.css_src_dir(),
            out_dir: layout.css_dist_dir(),
            output: cfg.styles.output.clone(),
            vendor: cfg
                .styles
                .vendor
                .iter()
                .map(|v| (v.clone(), layout.in_src(v)))
                .collect(),
            chain,
        }
    }

    async fn build(&self) -> Result<usize> {
        let files = source::stylesheet_entries(&self.css_dir)?;
        if files.is_empty() {
            debug!(dir = ?self.css_dir, "no stylesheets; nothing to build");
            return Ok(0);
        }

        let name = min_name(&self.output);
        let mut map = SourceMapBuilder::new(name.clone());
        let mut parts = Vec::new();

        // Vendor stylesheets go first, unmapped.
        for (rel, path) in self.vendor.iter() {
            let bytes = source::read(path).await?;
            debug!(vendor = %rel, "prepending vendor stylesheet");
            map.skip_lines(line_count(&bytes));
            parts.push(bytes);
        }

        // Compile everything before writing anything.
        for file in files.iter() {
            let raw = source::read(&file.path).await?;
            let compiled = self.chain.apply(Asset::new(&file.path, raw.clone())).await?;
            let rel = file.path.strip_prefix(&self.src_dir).unwrap_or(&file.path);
            let idx = map.add_source(
                rel.to_string_lossy().replace('\\', "/"),
                String::from_utf8_lossy(&raw),
            );
            map.map_to_start(idx, line_count(&compiled.contents));
            parts.push(compiled.contents);
        }

        let mut css = join_lines(&parts);
        css.extend_from_slice(format!("\n/*# sourceMappingURL={name}.map */\n").as_bytes());

        write_if_changed(&self.out_dir.join(&name), &css).await?;
        write_if_changed(&self.out_dir.join(format!("{name}.map")), &map.to_json()?).await?;

        info!(sources = files.len(), output = %name, "styles compiled");
        Ok(2)
    }
}

impl Stage for StylesStage {
    fn kind(&self) -> StageKind {
        StageKind::Styles
    }

    fn run(&self) -> StageFuture<'_> {
        Box::pin(self.build())
    }
}
