// src/stages/scripts.rs

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

/// Concatenates the top-level scripts, minifies the bundle and prepends the
/// vendor scripts in their declared order.
#[derive(Debug, Clone)]
pub struct ScriptsStage {
    src_dir: PathBuf,
    js_dir: PathBuf,
    out_dir: PathBuf,
    output: String,
    vendor: Vec<(String, PathBuf)>,
    chain: TransformChain,
}

impl ScriptsStage {
    pub fn new(cfg: &ConfigFile, layout: &Layout, chain: TransformChain) -> Self {
        Self {
            src_dir: layout.src_dir(),
            js_dir: layout.js_src_dir(),
            out_dir: layout.js_dist_dir(),
            output: cfg.scripts.output.clone(),
            vendor: cfg
                .scripts
                .vendor
                .iter()
                .map(|v| (v.clone(), layout.in_src(v)))
                .collect(),
            chain,
        }
    }

    async fn build(&self) -> Result<usize> {
        let files = source::top_level_files(&self.js_dir, "js")?;
        if files.is_empty() {
            debug!(dir = ?self.js_dir, "no scripts; nothing to bundle");
            return Ok(0);
        }

        let name = min_name(&self.output);
        let mut map = SourceMapBuilder::new(name.clone());

        let mut sources = Vec::with_capacity(files.len());
        for file in files.iter() {
            sources.push(source::read(&file.path).await?);
        }
        let bundle = self
            .chain
            .apply(Asset::new(self.js_dir.join(&self.output), join_lines(&sources)))
            .await?;

        let mut parts = Vec::new();
        for (rel, path) in self.vendor.iter() {
            let bytes = source::read(path).await?;
            debug!(vendor = %rel, "prepending vendor script");
            map.skip_lines(line_count(&bytes));
            parts.push(bytes);
        }

        let indices: Vec<usize> = files
            .iter()
            .zip(sources.iter())
            .map(|(file, raw)| {
                let rel = file.path.strip_prefix(&self.src_dir).unwrap_or(&file.path);
                map.add_source(
                    rel.to_string_lossy().replace('\\', "/"),
                    String::from_utf8_lossy(raw),
                )
            })
            .collect();

        if self.chain.is_empty() {
            // Untransformed bundle: generated lines follow the sources.
            for (idx, raw) in indices.iter().zip(sources.iter()) {
                map.map_lines(*idx, 0, line_count(raw));
            }
        } else if let Some(first) = indices.first() {
            map.map_to_start(*first, line_count(&bundle.contents));
        }
        parts.push(bundle.contents);

        let mut js = join_lines(&parts);
        js.extend_from_slice(format!("\n//# sourceMappingURL={name}.map\n").as_bytes());

        write_if_changed(&self.out_dir.join(&name), &js).await?;
        write_if_changed(&self.out_dir.join(format!("{name}.map")), &map.to_json()?).await?;

        info!(sources = files.len(), output = %name, "scripts bundled");
        Ok(2)
    }
}

impl Stage for ScriptsStage {
    fn kind(&self) -> StageKind {
        StageKind::Scripts
    }

    fn run(&self) -> StageFuture<'_> {
        Box::pin(self.build())
    }
}
