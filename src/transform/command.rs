// src/transform/command.rs

use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::CommandSpec;
use crate::errors::SitepipeError;
use crate::transform::{Asset, Transform, TransformFuture};

/// Pipes the asset through an external program: contents on stdin, result
/// on stdout. A non-zero exit fails the transformation with its stderr.
#[derive(Debug, Clone)]
pub struct CommandTransform {
    name: String,
    spec: CommandSpec,
    current_dir: Option<PathBuf>,
}

impl CommandTransform {
    pub fn new(spec: CommandSpec) -> Self {
        Self {
            name: spec.program.clone(),
            spec,
            current_dir: None,
        }
    }

    /// Run the program from `dir` (normally the project root).
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    async fn run(&self, asset: Asset) -> crate::errors::Result<Asset> {
        let mut cmd = Command::new(&self.spec.program);
        cmd.args(&self.spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }

        debug!(program = %self.spec.program, file = ?asset.path, "running external transform");

        let mut child = cmd.spawn().map_err(|e| SitepipeError::Transform {
            tool: self.name.clone(),
            path: asset.path.clone(),
            message: format!("could not start: {e}"),
        })?;

        // Feed stdin from a separate task so a program that writes before
        // reading everything cannot deadlock us.
        if let Some(mut stdin) = child.stdin.take() {
            let input = asset.contents;
            tokio::spawn(async move {
                if let Err(err) = stdin.write_all(&input).await {
                    debug!("external transform closed stdin early: {err}");
                }
            });
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SitepipeError::io(&asset.path, e))?;

        if !output.status.success() {
            return Err(SitepipeError::Transform {
                tool: self.name.clone(),
                path: asset.path,
                message: format!(
                    "exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(Asset {
            path: asset.path,
            contents: output.stdout,
        })
    }
}

impl Transform for CommandTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, asset: Asset) -> TransformFuture<'_> {
        Box::pin(self.run(asset))
    }
}
