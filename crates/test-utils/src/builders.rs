#![allow(dead_code)]

use std::path::{Path, PathBuf};

use sitepipe::config::{ConfigFile, Layout, PartialSpec};
use sitepipe::stages::StageSet;
use sitepipe::transform::{Toolchain, TransformChain};
use tempfile::TempDir;

/// A throwaway project tree for stage and pipeline tests.
///
/// Paths given to the helpers are relative to the project root, so with the
/// default layout sources live below `app/` and outputs below `dist/`.
pub struct SiteFixture {
    dir: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn file(self, rel: &str, contents: &str) -> Self {
        self.bytes(rel, contents.as_bytes())
    }

    pub fn bytes(self, rel: &str, contents: &[u8]) -> Self {
        self.write(rel, contents);
        self
    }

    pub fn write(&self, rel: &str, contents: &[u8]) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, contents).expect("write fixture file");
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel))
            .unwrap_or_else(|e| panic!("reading {rel}: {e}"))
    }

    pub fn read_bytes(&self, rel: &str) -> Vec<u8> {
        std::fs::read(self.path(rel)).unwrap_or_else(|e| panic!("reading {rel}: {e}"))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    pub fn layout(&self, cfg: &ConfigFile) -> Layout {
        Layout::from_config(self.root(), cfg)
    }

    /// Stages built with the default toolchain for `cfg`.
    pub fn stages(&self, cfg: &ConfigFile) -> StageSet {
        let layout = self.layout(cfg);
        StageSet::from_config(cfg, &layout, Toolchain::from_config(cfg, &layout))
    }

    /// Stages built with a custom toolchain.
    pub fn stages_with(&self, cfg: &ConfigFile, toolchain: Toolchain) -> StageSet {
        StageSet::from_config(cfg, &self.layout(cfg), toolchain)
    }
}

impl Default for SiteFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ConfigFile`, starting from the built-in defaults.
pub struct ConfigFileBuilder {
    config: ConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: ConfigFile::default(),
        }
    }

    /// No vendor files and no external linter, so a fixture only needs the
    /// files a test cares about.
    pub fn bare() -> Self {
        Self::new().style_vendor(&[]).script_vendor(&[]).no_linter()
    }

    pub fn style_vendor(mut self, files: &[&str]) -> Self {
        self.config.styles.vendor = files.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn script_vendor(mut self, files: &[&str]) -> Self {
        self.config.scripts.vendor = files.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn no_linter(mut self) -> Self {
        self.config.styles.linter = None;
        self
    }

    pub fn partials(mut self, partials: &[(&str, &str)]) -> Self {
        self.config.html.partials = partials
            .iter()
            .map(|(marker, file)| PartialSpec::new(marker, file))
            .collect();
        self
    }

    pub fn static_globs(mut self, globs: &[&str]) -> Self {
        self.config.static_files.globs = globs.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn bump_files(mut self, files: &[&str]) -> Self {
        self.config.bump.files = files.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn build(self) -> ConfigFile {
        sitepipe::config::validate_config(&self.config).expect("builder produced invalid config");
        self.config
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A toolchain whose chains are all the identity.
pub fn identity_toolchain() -> Toolchain {
    Toolchain {
        styles: TransformChain::new(),
        scripts: TransformChain::new(),
        images: TransformChain::new(),
    }
}
