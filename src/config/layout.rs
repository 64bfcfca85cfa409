// src/config/layout.rs

use std::path::{Component, Path, PathBuf};

use crate::config::model::{ConfigFile, PathConfig};

/// The path registry resolved against a project root.
///
/// Built once per invocation and handed to every stage; nothing reads paths
/// from ambient state. Each directory is kept root-relative (for glob
/// construction) and can be resolved to a concrete path on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
    src: PathBuf,
    dist: PathBuf,
    css: PathBuf,
    js: PathBuf,
    templates: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>, paths: &PathConfig) -> Self {
        Self {
            root: root.into(),
            src: clean_relative(&paths.src),
            dist: clean_relative(&paths.dist),
            css: clean_relative(&paths.css),
            js: clean_relative(&paths.js),
            templates: clean_relative(&paths.templates),
        }
    }

    pub fn from_config(root: impl Into<PathBuf>, cfg: &ConfigFile) -> Self {
        Self::new(root, &cfg.paths)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source root (`{root}/{src}`).
    pub fn src_dir(&self) -> PathBuf {
        self.root.join(&self.src)
    }

    /// Destination root (`{root}/{dist}`).
    pub fn dist_dir(&self) -> PathBuf {
        self.root.join(&self.dist)
    }

    pub fn css_src_dir(&self) -> PathBuf {
        self.src_dir().join(&self.css)
    }

    pub fn js_src_dir(&self) -> PathBuf {
        self.src_dir().join(&self.js)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.src_dir().join(&self.templates)
    }

    pub fn css_dist_dir(&self) -> PathBuf {
        self.dist_dir().join(&self.css)
    }

    pub fn js_dist_dir(&self) -> PathBuf {
        self.dist_dir().join(&self.js)
    }

    /// A file or directory under the source root.
    pub fn in_src(&self, rel: &str) -> PathBuf {
        self.src_dir().join(clean_relative(rel))
    }

    /// A file or directory under the project root.
    pub fn in_root(&self, rel: &str) -> PathBuf {
        self.root.join(clean_relative(rel))
    }

    pub fn css_rel(&self) -> &Path {
        &self.css
    }

    pub fn js_rel(&self) -> &Path {
        &self.js
    }

    /// Build a root-relative glob below `src`, e.g. `app/css/**/*.scss`.
    pub fn src_glob(&self, sub: &Path, pattern: &str) -> String {
        join_glob(&self.src.join(sub), pattern)
    }
}

/// Strip `.` components so `./app/` and `app` name the same directory.
pub fn clean_relative(p: &str) -> PathBuf {
    Path::new(p)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Join a directory and a glob pattern using forward slashes.
pub fn join_glob(dir: &Path, pattern: &str) -> String {
    let dir = dir.to_string_lossy().replace('\\', "/");
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        pattern.to_string()
    } else {
        format!("{dir}/{pattern}")
    }
}
