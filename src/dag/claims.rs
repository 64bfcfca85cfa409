// src/dag/claims.rs

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which files inside a claimed directory a stage may write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimFilter {
    Any,
    Extensions(BTreeSet<String>),
    Names(BTreeSet<String>),
}

impl ClaimFilter {
    pub fn extensions<I, S>(exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ClaimFilter::Extensions(exts.into_iter().map(Into::into).collect())
    }

    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ClaimFilter::Names(names.into_iter().map(Into::into).collect())
    }

    /// Could some file name satisfy both filters?
    pub fn intersects(&self, other: &ClaimFilter) -> bool {
        use ClaimFilter::*;
        match (self, other) {
            (Any, _) | (_, Any) => true,
            (Extensions(a), Extensions(b)) => !a.is_disjoint(b),
            (Names(a), Names(b)) => !a.is_disjoint(b),
            (Names(names), Extensions(exts)) | (Extensions(exts), Names(names)) => names
                .iter()
                .filter_map(|n| Path::new(n).extension())
                .any(|e| exts.contains(e.to_string_lossy().as_ref())),
        }
    }
}

/// A region of the destination tree a stage writes into.
///
/// `dir` is relative to the destination root; an empty path is the root
/// itself. Non-recursive claims only cover files directly inside `dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputClaim {
    pub dir: PathBuf,
    pub recursive: bool,
    pub filter: ClaimFilter,
}

impl OutputClaim {
    pub fn new(dir: impl Into<PathBuf>, recursive: bool, filter: ClaimFilter) -> Self {
        Self {
            dir: dir.into(),
            recursive,
            filter,
        }
    }

    /// The whole destination tree.
    pub fn everything() -> Self {
        Self::new(PathBuf::new(), true, ClaimFilter::Any)
    }

    pub fn overlaps(&self, other: &OutputClaim) -> bool {
        let same_files_possible = self.dir == other.dir
            || (self.recursive && other.dir.starts_with(&self.dir))
            || (other.recursive && self.dir.starts_with(&other.dir));
        same_files_possible && self.filter.intersects(&other.filter)
    }
}

impl fmt::Display for OutputClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = self.dir.to_string_lossy().replace('\\', "/");
        let dir = if dir.is_empty() { ".".to_string() } else { dir };
        let depth = if self.recursive { "/**" } else { "" };
        match &self.filter {
            ClaimFilter::Any => write!(f, "{dir}{depth}/*"),
            ClaimFilter::Extensions(exts) => {
                let exts: Vec<_> = exts.iter().map(String::as_str).collect();
                write!(f, "{dir}{depth}/*.{{{}}}", exts.join(","))
            }
            ClaimFilter::Names(names) => {
                let names: Vec<_> = names.iter().map(String::as_str).collect();
                write!(f, "{dir}{depth}/{{{}}}", names.join(","))
            }
        }
    }
}
