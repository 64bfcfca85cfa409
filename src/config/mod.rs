// src/config/mod.rs

//! Configuration loading and validation for sitepipe.
//!
//! - `model.rs` is the TOML-backed data model with defaults.
//! - `layout.rs` resolves the path registry against a project root.
//! - `loader.rs` reads a config file (or falls back to defaults).
//! - `validate.rs` checks invariants the stages rely on.

pub mod layout;
pub mod loader;
pub mod model;
pub mod validate;

pub use layout::{Layout, clean_relative, join_glob};
pub use loader::{load_and_validate, load_from_path, load_or_default, DEFAULT_CONFIG_FILE};
pub use model::{
    BumpSection, CommandSpec, ConfigFile, HtmlSection, ImagesSection, PartialSpec, PathConfig,
    ScriptsSection, StaticSection, StylesSection, WatchSection,
};
pub use validate::validate_config;
