// src/watch/mod.rs

//! File watching for `dev` and the `*:watch` tasks.
//!
//! This module compiles each watch binding's globs, wires up a
//! cross-platform filesystem watcher (`notify`), and turns debounced bursts
//! of changes into stage triggers. It knows nothing about the task graph.

pub mod patterns;
pub mod watcher;

pub use patterns::{binding_globs, build_globset, extension_glob, StageWatchProfile};
pub use watcher::{spawn_watcher, tasks_for_paths, WatcherHandle};
