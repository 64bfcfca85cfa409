// src/dag/mod.rs

//! Task graph, planning and scheduling.
//!
//! - [`registry`] declares the named tasks and how they relate.
//! - [`plan`] expands one task into a DAG of stage runs and watch bindings,
//!   and asserts that concurrent stages write disjoint outputs.
//! - [`claims`] describes which part of the destination a stage writes.
//! - [`graph`] is the adjacency view the scheduler walks.
//! - [`scheduler`] is the per-run state machine that decides which stages
//!   are ready to run.

pub mod claims;
pub mod graph;
pub mod plan;
pub mod registry;
pub mod scheduler;

pub use claims::{ClaimFilter, OutputClaim};
pub use graph::DagGraph;
pub use plan::{PlanNode, RunPlan, WatchBinding};
pub use registry::{Step, TaskAction, TaskDescriptor, TaskRegistry};
pub use scheduler::{ScheduledTask, Scheduler, SkippedTask, TaskRunState};
