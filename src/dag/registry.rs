// src/dag/registry.rs

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::engine::TaskName;
use crate::errors::{Result, SitepipeError};
use crate::types::StageKind;

/// One phase of a [`TaskAction::Sequence`].
///
/// Tasks in a phase run concurrently. `ordered` lists `(before, after)`
/// pairs inside the phase that must not run at the same time because they
/// write overlapping outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub tasks: Vec<TaskName>,
    pub ordered: Vec<(TaskName, TaskName)>,
}

impl Step {
    pub fn single(task: &str) -> Self {
        Self::parallel(&[task])
    }

    pub fn parallel(tasks: &[&str]) -> Self {
        Self {
            tasks: tasks.iter().map(|t| t.to_string()).collect(),
            ordered: Vec::new(),
        }
    }

    /// Declare that `before` must finish before `after` starts.
    pub fn ordering(mut self, before: &str, after: &str) -> Self {
        self.ordered.push((before.to_string(), after.to_string()));
        self
    }
}

/// What a task does once its dependencies have completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    /// Run one transformation stage.
    Stage(StageKind),
    /// Bind a file watcher that re-runs the stage on every change.
    Watch(StageKind),
    /// Run phases one after another.
    Sequence(Vec<Step>),
    /// Nothing beyond the dependencies.
    Group,
}

/// A named task with dependencies and an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescriptor {
    pub name: TaskName,
    pub dependencies: Vec<TaskName>,
    pub action: TaskAction,
}

impl TaskDescriptor {
    pub fn new(name: &str, action: TaskAction) -> Self {
        Self {
            name: name.to_string(),
            dependencies: Vec::new(),
            action,
        }
    }

    pub fn depends_on(mut self, deps: &[&str]) -> Self {
        self.dependencies
            .extend(deps.iter().map(|d| d.to_string()));
        self
    }

    /// Every task this one refers to, through dependencies or phases.
    pub fn references(&self) -> Vec<&str> {
        let mut refs: Vec<&str> = self.dependencies.iter().map(String::as_str).collect();
        if let TaskAction::Sequence(steps) = &self.action {
            for step in steps {
                refs.extend(step.tasks.iter().map(String::as_str));
            }
        }
        refs
    }
}

/// The declared set of tasks.
#[derive(Debug, Clone)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskName, TaskDescriptor>,
}

impl TaskRegistry {
    /// Build a registry, rejecting unknown references and cycles.
    pub fn new(descriptors: Vec<TaskDescriptor>) -> Result<Self> {
        let registry = Self::from_descriptors(descriptors);
        registry.validate()?;
        Ok(registry)
    }

    /// The pipeline's built-in tasks.
    ///
    /// - one task per stage (`clean`, `styles`, ...)
    /// - one `<stage>:watch` task per watchable stage
    /// - `build`: `clean`, then the six asset stages concurrently
    /// - `dev`: all five watch bindings
    pub fn standard() -> Self {
        let mut descriptors = Vec::new();

        for stage in StageKind::ALL {
            descriptors.push(TaskDescriptor::new(
                stage.task_name(),
                TaskAction::Stage(stage),
            ));
            if let Some(watch) = stage.watch_task_name() {
                descriptors.push(TaskDescriptor::new(watch, TaskAction::Watch(stage)));
            }
        }

        // `images` and `static` both write below the image directory; the
        // optimized files must land last, in a build and under watch.
        descriptors.push(TaskDescriptor::new(
            "build",
            TaskAction::Sequence(vec![
                Step::single("clean"),
                Step::parallel(&["scripts", "scss-lint", "styles", "images", "html", "static"])
                    .ordering("static", "images"),
            ]),
        ));

        descriptors.push(TaskDescriptor::new(
            "dev",
            TaskAction::Sequence(vec![Step::parallel(&[
                "styles:watch",
                "scripts:watch",
                "images:watch",
                "html:watch",
                "static:watch",
            ])
            .ordering("static:watch", "images:watch")]),
        ));

        Self::from_descriptors(descriptors)
    }

    fn from_descriptors(descriptors: Vec<TaskDescriptor>) -> Self {
        let tasks = descriptors
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();
        Self { tasks }
    }

    pub fn get(&self, name: &str) -> Option<&TaskDescriptor> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// All task names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &TaskDescriptor> {
        self.tasks.values()
    }

    fn validate(&self) -> Result<()> {
        for desc in self.tasks.values() {
            for reference in desc.references() {
                if !self.tasks.contains_key(reference) {
                    return Err(SitepipeError::UnknownTask(format!(
                        "{reference} (referenced by '{}')",
                        desc.name
                    )));
                }
            }
            if let TaskAction::Sequence(steps) = &desc.action {
                for step in steps {
                    for (before, after) in step.ordered.iter() {
                        if !step.tasks.contains(before) || !step.tasks.contains(after) {
                            return Err(SitepipeError::Config(format!(
                                "task '{}' orders {before} -> {after} outside of one phase",
                                desc.name
                            )));
                        }
                    }
                }
            }
        }

        // Edge direction: referenced task -> referring task.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for name in self.tasks.keys() {
            graph.add_node(name.as_str());
        }
        for desc in self.tasks.values() {
            for reference in desc.references() {
                graph.add_edge(reference, desc.name.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => Err(SitepipeError::TaskCycle(cycle.node_id().to_string())),
        }
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
