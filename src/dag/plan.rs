// src/dag/plan.rs

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::claims::OutputClaim;
use crate::dag::registry::{TaskAction, TaskRegistry};
use crate::engine::TaskName;
use crate::errors::{Result, SitepipeError};
use crate::types::StageKind;

/// A stage execution inside a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanNode {
    pub stage: StageKind,
    /// Stage nodes that must succeed before this one starts.
    pub after: Vec<TaskName>,
}

/// A watch binding requested by the plan: re-run `stage` whenever its
/// inputs change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchBinding {
    /// The `<stage>:watch` task that asked for the binding.
    pub task: TaskName,
    pub stage: StageKind,
    /// Watched stages that must not run while this one does; a change
    /// affecting both runs them in this order.
    pub after: Vec<TaskName>,
}

/// Fully expanded execution plan for one requested task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub task: TaskName,
    pub nodes: BTreeMap<TaskName, PlanNode>,
    pub watches: Vec<WatchBinding>,
}

impl RunPlan {
    /// Nothing to execute and nothing to watch.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.watches.is_empty()
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.after.as_slice())
            .unwrap_or(&[])
    }

    /// Every stage the scheduler must know about: the plan nodes plus the
    /// stages bound to watchers, with the ordering declared between them.
    pub fn schedulable(&self) -> Vec<(TaskName, StageKind, Vec<TaskName>)> {
        let mut out: Vec<(TaskName, StageKind, Vec<TaskName>)> = self
            .nodes
            .iter()
            .map(|(name, node)| (name.clone(), node.stage, node.after.clone()))
            .collect();
        for binding in self.watches.iter() {
            let name = binding.stage.task_name();
            match out.iter_mut().find(|(n, _, _)| n == name) {
                Some((_, _, after)) => {
                    for dep in binding.after.iter() {
                        if !after.contains(dep) {
                            after.push(dep.clone());
                        }
                    }
                }
                None => out.push((name.to_string(), binding.stage, binding.after.clone())),
            }
        }
        out
    }

    /// Nodes with no dependencies inside the plan.
    pub fn roots(&self) -> Vec<TaskName> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.after.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Assert that the plan is acyclic and that every pair of stages allowed
    /// to run concurrently writes disjoint outputs. Watch-bound stages count;
    /// two of them may fire from the same burst of changes.
    ///
    /// `claims_of` describes where each stage writes.
    pub fn check_disjoint_outputs<F>(&self, claims_of: F) -> Result<()>
    where
        F: Fn(StageKind) -> Vec<OutputClaim>,
    {
        let entries = self.schedulable();

        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for (name, _, _) in entries.iter() {
            graph.add_node(name.as_str());
        }
        for (name, _, after) in entries.iter() {
            for dep in after.iter() {
                graph.add_edge(dep.as_str(), name.as_str(), ());
            }
        }

        if let Err(cycle) = toposort(&graph, None) {
            return Err(SitepipeError::TaskCycle(cycle.node_id().to_string()));
        }

        let claims: BTreeMap<&str, Vec<OutputClaim>> = entries
            .iter()
            .map(|(name, stage, _)| (name.as_str(), claims_of(*stage)))
            .collect();

        let names: Vec<&str> = claims.keys().copied().collect();
        for (i, &first) in names.iter().enumerate() {
            for &second in names.iter().skip(i + 1) {
                let ordered = has_path_connecting(&graph, first, second, None)
                    || has_path_connecting(&graph, second, first, None);
                if ordered {
                    continue;
                }
                for a in claims[first].iter() {
                    if let Some(b) = claims[second].iter().find(|b| a.overlaps(b)) {
                        return Err(SitepipeError::OverlappingOutputs {
                            first: first.to_string(),
                            second: second.to_string(),
                            claim: format!("{a} / {b}"),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

impl TaskRegistry {
    /// Expand `task` into the stage DAG and watch bindings it implies.
    pub fn plan(&self, task: &str) -> Result<RunPlan> {
        let mut expander = Expander {
            registry: self,
            plan: RunPlan {
                task: task.to_string(),
                nodes: BTreeMap::new(),
                watches: Vec::new(),
            },
        };
        expander.expand(task)?;
        debug!(task, nodes = expander.plan.nodes.len(), "expanded task plan");
        Ok(expander.plan)
    }
}

/// Stage nodes contributed by one task, and the ones that finish it.
#[derive(Debug, Default)]
struct Fragment {
    nodes: Vec<TaskName>,
    exits: Vec<TaskName>,
    /// Stages bound to watchers by this task.
    watches: Vec<StageKind>,
}

struct Expander<'a> {
    registry: &'a TaskRegistry,
    plan: RunPlan,
}

impl Expander<'_> {
    fn expand(&mut self, name: &str) -> Result<Fragment> {
        let desc = self
            .registry
            .get(name)
            .ok_or_else(|| SitepipeError::UnknownTask(name.to_string()))?;

        let mut fragment = Fragment::default();
        let mut dep_exits = Vec::new();
        for dep in desc.dependencies.iter() {
            let dep_fragment = self.expand(dep)?;
            fragment.nodes.extend(dep_fragment.nodes);
            fragment.watches.extend(dep_fragment.watches);
            dep_exits.extend(dep_fragment.exits);
        }

        match &desc.action {
            TaskAction::Stage(stage) => {
                self.add_node(name, *stage, &dep_exits);
                fragment.nodes.push(name.to_string());
                fragment.exits = vec![name.to_string()];
            }
            TaskAction::Watch(stage) => {
                if !self.plan.watches.iter().any(|w| w.stage == *stage) {
                    self.plan.watches.push(WatchBinding {
                        task: name.to_string(),
                        stage: *stage,
                        after: Vec::new(),
                    });
                }
                fragment.watches.push(*stage);
                fragment.exits = dep_exits;
            }
            TaskAction::Group => {
                fragment.exits = dep_exits;
            }
            TaskAction::Sequence(steps) => {
                let mut previous = dep_exits;
                for step in steps {
                    let mut members: BTreeMap<&str, Fragment> = BTreeMap::new();
                    for member in step.tasks.iter() {
                        let member_fragment = self.expand(member)?;
                        self.link(&previous, &member_fragment);
                        members.insert(member.as_str(), member_fragment);
                    }
                    for (before, after) in step.ordered.iter() {
                        if let (Some(b), Some(a)) =
                            (members.get(before.as_str()), members.get(after.as_str()))
                        {
                            let exits = b.exits.clone();
                            self.link(&exits, a);
                            self.order_watches(&b.watches, &a.watches);
                        }
                    }
                    previous = Vec::new();
                    for (_, member_fragment) in members {
                        fragment.nodes.extend(member_fragment.nodes);
                        fragment.watches.extend(member_fragment.watches);
                        previous.extend(member_fragment.exits);
                    }
                }
                fragment.exits = previous;
            }
        }

        Ok(fragment)
    }

    fn add_node(&mut self, name: &str, stage: StageKind, after: &[TaskName]) {
        let node = self
            .plan
            .nodes
            .entry(name.to_string())
            .or_insert_with(|| PlanNode {
                stage,
                after: Vec::new(),
            });
        for dep in after {
            if !node.after.contains(dep) {
                node.after.push(dep.clone());
            }
        }
    }

    /// Make the entry nodes of `fragment` wait for every node in `exits`.
    fn link(&mut self, exits: &[TaskName], fragment: &Fragment) {
        if exits.is_empty() {
            return;
        }
        let inside: BTreeSet<&str> = fragment.nodes.iter().map(String::as_str).collect();
        let entries: Vec<TaskName> = fragment
            .nodes
            .iter()
            .filter(|name| {
                self.plan
                    .dependencies_of(name)
                    .iter()
                    .all(|dep| !inside.contains(dep.as_str()))
            })
            .cloned()
            .collect();

        for entry in entries {
            if let Some(node) = self.plan.nodes.get_mut(&entry) {
                for exit in exits {
                    if exit != &entry && !node.after.contains(exit) {
                        node.after.push(exit.clone());
                    }
                }
            }
        }
    }

    /// Keep every stage in `after` from running while one in `before` does.
    fn order_watches(&mut self, before: &[StageKind], after: &[StageKind]) {
        for binding in self.plan.watches.iter_mut() {
            if !after.contains(&binding.stage) {
                continue;
            }
            for stage in before {
                let name = stage.task_name().to_string();
                if *stage != binding.stage && !binding.after.contains(&name) {
                    binding.after.push(name);
                }
            }
        }
    }
}
