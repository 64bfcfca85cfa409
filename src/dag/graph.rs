// src/dag/graph.rs

use std::collections::HashMap;

use crate::dag::plan::RunPlan;

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone)]
struct DagNode {
    /// Direct dependencies: stages that must succeed before this one can run.
    deps: Vec<String>,
    /// Direct dependents: stages that wait for this one.
    dependents: Vec<String>,
}

/// In-memory adjacency view of a [`RunPlan`], keyed by task name.
///
/// Watched stages appear as nodes without edges.
///
/// Acyclicity is checked when the plan is built; this only keeps the
/// forward and backward edges the scheduler needs.
#[derive(Debug, Clone)]
pub struct DagGraph {
    nodes: HashMap<String, DagNode>,
}

impl DagGraph {
    pub fn from_plan(plan: &RunPlan) -> Self {
        let entries = plan.schedulable();

        let mut nodes: HashMap<String, DagNode> = entries
            .iter()
            .map(|(name, _, after)| {
                (
                    name.clone(),
                    DagNode {
                        deps: after.clone(),
                        dependents: Vec::new(),
                    },
                )
            })
            .collect();

        for (name, _, after) in entries.iter() {
            for dep in after.iter() {
                if let Some(dep_node) = nodes.get_mut(dep) {
                    dep_node.dependents.push(name.clone());
                }
            }
        }

        Self { nodes }
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }
}
