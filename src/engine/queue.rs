// src/engine/queue.rs

use std::collections::BTreeSet;

use tracing::debug;

use crate::engine::TaskName;
use crate::types::OverlapPolicy;

/// Re-triggers that arrived while their stage was still running.
///
/// Only used with [`OverlapPolicy::Coalesce`]: each stage has at most one
/// pending re-run no matter how many triggers arrive, and it is started when
/// the in-flight invocation completes.
#[derive(Debug)]
pub struct TriggerQueue {
    policy: OverlapPolicy,
    pending: BTreeSet<TaskName>,
}

impl TriggerQueue {
    pub fn new(policy: OverlapPolicy) -> Self {
        Self {
            policy,
            pending: BTreeSet::new(),
        }
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// Returns true if there are no queued triggers.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Remember that `task` must run again once its current run completes.
    pub fn record_trigger(&mut self, task: &str) {
        let inserted = self.pending.insert(task.to_string());
        debug!(task, inserted, "coalesced trigger for running stage");
    }

    /// Remove the pending re-run of `task`, returning whether there was one.
    pub fn take(&mut self, task: &str) -> bool {
        self.pending.remove(task)
    }

    /// Drain every pending re-run, in name order.
    pub fn drain_pending(&mut self) -> Vec<TaskName> {
        let tasks: Vec<TaskName> = std::mem::take(&mut self.pending).into_iter().collect();
        debug!(drained = tasks.len(), "drained queued triggers into new run");
        tasks
    }
}
