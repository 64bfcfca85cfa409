// tests/scheduler_proptest.rs

use std::collections::{BTreeMap, HashSet};

use proptest::prelude::*;
use sitepipe::dag::{PlanNode, RunPlan, Scheduler, TaskRunState};
use sitepipe::engine::TaskOutcome;
use sitepipe::types::StageKind;

// Acyclic by construction: node N may only depend on nodes 0..N-1.
fn plan_strategy(max_nodes: usize) -> impl Strategy<Value = RunPlan> {
    (1..=max_nodes).prop_flat_map(|num_nodes| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_nodes),
            num_nodes,
        )
        .prop_map(move |raw_deps| {
            let mut nodes = BTreeMap::new();
            for (i, potential) in raw_deps.into_iter().enumerate() {
                let after: HashSet<usize> = if i == 0 {
                    HashSet::new()
                } else {
                    potential.into_iter().map(|d| d % i).collect()
                };
                let mut after: Vec<String> = after.into_iter().map(|d| format!("task_{d:02}")).collect();
                after.sort();
                nodes.insert(
                    format!("task_{i:02}"),
                    PlanNode {
                        stage: StageKind::ALL[i % StageKind::ALL.len()],
                        after,
                    },
                );
            }
            RunPlan {
                task: "generated".to_string(),
                nodes,
                watches: Vec::new(),
            }
        })
    })
}

proptest! {
    #[test]
    fn scheduler_terminates_for_any_plan_and_failure_set(
        plan in plan_strategy(10),
        failing_indices in proptest::collection::vec(0..10usize, 0..4),
    ) {
        let mut scheduler = Scheduler::from_plan(&plan);
        let names: Vec<String> = plan.node_names().map(str::to_string).collect();
        let failing: HashSet<String> = failing_indices
            .iter()
            .filter(|&&i| i < names.len())
            .map(|&i| names[i].clone())
            .collect();

        scheduler.start_new_run();
        let mut executing: Vec<String> = scheduler
            .handle_triggers(names.as_slice())
            .into_iter()
            .map(|t| t.name)
            .collect();

        let mut completed = 0;
        while !executing.is_empty() {
            let task = executing.remove(0);
            completed += 1;
            prop_assert!(completed <= names.len(), "a stage ran twice in one run");

            let outcome = if failing.contains(&task) {
                TaskOutcome::Failed
            } else {
                TaskOutcome::Success
            };
            executing.extend(
                scheduler
                    .handle_completion(&task, outcome)
                    .into_iter()
                    .map(|t| t.name),
            );
        }

        prop_assert!(scheduler.is_idle(), "run never finished");

        // Every node is terminal, and a success means all deps succeeded.
        for name in names.iter() {
            let state = scheduler.run_state_of(name);
            prop_assert!(
                matches!(state, Some(TaskRunState::DoneSuccess) | Some(TaskRunState::DoneFailed)),
                "{} ended in {:?}", name, state
            );
            if state == Some(TaskRunState::DoneSuccess) {
                for dep in plan.dependencies_of(name) {
                    prop_assert_eq!(scheduler.run_state_of(dep), Some(TaskRunState::DoneSuccess));
                }
            }
        }
    }
}
