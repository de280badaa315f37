//! Dependency ordering helpers for consumers walking a plan.

use std::collections::{BTreeMap, BTreeSet};

use crate::plan::{ExecutionNode, ExecutionPlan};

impl ExecutionPlan {
    /// Nodes that are not yet in `executed` and whose dependencies all are
    pub fn executable(&self, executed: &BTreeSet<String>) -> Vec<&ExecutionNode> {
        self.nodes()
            .filter(|node| !executed.contains(&node.name))
            .filter(|node| node.depends_on.is_subset(executed))
            .collect()
    }

    /// Dependency respecting order of all stages.
    ///
    /// Each wave holds the stages whose dependencies are satisfied by the
    /// previous waves, sorted by name.
    pub fn execution_order(&self) -> Vec<Vec<&str>> {
        let mut in_degree: BTreeMap<&str, usize> = self
            .nodes()
            .map(|node| (node.name.as_str(), node.depends_on.len()))
            .collect();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for node in self.nodes() {
            for target in &node.depends_on {
                dependents
                    .entry(target.as_str())
                    .or_default()
                    .push(node.name.as_str());
            }
        }

        let mut waves = Vec::new();
        let mut current: Vec<&str> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&name, _)| name)
            .collect();

        while !current.is_empty() {
            let mut next = BTreeSet::new();
            for name in &current {
                for &dependent in dependents.get(name).into_iter().flatten() {
                    if let Some(degree) = in_degree.get_mut(dependent) {
                        *degree -= 1;
                        if *degree == 0 {
                            next.insert(dependent);
                        }
                    }
                }
            }
            waves.push(current);
            current = next.into_iter().collect();
        }

        waves
    }
}
