use std::collections::{btree_set, BTreeMap, BTreeSet, HashSet};

use enhancer_dsl::ValidationError;

use crate::plan::ExecutionNode;
use crate::validation::{error_codes, PlanValidator};

/// The `dependsOn` edges must not form a cycle.
///
/// Edges to undefined stages are left to the reference validator.
pub struct CycleValidator;

impl CycleValidator {
    /// Depth-first search from `start` recording every back edge as a cycle.
    ///
    /// The search keeps its own stack so very long chains do not exhaust the
    /// thread stack.
    fn find_cycles<'a>(
        start: &'a str,
        graph: &BTreeMap<&'a str, &'a BTreeSet<String>>,
        visited: &mut HashSet<&'a str>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        if visited.contains(start) {
            return;
        }
        let Some(&deps) = graph.get(start) else {
            return;
        };

        let mut current_path: Vec<&'a str> = vec![start];
        let mut path_set: HashSet<&'a str> = HashSet::from([start]);
        let mut pending: Vec<btree_set::Iter<'a, String>> = vec![deps.iter()];

        while let Some(deps) = pending.last_mut() {
            match deps.next() {
                Some(dep) => {
                    let dep = dep.as_str();
                    let Some(&next) = graph.get(dep) else {
                        continue;
                    };
                    if path_set.contains(dep) {
                        if let Some(cycle_start) = current_path.iter().position(|&n| n == dep) {
                            cycles.push(
                                current_path[cycle_start..]
                                    .iter()
                                    .map(|n| n.to_string())
                                    .collect(),
                            );
                        }
                    } else if !visited.contains(dep) {
                        current_path.push(dep);
                        path_set.insert(dep);
                        pending.push(next.iter());
                    }
                }
                None => {
                    pending.pop();
                    if let Some(done) = current_path.pop() {
                        path_set.remove(done);
                        visited.insert(done);
                    }
                }
            }
        }
    }
}

impl PlanValidator for CycleValidator {
    fn validate(&self, nodes: &[ExecutionNode]) -> Vec<ValidationError> {
        let graph: BTreeMap<&str, &BTreeSet<String>> = nodes
            .iter()
            .map(|node| (node.name.as_str(), &node.depends_on))
            .collect();

        let mut visited = HashSet::with_capacity(graph.len());
        let mut cycles = Vec::new();

        for start in graph.keys() {
            Self::find_cycles(start, &graph, &mut visited, &mut cycles);
        }

        cycles
            .into_iter()
            .map(|cycle| {
                let mut formatted = cycle.join(" → ");
                formatted.push_str(" → ");
                formatted.push_str(&cycle[0]);
                ValidationError::new(
                    error_codes::CIRCULAR_DEPENDENCY,
                    format!("Circular dependency detected between stages: {}", formatted),
                )
                .at(format!("nodes['{}'].dependsOn", cycle[0]))
            })
            .collect()
    }
}
