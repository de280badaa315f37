use std::collections::HashSet;

use enhancer_dsl::ValidationError;

use crate::plan::ExecutionNode;
use crate::validation::{error_codes, PlanValidator};

/// Node names must be non-empty and unique
pub struct NodeNameValidator;

impl PlanValidator for NodeNameValidator {
    fn validate(&self, nodes: &[ExecutionNode]) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut seen = HashSet::with_capacity(nodes.len());
        let mut reported = HashSet::new();

        for (idx, node) in nodes.iter().enumerate() {
            if node.name.trim().is_empty() {
                errors.push(
                    ValidationError::new(
                        error_codes::INVALID_NODE,
                        "Execution node names must not be empty",
                    )
                    .at(format!("nodes[{}].name", idx)),
                );
                continue;
            }
            if !seen.insert(node.name.as_str()) && reported.insert(node.name.as_str()) {
                errors.push(
                    ValidationError::new(
                        error_codes::DUPLICATE_NODE,
                        format!("Engine '{}' is used by more than one execution node", node.name),
                    )
                    .at(format!("nodes[{}].name", idx)),
                );
            }
        }

        errors
    }
}
