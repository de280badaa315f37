use std::collections::BTreeSet;

use enhancer_dsl::ValidationError;

use crate::plan::ExecutionNode;
use crate::validation::{error_codes, PlanValidator};

/// Every `dependsOn` target must name a node of the same plan
pub struct DependencyReferenceValidator;

impl PlanValidator for DependencyReferenceValidator {
    fn validate(&self, nodes: &[ExecutionNode]) -> Vec<ValidationError> {
        let defined: BTreeSet<&str> = nodes.iter().map(|node| node.name.as_str()).collect();
        let mut errors = Vec::new();

        for node in nodes {
            for target in &node.depends_on {
                if !defined.contains(target.as_str()) {
                    errors.push(
                        ValidationError::new(
                            error_codes::UNKNOWN_DEPENDENCY,
                            format!(
                                "Stage '{}' depends on undefined stage '{}'. Defined stages: {}",
                                node.name,
                                target,
                                defined
                                    .iter()
                                    .map(|name| format!("'{}'", name))
                                    .collect::<Vec<_>>()
                                    .join(", ")
                            ),
                        )
                        .at(format!("nodes['{}'].dependsOn", node.name)),
                    );
                }
            }
        }

        errors
    }
}
