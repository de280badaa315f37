use std::collections::HashSet;

use enhancer_dsl::ValidationError;

use crate::plan::{ExecutionNode, Properties};
use crate::validation::{error_codes, PlanValidator};

/// A value may appear only once per property key.
///
/// Plans are exchanged as triple graphs, where a repeated value of the same
/// key collapses into a single statement.
pub struct PropertyValueValidator;

impl PlanValidator for PropertyValueValidator {
    fn validate(&self, nodes: &[ExecutionNode]) -> Vec<ValidationError> {
        nodes
            .iter()
            .flat_map(|node| {
                duplicate_values(
                    &node.properties,
                    &format!("stage '{}'", node.name),
                    &format!("nodes['{}'].properties", node.name),
                )
            })
            .collect()
    }
}

/// Report every key of `properties` that lists a value more than once
pub(crate) fn duplicate_values(
    properties: &Properties,
    owner: &str,
    path: &str,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (key, values) in properties {
        let mut seen = HashSet::with_capacity(values.len());
        let mut reported = HashSet::new();
        for value in values {
            if !seen.insert(value.as_str()) && reported.insert(value.as_str()) {
                errors.push(
                    ValidationError::new(
                        error_codes::DUPLICATE_PROPERTY_VALUE,
                        format!(
                            "Property '{}' of {} lists the value '{}' more than once",
                            key, owner, value
                        ),
                    )
                    .at(format!("{}['{}']", path, key)),
                );
            }
        }
    }
    errors
}
