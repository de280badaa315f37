//! Structural validation shared by both plan sources.

use enhancer_dsl::ValidationError;

use crate::error::PlanBuildError;
use crate::plan::{ExecutionNode, Properties};

mod cycles;
mod nodes;
mod properties;
mod reference;

/// Plan validation error codes
pub mod error_codes {
    /// Two execution nodes share a name
    pub const DUPLICATE_NODE: &str = "ERR_PLAN_DUPLICATE_NODE";

    /// An execution node has an empty name
    pub const INVALID_NODE: &str = "ERR_PLAN_INVALID_NODE";

    /// A `dependsOn` target does not name an execution node of the plan
    pub const UNKNOWN_DEPENDENCY: &str = "ERR_PLAN_UNKNOWN_DEPENDENCY";

    /// The `dependsOn` edges form a cycle
    pub const CIRCULAR_DEPENDENCY: &str = "ERR_PLAN_CIRCULAR_DEPENDENCY";

    /// An execution node in a graph has no engine name
    pub const MISSING_ENGINE: &str = "ERR_PLAN_GRAPH_MISSING_ENGINE";

    /// An execution node in a graph has more than one engine name
    pub const MULTIPLE_ENGINES: &str = "ERR_PLAN_GRAPH_MULTIPLE_ENGINES";

    /// A `dependsOn` object in a graph is not an execution node resource
    pub const INVALID_DEPENDENCY: &str = "ERR_PLAN_GRAPH_INVALID_DEPENDENCY";

    /// A property lists the same value twice
    pub const DUPLICATE_PROPERTY_VALUE: &str = "ERR_PLAN_DUPLICATE_PROPERTY_VALUE";

    /// An `optional` value in a graph is not a boolean literal
    pub const INVALID_OPTIONAL: &str = "ERR_PLAN_GRAPH_INVALID_OPTIONAL";
}

/// A trait for validators that check one structural aspect of a set of
/// execution nodes
pub trait PlanValidator {
    /// Validate the nodes and return a list of validation errors (if any)
    fn validate(&self, nodes: &[ExecutionNode]) -> Vec<ValidationError>;
}

/// Run all plan validators on the nodes and the chain properties,
/// collecting every error
pub fn validate_plan(
    nodes: &[ExecutionNode],
    chain_properties: &Properties,
) -> Result<(), PlanBuildError> {
    let validators: Vec<Box<dyn PlanValidator>> = vec![
        Box::new(nodes::NodeNameValidator),
        Box::new(reference::DependencyReferenceValidator),
        Box::new(cycles::CycleValidator),
        Box::new(properties::PropertyValueValidator),
    ];

    let mut errors: Vec<ValidationError> = validators
        .iter()
        .flat_map(|validator| validator.validate(nodes))
        .collect();
    errors.extend(chain_property_errors(chain_properties));

    if !errors.is_empty() {
        return Err(PlanBuildError::from_validation_errors(errors));
    }

    Ok(())
}

/// Validate chain properties on their own, e.g. configured defaults
pub fn validate_chain_properties(chain_properties: &Properties) -> Result<(), PlanBuildError> {
    let errors = chain_property_errors(chain_properties);
    if !errors.is_empty() {
        return Err(PlanBuildError::from_validation_errors(errors));
    }
    Ok(())
}

fn chain_property_errors(chain_properties: &Properties) -> Vec<ValidationError> {
    properties::duplicate_values(chain_properties, "the chain", "chainProperties")
}
