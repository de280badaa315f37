use std::collections::BTreeMap;

use enhancer_dsl::StageConfig;
use tracing::debug;

use crate::error::PlanBuildError;
use crate::plan::{ExecutionNode, ExecutionPlan, Properties};

/// Build the execution plan of a list configured chain.
///
/// One node is created per stage; `optional`, `dependsOn` and the properties
/// are copied verbatim. An unresolved `dependsOn` target or a dependency
/// cycle fails the whole build.
pub fn build_plan(
    stages: BTreeMap<String, StageConfig>,
    chain_name: &str,
    chain_properties: Properties,
) -> Result<ExecutionPlan, PlanBuildError> {
    let nodes: Vec<ExecutionNode> = stages.into_values().map(ExecutionNode::from).collect();
    let plan = ExecutionPlan::from_nodes(chain_name, chain_properties, nodes)?;

    debug!(
        chain = chain_name,
        nodes = plan.node_count(),
        "Built execution plan from chain list"
    );
    Ok(plan)
}
