use std::sync::Arc;

use tracing::info;

use crate::error::ChainError;
use crate::plan::{build_plan, ExecutionPlan, Properties};
use crate::Chain;

/// [`Chain`] configured by chain list lines, built once and immutable
#[derive(Debug, Clone)]
pub struct ListChain {
    plan: Arc<ExecutionPlan>,
}

impl ListChain {
    /// Parse, validate and build the chain.
    ///
    /// DSL problems (no stage, duplicate names, malformed clauses) are
    /// configuration errors; dangling dependencies and cycles are plan build
    /// errors.
    pub fn new<I, S>(name: &str, lines: I, chain_properties: Properties) -> Result<Self, ChainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stages = enhancer_dsl::parse_and_validate_chain_list(lines)
            .map_err(|err| ChainError::from_dsl(name, err))?;
        let plan = build_plan(stages, name, chain_properties)
            .map_err(|err| ChainError::plan_build(name, err))?;

        info!(chain = name, stages = plan.node_count(), "Chain list compiled");
        Ok(Self {
            plan: Arc::new(plan),
        })
    }
}

impl Chain for ListChain {
    fn name(&self) -> Result<String, ChainError> {
        Ok(self.plan.chain_name().to_string())
    }

    fn execution_plan(&self) -> Result<Arc<ExecutionPlan>, ChainError> {
        Ok(self.plan.clone())
    }
}
