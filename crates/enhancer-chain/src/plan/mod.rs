//! The execution plan model.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use enhancer_dsl::StageConfig;

use crate::error::PlanBuildError;
use crate::validation;

mod builder;
mod ordering;

pub use builder::build_plan;

/// Chain or node level configuration: key to ordered values.
///
/// A value appears at most once per key; plan validation rejects repeats.
pub type Properties = BTreeMap<String, Vec<String>>;

/// One stage of an execution plan
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExecutionNode {
    /// Name of the engine executing this stage
    pub name: String,

    /// The chain does not fail if this stage fails
    pub optional: bool,

    /// Stages that are executed before this one
    #[serde(rename = "dependsOn")]
    pub depends_on: BTreeSet<String>,

    /// Stage configuration
    pub properties: Properties,
}

impl ExecutionNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn depends_on(mut self, target: impl Into<String>) -> Self {
        self.depends_on.insert(target.into());
        self
    }

    pub fn with_property<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.properties
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }
}

impl From<StageConfig> for ExecutionNode {
    fn from(stage: StageConfig) -> Self {
        Self {
            name: stage.name,
            optional: stage.optional,
            depends_on: stage.depends_on.into_iter().collect(),
            properties: stage.properties,
        }
    }
}

/// A validated, immutable dependency graph of execution nodes.
///
/// Construction goes through [`ExecutionPlan::from_nodes`] (or
/// [`build_plan`]), so every plan value is referentially closed, acyclic and
/// has unique node names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    #[serde(rename = "chain")]
    chain_name: String,
    #[serde(rename = "chainProperties")]
    chain_properties: Properties,
    nodes: BTreeMap<String, ExecutionNode>,
}

impl ExecutionPlan {
    /// Validate `nodes` and build a plan from them.
    ///
    /// All violations are reported together.
    pub fn from_nodes<I>(
        chain_name: impl Into<String>,
        chain_properties: Properties,
        nodes: I,
    ) -> Result<Self, PlanBuildError>
    where
        I: IntoIterator<Item = ExecutionNode>,
    {
        let nodes: Vec<ExecutionNode> = nodes.into_iter().collect();
        if nodes.is_empty() {
            return Err(PlanBuildError::EmptyPlan);
        }

        validation::validate_plan(&nodes, &chain_properties)?;

        Ok(Self {
            chain_name: chain_name.into(),
            chain_properties,
            nodes: nodes
                .into_iter()
                .map(|node| (node.name.clone(), node))
                .collect(),
        })
    }

    /// Add `defaults` for every chain property key the plan does not define
    pub fn with_default_chain_properties(mut self, defaults: &Properties) -> Self {
        for (key, values) in defaults {
            self.chain_properties
                .entry(key.clone())
                .or_insert_with(|| values.clone());
        }
        self
    }

    pub fn chain_name(&self) -> &str {
        &self.chain_name
    }

    pub fn chain_properties(&self) -> &Properties {
        &self.chain_properties
    }

    /// Nodes ordered by name
    pub fn nodes(&self) -> impl Iterator<Item = &ExecutionNode> {
        self.nodes.values()
    }

    pub fn node(&self, name: &str) -> Option<&ExecutionNode> {
        self.nodes.get(name)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Names of all engines referenced by this plan
    pub fn engines(&self) -> BTreeSet<String> {
        self.nodes.keys().cloned().collect()
    }
}
