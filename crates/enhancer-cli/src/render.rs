//! Output formats of `chainctl show`.

use clap::ValueEnum;
use enhancer_chain::graph::{ntriples, plan_to_graph, rdf_json};
use enhancer_chain::ExecutionPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The plan as JSON
    Json,
    /// The plan graph as N-Triples
    Ntriples,
    /// The plan graph as RDF/JSON
    RdfJson,
}

pub fn render_plan(plan: &ExecutionPlan, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(plan)?,
        OutputFormat::Ntriples => ntriples::write(&plan_to_graph(plan)),
        OutputFormat::RdfJson => rdf_json::write(&plan_to_graph(plan))?,
    })
}
