use crate::graph::vocab;
use crate::graph::{Literal, Term, Triple, TripleGraph};
use crate::plan::{ExecutionPlan, Properties};

const PLAN_LABEL: &str = "plan";

fn node_label(idx: usize) -> String {
    format!("node{}", idx)
}

fn write_properties(graph: &mut TripleGraph, subject: &Term, properties: &Properties) {
    for (key, values) in properties {
        for value in values {
            graph.insert(Triple::new(
                subject.clone(),
                vocab::property_iri(key),
                Term::literal(value.as_str()),
            ));
        }
    }
}

/// Describe `plan` with the execution plan vocabulary.
///
/// The plan and its nodes are blank nodes; nodes are labelled in name order
/// so the output is stable.
pub fn plan_to_graph(plan: &ExecutionPlan) -> TripleGraph {
    let mut graph = TripleGraph::new();
    let plan_node = Term::blank(PLAN_LABEL);

    graph.insert(Triple::new(
        plan_node.clone(),
        vocab::RDF_TYPE,
        Term::iri(vocab::EXECUTION_PLAN),
    ));
    graph.insert(Triple::new(
        plan_node.clone(),
        vocab::CHAIN,
        Term::literal(plan.chain_name()),
    ));
    write_properties(&mut graph, &plan_node, plan.chain_properties());

    let labels: std::collections::BTreeMap<&str, Term> = plan
        .nodes()
        .enumerate()
        .map(|(idx, node)| (node.name.as_str(), Term::blank(node_label(idx))))
        .collect();

    for node in plan.nodes() {
        let Some(subject) = labels.get(node.name.as_str()) else {
            continue;
        };
        graph.insert(Triple::new(
            plan_node.clone(),
            vocab::HAS_EXECUTION_NODE,
            subject.clone(),
        ));
        graph.insert(Triple::new(
            subject.clone(),
            vocab::RDF_TYPE,
            Term::iri(vocab::EXECUTION_NODE),
        ));
        graph.insert(Triple::new(
            subject.clone(),
            vocab::ENGINE,
            Term::literal(node.name.as_str()),
        ));
        for target in &node.depends_on {
            if let Some(object) = labels.get(target.as_str()) {
                graph.insert(Triple::new(subject.clone(), vocab::DEPENDS_ON, object.clone()));
            }
        }
        graph.insert(Triple::new(
            subject.clone(),
            vocab::OPTIONAL,
            Term::Literal(Literal::typed(node.optional.to_string(), vocab::XSD_BOOLEAN)),
        ));
        write_properties(&mut graph, subject, &node.properties);
    }

    graph
}
