use std::collections::{HashMap, HashSet};

use enhancer_dsl::ValidationError;
use tracing::debug;

use crate::error::PlanBuildError;
use crate::graph::{vocab, Term, TripleGraph};
use crate::plan::{ExecutionNode, ExecutionPlan, Properties};
use crate::validation::error_codes;

/// Map a decoded execution plan graph onto an [`ExecutionPlan`].
///
/// Every `ep:ExecutionNode` needs exactly one non-empty `ep:engine` literal,
/// `ep:dependsOn` values must be execution node resources and `ep:optional`
/// values boolean literals. Structural checks (duplicates, referential
/// closure, cycles) are then run by [`ExecutionPlan::from_nodes`].
pub fn plan_from_graph(
    graph: &TripleGraph,
    chain_name: &str,
) -> Result<ExecutionPlan, PlanBuildError> {
    let node_type = Term::iri(vocab::EXECUTION_NODE);
    let subjects = graph.subjects(vocab::RDF_TYPE, &node_type);
    if subjects.is_empty() {
        return Err(PlanBuildError::EmptyPlan);
    }

    let mut errors = Vec::new();
    let mut engines: HashMap<&Term, String> = HashMap::with_capacity(subjects.len());
    for &subject in &subjects {
        match engine_name(graph, subject) {
            Ok(name) => {
                engines.insert(subject, name);
            }
            Err(error) => errors.push(error),
        }
    }

    let execution_nodes: HashSet<&Term> = subjects.iter().copied().collect();
    let mut nodes = Vec::with_capacity(subjects.len());

    for &subject in &subjects {
        let Some(name) = engines.get(subject) else {
            continue;
        };
        let mut node = ExecutionNode::new(name.as_str());

        for value in graph.objects(subject, vocab::OPTIONAL) {
            match parse_boolean(value) {
                Some(optional) => node.optional |= optional,
                None => errors.push(
                    ValidationError::new(
                        error_codes::INVALID_OPTIONAL,
                        format!(
                            "Execution node of engine '{}' has a non boolean ep:optional value {}",
                            name, value
                        ),
                    )
                    .at(subject.to_string()),
                ),
            }
        }

        for target in graph.objects(subject, vocab::DEPENDS_ON) {
            if !target.is_resource() || !execution_nodes.contains(target) {
                errors.push(
                    ValidationError::new(
                        error_codes::INVALID_DEPENDENCY,
                        format!(
                            "Execution node of engine '{}' depends on {} which is not an ep:ExecutionNode",
                            name, target
                        ),
                    )
                    .at(subject.to_string()),
                );
                continue;
            }
            // a target without engine is reported on its own
            if let Some(target_name) = engines.get(target) {
                node.depends_on.insert(target_name.clone());
            }
        }

        node.properties = properties(graph, subject);
        nodes.push(node);
    }

    if !errors.is_empty() {
        return Err(PlanBuildError::from_validation_errors(errors));
    }

    let plan = ExecutionPlan::from_nodes(chain_name, chain_properties(graph, chain_name), nodes)?;
    debug!(
        chain = chain_name,
        nodes = plan.node_count(),
        triples = graph.len(),
        "Built execution plan from graph"
    );
    Ok(plan)
}

fn engine_name(graph: &TripleGraph, subject: &Term) -> Result<String, ValidationError> {
    let names: Vec<&str> = graph
        .objects(subject, vocab::ENGINE)
        .filter_map(Term::as_literal)
        .map(|literal| literal.value.trim())
        .filter(|name| !name.is_empty())
        .collect();

    match names.as_slice() {
        [name] => Ok(name.to_string()),
        [] => Err(ValidationError::new(
            error_codes::MISSING_ENGINE,
            format!("Execution node {} has no non-empty ep:engine literal", subject),
        )
        .at(subject.to_string())),
        _ => Err(ValidationError::new(
            error_codes::MULTIPLE_ENGINES,
            format!(
                "Execution node {} has multiple ep:engine values: {}",
                subject,
                names
                    .iter()
                    .map(|name| format!("'{}'", name))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )
        .at(subject.to_string())),
    }
}

fn parse_boolean(value: &Term) -> Option<bool> {
    let literal = value.as_literal()?;
    match literal.datatype.as_deref() {
        None | Some(vocab::XSD_BOOLEAN) => {}
        Some(_) => return None,
    }
    match literal.value.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        other if other.eq_ignore_ascii_case("true") => Some(true),
        other if other.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn properties(graph: &TripleGraph, subject: &Term) -> Properties {
    let mut properties = Properties::new();
    for triple in graph.filter(Some(subject), None, None) {
        if let Some(key) = vocab::property_key(&triple.predicate) {
            properties
                .entry(key)
                .or_default()
                .push(triple.object.lexical_value().to_string());
        }
    }
    properties
}

/// Properties of the `ep:ExecutionPlan` resource of `chain_name`, or of the
/// only plan resource if none names the chain
fn chain_properties(graph: &TripleGraph, chain_name: &str) -> Properties {
    let plan_type = Term::iri(vocab::EXECUTION_PLAN);
    let plans = graph.subjects(vocab::RDF_TYPE, &plan_type);

    let named = plans.iter().copied().find(|&plan| {
        graph
            .objects(plan, vocab::CHAIN)
            .any(|value| value.lexical_value() == chain_name)
    });

    match (named, plans.as_slice()) {
        (Some(plan), _) | (None, &[plan]) => properties(graph, plan),
        _ => {
            debug!(
                chain = chain_name,
                plans = plans.len(),
                "No execution plan resource for chain, using empty chain properties"
            );
            Properties::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{plan_to_graph, Literal, Triple};
    use pretty_assertions::assert_eq;

    fn node(graph: &mut TripleGraph, label: &str, engine: &str) -> Term {
        let subject = Term::blank(label);
        graph.insert(Triple::new(subject.clone(), vocab::RDF_TYPE, Term::iri(vocab::EXECUTION_NODE)));
        if !engine.is_empty() {
            graph.insert(Triple::new(subject.clone(), vocab::ENGINE, Term::literal(engine)));
        }
        subject
    }

    fn codes(err: &PlanBuildError) -> Vec<&'static str> {
        err.validation_errors().iter().map(|e| e.code).collect()
    }

    #[test]
    fn test_two_nodes_without_edges() {
        let mut graph = TripleGraph::new();
        node(&mut graph, "n1", "tika");
        node(&mut graph, "n2", "langId");

        let plan = plan_from_graph(&graph, "default").unwrap();
        assert_eq!(plan.node_count(), 2);
        assert!(plan.nodes().all(|n| n.depends_on.is_empty() && !n.optional));
        assert_eq!(plan.chain_name(), "default");
    }

    #[test]
    fn test_dependencies_optional_and_properties() {
        let mut graph = TripleGraph::new();
        let a = node(&mut graph, "a", "metaxa");
        let b = node(&mut graph, "b", "langId");
        graph.insert(Triple::new(b.clone(), vocab::DEPENDS_ON, a));
        graph.insert(Triple::new(
            b.clone(),
            vocab::OPTIONAL,
            Term::Literal(Literal::typed("true", vocab::XSD_BOOLEAN)),
        ));
        graph.insert(Triple::new(b.clone(), vocab::property_iri("lang"), Term::literal("en")));
        graph.insert(Triple::new(b, vocab::property_iri("lang"), Term::literal("de")));

        let plan = plan_from_graph(&graph, "default").unwrap();
        let lang_id = plan.node("langId").unwrap();
        assert!(lang_id.optional);
        assert!(lang_id.depends_on.contains("metaxa"));
        assert_eq!(lang_id.properties["lang"], vec!["en", "de"]);
    }

    #[test]
    fn test_empty_graph() {
        assert_eq!(
            plan_from_graph(&TripleGraph::new(), "default"),
            Err(PlanBuildError::EmptyPlan)
        );
    }

    #[test]
    fn test_engine_rules() {
        let mut graph = TripleGraph::new();
        node(&mut graph, "missing", "");
        let multi = node(&mut graph, "multi", "a");
        graph.insert(Triple::new(multi, vocab::ENGINE, Term::literal("b")));

        let err = plan_from_graph(&graph, "default").unwrap_err();
        assert_eq!(
            codes(&err),
            vec![error_codes::MISSING_ENGINE, error_codes::MULTIPLE_ENGINES]
        );
    }

    #[test]
    fn test_dependency_rules() {
        let mut graph = TripleGraph::new();
        let a = node(&mut graph, "a", "a");
        graph.insert(Triple::new(a.clone(), vocab::DEPENDS_ON, Term::literal("b")));
        graph.insert(Triple::new(a, vocab::DEPENDS_ON, Term::iri("urn:not-a-node")));

        let err = plan_from_graph(&graph, "default").unwrap_err();
        assert_eq!(
            codes(&err),
            vec![error_codes::INVALID_DEPENDENCY, error_codes::INVALID_DEPENDENCY]
        );
        assert!(err.to_string().contains("urn:not-a-node"));
    }

    #[test]
    fn test_invalid_optional() {
        let mut graph = TripleGraph::new();
        let a = node(&mut graph, "a", "a");
        graph.insert(Triple::new(a, vocab::OPTIONAL, Term::literal("sometimes")));

        let err = plan_from_graph(&graph, "default").unwrap_err();
        assert_eq!(err.error_code(), error_codes::INVALID_OPTIONAL);
    }

    #[test]
    fn test_duplicate_engine_names() {
        let mut graph = TripleGraph::new();
        node(&mut graph, "n1", "tika");
        node(&mut graph, "n2", "tika");

        let err = plan_from_graph(&graph, "default").unwrap_err();
        assert_eq!(err.error_code(), error_codes::DUPLICATE_NODE);
    }

    #[test]
    fn test_cycle_in_graph() {
        let mut graph = TripleGraph::new();
        let a = node(&mut graph, "a", "a");
        let b = node(&mut graph, "b", "b");
        graph.insert(Triple::new(a.clone(), vocab::DEPENDS_ON, b.clone()));
        graph.insert(Triple::new(b, vocab::DEPENDS_ON, a));

        let err = plan_from_graph(&graph, "default").unwrap_err();
        assert_eq!(err.error_code(), error_codes::CIRCULAR_DEPENDENCY);
    }

    #[test]
    fn test_chain_properties_selection() {
        let mut graph = TripleGraph::new();
        node(&mut graph, "n", "tika");
        for (label, chain, value) in [("p1", "other", "x"), ("p2", "default", "y")] {
            let plan = Term::blank(label);
            graph.insert(Triple::new(plan.clone(), vocab::RDF_TYPE, Term::iri(vocab::EXECUTION_PLAN)));
            graph.insert(Triple::new(plan.clone(), vocab::CHAIN, Term::literal(chain)));
            graph.insert(Triple::new(plan, vocab::property_iri("mode"), Term::literal(value)));
        }

        let plan = plan_from_graph(&graph, "default").unwrap();
        assert_eq!(plan.chain_properties()["mode"], vec!["y"]);

        let plan = plan_from_graph(&graph, "unknown").unwrap();
        assert!(plan.chain_properties().is_empty());
    }

    #[test]
    fn test_plan_graph_round_trip() {
        let plan = ExecutionPlan::from_nodes(
            "default",
            Properties::from([("lang".to_string(), vec!["en".to_string(), "de".to_string()])]),
            vec![
                ExecutionNode::new("metaxa"),
                ExecutionNode::new("langId").depends_on("metaxa"),
                ExecutionNode::new("ner")
                    .depends_on("langId")
                    .with_optional(true)
                    .with_property("model", ["a", "b"]),
            ],
        )
        .unwrap();

        let decoded = plan_from_graph(&plan_to_graph(&plan), "default").unwrap();
        assert_eq!(decoded, plan);
    }
}
