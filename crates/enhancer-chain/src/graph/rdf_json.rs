//! RDF/JSON (`application/rdf+json`) reader and writer.
//!
//! ```json
//! { "_:plan": { "http://...#chain": [ { "type": "literal", "value": "default" } ] } }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::DecodeError;
use crate::graph::{GraphDecoder, Literal, Term, Triple, TripleGraph};

const BLANK_NODE_PREFIX: &str = "_:";

type Document = BTreeMap<String, BTreeMap<String, Vec<ObjectValue>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ObjectKind {
    Uri,
    Bnode,
    Literal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ObjectValue {
    #[serde(rename = "type")]
    kind: ObjectKind,
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    datatype: Option<String>,
}

/// Decoder for `application/rdf+json`
#[derive(Debug, Default, Clone, Copy)]
pub struct RdfJsonDecoder;

impl GraphDecoder for RdfJsonDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<TripleGraph, DecodeError> {
        let document: Document = serde_json::from_slice(bytes)?;
        let mut graph = TripleGraph::new();

        for (subject, predicates) in document {
            let subject = resource(&subject);
            for (predicate, objects) in predicates {
                for object in objects {
                    graph.insert(Triple::new(subject.clone(), predicate.clone(), object_term(object)?));
                }
            }
        }

        Ok(graph)
    }
}

fn resource(value: &str) -> Term {
    match value.strip_prefix(BLANK_NODE_PREFIX) {
        Some(label) => Term::blank(label),
        None => Term::iri(value),
    }
}

fn object_term(object: ObjectValue) -> Result<Term, DecodeError> {
    match object.kind {
        ObjectKind::Uri => Ok(Term::Iri(object.value)),
        ObjectKind::Bnode => object
            .value
            .strip_prefix(BLANK_NODE_PREFIX)
            .map(Term::blank)
            .ok_or_else(|| {
                DecodeError::Json(format!(
                    "blank node value '{}' must start with '{}'",
                    object.value, BLANK_NODE_PREFIX
                ))
            }),
        ObjectKind::Literal => Ok(Term::Literal(Literal {
            value: object.value,
            datatype: object.datatype,
            language: object.lang,
        })),
    }
}

fn resource_key(term: &Term) -> String {
    match term {
        Term::BlankNode(label) => format!("{}{}", BLANK_NODE_PREFIX, label),
        other => other.lexical_value().to_string(),
    }
}

/// Serialize a graph as pretty printed RDF/JSON.
///
/// Literal subjects can not be expressed and are skipped.
pub fn write(graph: &TripleGraph) -> serde_json::Result<String> {
    let mut document = Document::new();
    for triple in graph.iter().filter(|triple| triple.subject.is_resource()) {
        let object = match &triple.object {
            Term::Iri(iri) => ObjectValue {
                kind: ObjectKind::Uri,
                value: iri.clone(),
                lang: None,
                datatype: None,
            },
            Term::BlankNode(_) => ObjectValue {
                kind: ObjectKind::Bnode,
                value: resource_key(&triple.object),
                lang: None,
                datatype: None,
            },
            Term::Literal(literal) => ObjectValue {
                kind: ObjectKind::Literal,
                value: literal.value.clone(),
                lang: literal.language.clone(),
                datatype: literal.datatype.clone(),
            },
        };
        document
            .entry(resource_key(&triple.subject))
            .or_default()
            .entry(triple.predicate.clone())
            .or_default()
            .push(object);
    }

    serde_json::to_string_pretty(&document)
}
