//! A minimal triple graph used as the interchange format of execution plan
//! resources.
//!
//! The graph is only a decoding step: [`plan_from_graph`] maps it onto
//! [`crate::ExecutionPlan`] and nothing else in the crate looks at triples.

use std::collections::HashSet;
use std::fmt;

mod decoder;
mod documents;
mod encode;
mod mapping;
pub mod ntriples;
pub mod rdf_json;
pub mod vocab;

pub use decoder::{DecoderRegistry, GraphDecoder};
pub use documents::{RdfXmlDecoder, TurtleDecoder};
pub use encode::plan_to_graph;
pub use mapping::plan_from_graph;

#[cfg(test)]
pub use decoder::MockGraphDecoder;

/// A literal value with an optional datatype or language tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub value: String,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl Literal {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }
}

/// Subject or object of a triple
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Iri(String),
    BlankNode(String),
    Literal(Literal),
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    pub fn blank(label: impl Into<String>) -> Self {
        Term::BlankNode(label.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal(Literal::plain(value))
    }

    /// `true` for IRIs and blank nodes
    pub fn is_resource(&self) -> bool {
        !matches!(self, Term::Literal(_))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    /// IRI, blank node label or literal value
    pub fn lexical_value(&self) -> &str {
        match self {
            Term::Iri(iri) => iri,
            Term::BlankNode(label) => label,
            Term::Literal(literal) => &literal.value,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(label) => write!(f, "_:{}", label),
            Term::Literal(literal) => write!(f, "\"{}\"", literal.value),
        }
    }
}

/// A subject / predicate / object statement. Predicates are always IRIs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

/// A set of triples that remembers insertion order.
///
/// Property values are ordered lists, so the order in which a decoder
/// encountered the values of a key is kept.
#[derive(Debug, Clone, Default)]
pub struct TripleGraph {
    triples: Vec<Triple>,
    index: HashSet<Triple>,
}

impl TripleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a triple; returns `false` if it was already present
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.index.contains(&triple) {
            return false;
        }
        self.index.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.index.contains(triple)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Triples matching a pattern; `None` matches anything
    pub fn filter<'a, 'p>(
        &'a self,
        subject: Option<&'p Term>,
        predicate: Option<&'p str>,
        object: Option<&'p Term>,
    ) -> impl Iterator<Item = &'a Triple> + 'p
    where
        'a: 'p,
    {
        self.triples.iter().filter(move |triple| {
            subject.map_or(true, |s| &triple.subject == s)
                && predicate.map_or(true, |p| triple.predicate == p)
                && object.map_or(true, |o| &triple.object == o)
        })
    }

    /// Objects of all triples with the given subject and predicate
    pub fn objects<'a, 'p>(
        &'a self,
        subject: &'p Term,
        predicate: &'p str,
    ) -> impl Iterator<Item = &'a Term> + 'p
    where
        'a: 'p,
    {
        self.filter(Some(subject), Some(predicate), None)
            .map(|triple| &triple.object)
    }

    /// Distinct subjects of all triples with the given predicate and object,
    /// in insertion order
    pub fn subjects(&self, predicate: &str, object: &Term) -> Vec<&Term> {
        let mut seen = HashSet::new();
        self.filter(None, Some(predicate), Some(object))
            .map(|triple| &triple.subject)
            .filter(|subject| seen.insert(*subject))
            .collect()
    }
}

impl PartialEq for TripleGraph {
    /// Graphs are equal if they hold the same triples, in any order
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for TripleGraph {}

impl FromIterator<Triple> for TripleGraph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = TripleGraph::new();
        graph.extend(iter);
        graph
    }
}

impl Extend<Triple> for TripleGraph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for triple in iter {
            self.insert(triple);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TripleGraph {
        TripleGraph::from_iter([
            Triple::new(Term::blank("a"), "urn:p", Term::literal("1")),
            Triple::new(Term::blank("a"), "urn:p", Term::literal("2")),
            Triple::new(Term::blank("b"), "urn:p", Term::literal("1")),
            Triple::new(Term::blank("b"), "urn:q", Term::iri("urn:x")),
        ])
    }

    #[test]
    fn test_insert_ignores_duplicates() {
        let mut graph = sample();
        assert!(!graph.insert(Triple::new(Term::blank("a"), "urn:p", Term::literal("1"))));
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn test_filter_patterns() {
        let graph = sample();
        let a = Term::blank("a");
        let one = Term::literal("1");

        assert_eq!(graph.filter(None, None, None).count(), 4);
        assert_eq!(graph.filter(Some(&a), None, None).count(), 2);
        assert_eq!(graph.filter(None, Some("urn:q"), None).count(), 1);
        assert_eq!(graph.filter(None, Some("urn:p"), Some(&one)).count(), 2);
    }

    #[test]
    fn test_objects_keep_insertion_order() {
        let graph = sample();
        let a = Term::blank("a");
        let values: Vec<_> = graph.objects(&a, "urn:p").map(Term::lexical_value).collect();
        assert_eq!(values, vec!["1", "2"]);
    }

    #[test]
    fn test_subjects_are_distinct() {
        let graph = sample();
        let one = Term::literal("1");
        assert_eq!(
            graph.subjects("urn:p", &one),
            vec![&Term::blank("a"), &Term::blank("b")]
        );
    }

    #[test]
    fn test_equality_ignores_order() {
        let forward = sample();
        let backward: TripleGraph = forward.iter().rev().cloned().collect();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_term_helpers() {
        assert!(Term::iri("urn:x").is_resource());
        assert!(Term::blank("b").is_resource());
        assert!(!Term::literal("x").is_resource());
        assert_eq!(Term::literal("x").as_literal(), Some(&Literal::plain("x")));
        assert_eq!(Term::iri("urn:x").to_string(), "<urn:x>");
        assert_eq!(Term::blank("b").to_string(), "_:b");
    }
}
