//! Turtle and RDF/XML decoders.
//!
//! Both formats are parsed with the oxigraph parsers and converted into a
//! [`TripleGraph`]. Literals typed `xsd:string` or `rdf:langString` become
//! plain literals, as in the line based formats.

use oxrdf::vocab::{rdf, xsd};
use oxrdfxml::RdfXmlParser;
use oxttl::TurtleParser;
use tracing::trace;

use crate::error::DecodeError;
use crate::graph::{GraphDecoder, Literal, Term, Triple, TripleGraph};

/// Decoder for `text/turtle`
#[derive(Debug, Default, Clone, Copy)]
pub struct TurtleDecoder;

impl GraphDecoder for TurtleDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<TripleGraph, DecodeError> {
        collect("Turtle", TurtleParser::new().for_reader(bytes))
    }
}

/// Decoder for `application/rdf+xml`
#[derive(Debug, Default, Clone, Copy)]
pub struct RdfXmlDecoder;

impl GraphDecoder for RdfXmlDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<TripleGraph, DecodeError> {
        collect("RDF/XML", RdfXmlParser::new().for_reader(bytes))
    }
}

fn collect<E: std::fmt::Display>(
    format: &'static str,
    triples: impl Iterator<Item = Result<oxrdf::Triple, E>>,
) -> Result<TripleGraph, DecodeError> {
    let mut graph = TripleGraph::new();
    for triple in triples {
        let triple = triple.map_err(|err| DecodeError::Document {
            format,
            message: err.to_string(),
        })?;
        graph.insert(convert(triple, format)?);
    }
    trace!(format, triples = graph.len(), "Decoded RDF document");
    Ok(graph)
}

fn convert(triple: oxrdf::Triple, format: &'static str) -> Result<Triple, DecodeError> {
    let subject = match triple.subject {
        oxrdf::Subject::NamedNode(node) => Term::Iri(node.into_string()),
        oxrdf::Subject::BlankNode(node) => Term::BlankNode(node.into_string()),
        #[allow(unreachable_patterns)]
        _ => return Err(quoted_triple(format)),
    };
    let object = match triple.object {
        oxrdf::Term::NamedNode(node) => Term::Iri(node.into_string()),
        oxrdf::Term::BlankNode(node) => Term::BlankNode(node.into_string()),
        oxrdf::Term::Literal(literal) => Term::Literal(convert_literal(&literal)),
        #[allow(unreachable_patterns)]
        _ => return Err(quoted_triple(format)),
    };
    Ok(Triple::new(subject, triple.predicate.into_string(), object))
}

fn convert_literal(literal: &oxrdf::Literal) -> Literal {
    let mut converted = Literal::plain(literal.value());
    if let Some(language) = literal.language() {
        converted.language = Some(language.to_string());
    } else if literal.datatype() != xsd::STRING && literal.datatype() != rdf::LANG_STRING {
        converted.datatype = Some(literal.datatype().as_str().to_string());
    }
    converted
}

fn quoted_triple(format: &'static str) -> DecodeError {
    DecodeError::Document {
        format,
        message: "quoted triples are not supported".to_string(),
    }
}
