use std::collections::BTreeMap;
use std::sync::Arc;

use enhancer_dsl::resource::{N_TRIPLES, RDF_JSON, RDF_XML, TURTLE};

use crate::error::DecodeError;
use crate::graph::{ntriples, rdf_json, RdfXmlDecoder, TripleGraph, TurtleDecoder};

/// Alternative identifier used for N-Triples
pub const N_TRIPLES_ALIAS: &str = "text/rdf+nt";

/// Decodes serialized bytes of one format into a triple graph
#[cfg_attr(test, mockall::automock)]
pub trait GraphDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<TripleGraph, DecodeError>;
}

/// Decoders keyed by format identifier
#[derive(Clone)]
pub struct DecoderRegistry {
    decoders: BTreeMap<String, Arc<dyn GraphDecoder>>,
}

impl DecoderRegistry {
    /// A registry without any decoder
    pub fn empty() -> Self {
        Self {
            decoders: BTreeMap::new(),
        }
    }

    /// Register `decoder` for `format`, replacing any previous registration
    pub fn register(&mut self, format: impl Into<String>, decoder: Arc<dyn GraphDecoder>) {
        self.decoders.insert(format.into(), decoder);
    }

    pub fn with(mut self, format: impl Into<String>, decoder: Arc<dyn GraphDecoder>) -> Self {
        self.register(format, decoder);
        self
    }

    pub fn get(&self, format: &str) -> Option<Arc<dyn GraphDecoder>> {
        self.decoders.get(format).cloned()
    }

    pub fn supports(&self, format: &str) -> bool {
        self.decoders.contains_key(format)
    }

    /// Registered format identifiers, sorted
    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.decoders.keys().map(String::as_str)
    }
}

impl Default for DecoderRegistry {
    /// Registry with the built-in N-Triples, RDF/JSON, Turtle and RDF/XML
    /// decoders
    fn default() -> Self {
        let ntriples: Arc<dyn GraphDecoder> = Arc::new(ntriples::NTriplesDecoder);
        Self::empty()
            .with(N_TRIPLES, ntriples.clone())
            .with(N_TRIPLES_ALIAS, ntriples)
            .with(RDF_JSON, Arc::new(rdf_json::RdfJsonDecoder))
            .with(RDF_XML, Arc::new(RdfXmlDecoder))
            .with(TURTLE, Arc::new(TurtleDecoder))
    }
}

impl std::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("formats", &self.formats().collect::<Vec<_>>())
            .finish()
    }
}
