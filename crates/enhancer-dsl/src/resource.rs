//! Resource references of the form `name[;format=<identifier>]`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DslError;

/// RDF/XML
pub const RDF_XML: &str = "application/rdf+xml";
/// RDF/JSON
pub const RDF_JSON: &str = "application/rdf+json";
/// N-Triples
pub const N_TRIPLES: &str = "application/n-triples";
/// Turtle
pub const TURTLE: &str = "text/turtle";
/// Notation 3
pub const N3: &str = "text/rdf+n3";

const FORMAT_PARAMETER: &str = "format";

/// A reference to an externally provided execution plan resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReference {
    /// Name of the watched resource (usually a file name)
    pub name: String,

    /// Explicit format identifier, overriding the extension based guess
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl ResourceReference {
    /// Create a reference without an explicit format
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format: None,
        }
    }

    /// Parse `name[;format=<identifier>]`.
    ///
    /// Parameters other than `format` are ignored. An empty name or an empty
    /// `format` value is an error.
    pub fn parse(value: &str) -> Result<Self, DslError> {
        let mut parts = value.split(';');
        let name = parts.next().unwrap_or_default().trim();
        if name.is_empty() {
            return Err(DslError::InvalidResourceReference(value.to_string()));
        }

        let mut format = None;
        for parameter in parts {
            let Some((key, raw)) = parameter.split_once('=') else {
                continue;
            };
            if key.trim() != FORMAT_PARAMETER {
                continue;
            }
            let raw = raw.trim();
            if raw.is_empty() {
                return Err(DslError::EmptyFormat(value.to_string()));
            }
            format = Some(raw.to_string());
        }

        Ok(Self {
            name: name.to_string(),
            format,
        })
    }

    /// The explicit format, or the one guessed from the resource name
    pub fn resolved_format(&self) -> Option<&str> {
        self.format
            .as_deref()
            .or_else(|| guess_format(&self.name))
    }
}

impl FromStr for ResourceReference {
    type Err = DslError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.format {
            Some(format) => write!(f, "{};{}={}", self.name, FORMAT_PARAMETER, format),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Guess the serialization format of a resource from its file extension
pub fn guess_format(resource_name: &str) -> Option<&'static str> {
    let (_, extension) = resource_name.rsplit_once('.')?;
    match extension.to_ascii_lowercase().as_str() {
        "rdf" | "xml" | "owl" => Some(RDF_XML),
        "json" | "rj" => Some(RDF_JSON),
        "nt" => Some(N_TRIPLES),
        "ttl" => Some(TURTLE),
        "n3" => Some(N3),
        _ => None,
    }
}
