//! IRIs of the execution plan vocabulary.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

/// Namespace of the execution plan vocabulary
pub const EXECUTION_PLAN_NS: &str = "http://stanbol.apache.org/ontology/enhancer/executionplan#";

pub const EXECUTION_PLAN: &str = "http://stanbol.apache.org/ontology/enhancer/executionplan#ExecutionPlan";
pub const EXECUTION_NODE: &str = "http://stanbol.apache.org/ontology/enhancer/executionplan#ExecutionNode";
pub const HAS_EXECUTION_NODE: &str =
    "http://stanbol.apache.org/ontology/enhancer/executionplan#hasExecutionNode";
pub const ENGINE: &str = "http://stanbol.apache.org/ontology/enhancer/executionplan#engine";
pub const DEPENDS_ON: &str = "http://stanbol.apache.org/ontology/enhancer/executionplan#dependsOn";
pub const OPTIONAL: &str = "http://stanbol.apache.org/ontology/enhancer/executionplan#optional";
pub const CHAIN: &str = "http://stanbol.apache.org/ontology/enhancer/executionplan#chain";

/// Namespace of chain and node properties; the local name is the property key
pub const ENHANCEMENT_PROPERTIES_NS: &str =
    "http://stanbol.apache.org/ontology/enhancer/enhancementproperties#";

/// Characters of a property key kept as is in its local name (RFC 3986
/// unreserved)
const LOCAL_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Predicate IRI of a chain or node property; the key is percent-encoded
pub fn property_iri(key: &str) -> String {
    format!(
        "{}{}",
        ENHANCEMENT_PROPERTIES_NS,
        utf8_percent_encode(key, LOCAL_NAME)
    )
}

/// Property key of a predicate in the enhancement properties namespace
pub fn property_key(predicate: &str) -> Option<String> {
    predicate
        .strip_prefix(ENHANCEMENT_PROPERTIES_NS)
        .filter(|local| !local.is_empty())
        .map(|local| percent_decode_str(local).decode_utf8_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_share_namespace() {
        for iri in [EXECUTION_PLAN, EXECUTION_NODE, HAS_EXECUTION_NODE, ENGINE, DEPENDS_ON, OPTIONAL, CHAIN] {
            assert!(iri.starts_with(EXECUTION_PLAN_NS), "{} outside namespace", iri);
        }
    }

    #[test]
    fn test_property_key_round_trip() {
        assert_eq!(property_key(&property_iri("language")).as_deref(), Some("language"));
        assert_eq!(property_key(ENHANCEMENT_PROPERTIES_NS), None);
        assert_eq!(property_key(ENGINE), None);
    }

    #[test]
    fn test_property_iri_encodes_key() {
        assert_eq!(
            property_iri("my key"),
            format!("{}my%20key", ENHANCEMENT_PROPERTIES_NS)
        );
        assert_eq!(
            property_iri("a>b#c"),
            format!("{}a%3Eb%23c", ENHANCEMENT_PROPERTIES_NS)
        );
        assert_eq!(property_iri("max-len_v1.0~"), format!("{}max-len_v1.0~", ENHANCEMENT_PROPERTIES_NS));

        for key in ["my key", "100%", "a>b#c", "sprache/ü"] {
            let iri = property_iri(key);
            assert!(!iri.contains(' ') && !iri.contains('>'), "{} not encoded", iri);
            assert_eq!(property_key(&iri).as_deref(), Some(key));
        }
    }
}
