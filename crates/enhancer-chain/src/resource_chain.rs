//! A chain whose execution plan is read from a watched resource.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use enhancer_dsl::ResourceReference;
use tracing::{debug, warn};

use crate::error::{ChainError, PlanBuildError};
use crate::graph::{plan_from_graph, DecoderRegistry};
use crate::plan::{ExecutionPlan, Properties};
use crate::tracker::{ResourceListener, WatchDecision};
use crate::validation;
use crate::Chain;

/// Cache state of the watched execution plan
enum PlanState {
    /// No bytes received, or the resource was removed
    Unavailable,
    /// Bytes received but not yet decoded
    RawAvailable(Vec<u8>),
    /// Decoded and validated plan
    Compiled(Arc<ExecutionPlan>),
}

/// Observable summary of the cache state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    Unavailable,
    Pending,
    Compiled,
}

/// [`Chain`] backed by an execution plan resource.
///
/// Resource events only swap the cached state; decoding happens lazily on
/// the next read. A read after a failed decode retries with the same bytes.
pub struct ResourceChain {
    name: String,
    resource: String,
    format: String,
    decoders: DecoderRegistry,
    chain_properties: Properties,
    state: Mutex<PlanState>,
}

impl ResourceChain {
    /// Create the chain; the format comes from the reference or is guessed
    /// from the resource name.
    pub fn new(
        name: impl Into<String>,
        reference: &ResourceReference,
        decoders: DecoderRegistry,
        chain_properties: Properties,
    ) -> Result<Self, ChainError> {
        let name = name.into();
        let format = reference.resolved_format().ok_or_else(|| {
            ChainError::configuration(
                &name,
                format!(
                    "Unable to detect the format of resource '{}'; configure it as '{};format=<format>'",
                    reference.name, reference.name
                ),
            )
        })?;
        validation::validate_chain_properties(&chain_properties)
            .map_err(|err| ChainError::plan_build(&name, err))?;

        Ok(Self {
            format: format.to_string(),
            resource: reference.name.clone(),
            name,
            decoders,
            chain_properties,
            state: Mutex::new(PlanState::Unavailable),
        })
    }

    pub fn resource_name(&self) -> &str {
        &self.resource
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn status(&self) -> PlanStatus {
        match &*self.lock_state() {
            PlanState::Unavailable => PlanStatus::Unavailable,
            PlanState::RawAvailable(_) => PlanStatus::Pending,
            PlanState::Compiled(_) => PlanStatus::Compiled,
        }
    }

    // State changes are single assignments, a poisoned lock still holds a
    // consistent state.
    fn lock_state(&self) -> MutexGuard<'_, PlanState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn compile(&self, bytes: &[u8]) -> Result<ExecutionPlan, PlanBuildError> {
        let decoder = self
            .decoders
            .get(&self.format)
            .ok_or_else(|| PlanBuildError::UnsupportedFormat(self.format.clone()))?;
        let graph = decoder
            .decode(bytes)
            .map_err(|source| PlanBuildError::Decode {
                resource: self.resource.clone(),
                source,
            })?;
        Ok(plan_from_graph(&graph, &self.name)?.with_default_chain_properties(&self.chain_properties))
    }

    fn is_watched(&self, name: &str) -> bool {
        if name == self.resource {
            return true;
        }
        warn!(
            chain = %self.name,
            watched = %self.resource,
            resource = name,
            "Ignoring event for a resource this chain does not watch"
        );
        false
    }
}

impl ResourceListener for ResourceChain {
    fn on_available(&self, name: &str, bytes: &[u8]) -> WatchDecision {
        if self.is_watched(name) {
            *self.lock_state() = PlanState::RawAvailable(bytes.to_vec());
            debug!(chain = %self.name, resource = name, bytes = bytes.len(), "Execution plan resource updated");
        }
        WatchDecision::KeepWatching
    }

    fn on_unavailable(&self, name: &str) -> WatchDecision {
        if self.is_watched(name) {
            *self.lock_state() = PlanState::Unavailable;
            debug!(chain = %self.name, resource = name, "Execution plan resource removed");
        }
        WatchDecision::KeepWatching
    }
}

impl Chain for ResourceChain {
    fn name(&self) -> Result<String, ChainError> {
        Ok(self.name.clone())
    }

    fn execution_plan(&self) -> Result<Arc<ExecutionPlan>, ChainError> {
        let mut state = self.lock_state();
        let plan = match &*state {
            PlanState::Compiled(plan) => return Ok(plan.clone()),
            PlanState::Unavailable => {
                return Err(ChainError::ResourceUnavailable {
                    chain: self.name.clone(),
                    resource: self.resource.clone(),
                })
            }
            PlanState::RawAvailable(bytes) => self.compile(bytes),
        };

        match plan {
            Ok(plan) => {
                let plan = Arc::new(plan);
                *state = PlanState::Compiled(plan.clone());
                debug!(chain = %self.name, nodes = plan.node_count(), "Execution plan compiled");
                Ok(plan)
            }
            Err(err) => {
                warn!(chain = %self.name, resource = %self.resource, error = %err, "Unable to compile execution plan");
                Err(ChainError::plan_build(&self.name, err))
            }
        }
    }
}

impl std::fmt::Debug for ResourceChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceChain")
            .field("name", &self.name)
            .field("resource", &self.resource)
            .field("format", &self.format)
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::graph::{ntriples, plan_to_graph, vocab, MockGraphDecoder, Term, Triple, TripleGraph};
    use crate::plan::ExecutionNode;
    use crate::validation::error_codes;
    use enhancer_dsl::resource::{N3, N_TRIPLES, TURTLE};

    fn plan_bytes(names: &[&str]) -> Vec<u8> {
        let plan = ExecutionPlan::from_nodes(
            "default",
            Properties::new(),
            names.iter().map(|name| ExecutionNode::new(*name)),
        )
        .unwrap();
        ntriples::write(&plan_to_graph(&plan)).into_bytes()
    }

    fn chain() -> ResourceChain {
        ResourceChain::new(
            "default",
            &ResourceReference::new("plan.nt"),
            DecoderRegistry::default(),
            Properties::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_default_chain_property_value_rejected() {
        let result = ResourceChain::new(
            "default",
            &ResourceReference::new("plan.nt"),
            DecoderRegistry::default(),
            Properties::from([("lang".to_string(), vec!["en".to_string(), "en".to_string()])]),
        );
        let err = result.err().unwrap();
        assert_eq!(err.error_code(), error_codes::DUPLICATE_PROPERTY_VALUE);
    }

    #[test]
    fn test_unavailable_until_bytes_arrive() {
        let chain = chain();
        assert_eq!(chain.status(), PlanStatus::Unavailable);
        assert!(matches!(
            chain.execution_plan(),
            Err(ChainError::ResourceUnavailable { .. })
        ));
        assert_eq!(chain.format(), N_TRIPLES);
    }

    #[test]
    fn test_lazy_compile_and_cache() {
        let chain = chain();
        chain.on_available("plan.nt", &plan_bytes(&["a", "b"]));
        assert_eq!(chain.status(), PlanStatus::Pending);

        let first = chain.execution_plan().unwrap();
        assert_eq!(chain.status(), PlanStatus::Compiled);
        let second = chain.execution_plan().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(chain.engines().unwrap().len(), 2);
    }

    #[test]
    fn test_update_invalidates_compiled_plan() {
        let chain = chain();
        chain.on_available("plan.nt", &plan_bytes(&["a"]));
        assert_eq!(chain.execution_plan().unwrap().node_count(), 1);

        chain.on_available("plan.nt", &plan_bytes(&["a", "b", "c"]));
        assert_eq!(chain.status(), PlanStatus::Pending);
        assert_eq!(chain.execution_plan().unwrap().node_count(), 3);
    }

    #[test]
    fn test_bad_bytes_fail_closed_and_retry() {
        let chain = chain();
        chain.on_available("plan.nt", &plan_bytes(&["a"]));
        chain.execution_plan().unwrap();

        chain.on_available("plan.nt", b"not n-triples");
        for _ in 0..2 {
            let err = chain.execution_plan().unwrap_err();
            assert_eq!(err.error_code(), "ERR_PLAN_DECODE");
            assert_eq!(chain.status(), PlanStatus::Pending);
        }
    }

    #[test]
    fn test_invalid_plan_is_a_plan_build_error() {
        let chain = chain();
        chain.on_available("plan.nt", b"");
        let err = chain.execution_plan().unwrap_err();
        assert!(matches!(
            err,
            ChainError::PlanBuild {
                source: PlanBuildError::EmptyPlan,
                ..
            }
        ));
    }

    #[test]
    fn test_removal_discards_state() {
        let chain = chain();
        chain.on_available("plan.nt", &plan_bytes(&["a"]));
        chain.execution_plan().unwrap();

        assert_eq!(chain.on_unavailable("plan.nt"), WatchDecision::KeepWatching);
        assert!(matches!(
            chain.execution_plan(),
            Err(ChainError::ResourceUnavailable { .. })
        ));

        chain.on_available("plan.nt", &plan_bytes(&["x"]));
        assert!(chain.engines().unwrap().contains("x"));
    }

    #[test]
    fn test_foreign_resource_events_are_ignored() {
        let chain = chain();
        chain.on_available("plan.nt", &plan_bytes(&["a"]));
        chain.execution_plan().unwrap();

        chain.on_available("other.nt", &plan_bytes(&["b"]));
        chain.on_unavailable("other.nt");
        assert_eq!(chain.status(), PlanStatus::Compiled);
        assert!(chain.engines().unwrap().contains("a"));
    }

    #[test]
    fn test_unknown_extension_requires_explicit_format() {
        let err = ResourceChain::new(
            "default",
            &ResourceReference::new("plan.data"),
            DecoderRegistry::default(),
            Properties::new(),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "ERR_CHAIN_CONFIGURATION");
    }

    #[test]
    fn test_unregistered_format_fails_on_read() {
        let chain = ResourceChain::new(
            "default",
            &ResourceReference::parse("plan.n3").unwrap(),
            DecoderRegistry::default(),
            Properties::new(),
        )
        .unwrap();
        assert_eq!(chain.format(), N3);

        chain.on_available("plan.n3", b"@prefix ep: <urn:x> .");
        let err = chain.execution_plan().unwrap_err();
        assert_eq!(err.error_code(), "ERR_PLAN_UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_decoder_runs_once_per_update() {
        let graph = plan_to_graph(
            &ExecutionPlan::from_nodes("default", Properties::new(), vec![ExecutionNode::new("a")])
                .unwrap(),
        );
        let mut decoder = MockGraphDecoder::new();
        decoder
            .expect_decode()
            .times(2)
            .returning(move |_| Ok(graph.clone()));

        let chain = ResourceChain::new(
            "default",
            &ResourceReference::parse("plan;format=text/turtle").unwrap(),
            DecoderRegistry::empty().with(TURTLE, Arc::new(decoder)),
            Properties::new(),
        )
        .unwrap();

        chain.on_available("plan", b"v1");
        chain.on_available("plan", b"v2");
        for _ in 0..3 {
            chain.execution_plan().unwrap();
        }
        chain.on_available("plan", b"v3");
        chain.execution_plan().unwrap();
    }

    #[test]
    fn test_decode_error_is_wrapped_with_resource_name() {
        let mut decoder = MockGraphDecoder::new();
        decoder.expect_decode().returning(|_| {
            Err(DecodeError::Syntax {
                line: 3,
                message: "boom".to_string(),
            })
        });

        let chain = ResourceChain::new(
            "default",
            &ResourceReference::parse("plan;format=text/turtle").unwrap(),
            DecoderRegistry::empty().with(TURTLE, Arc::new(decoder)),
            Properties::new(),
        )
        .unwrap();
        chain.on_available("plan", b"x");

        let message = chain.execution_plan().unwrap_err().to_string();
        assert!(message.contains("resource 'plan'"), "{}", message);
        assert!(message.contains("line 3"), "{}", message);
    }

    #[test]
    fn test_graph_validation_errors_surface() {
        let chain = chain();
        let mut graph = TripleGraph::new();
        graph.insert(Triple::new(
            Term::blank("n"),
            vocab::RDF_TYPE,
            Term::iri(vocab::EXECUTION_NODE),
        ));
        chain.on_available("plan.nt", ntriples::write(&graph).as_bytes());

        let err = chain.execution_plan().unwrap_err();
        assert_eq!(err.error_code(), error_codes::MISSING_ENGINE);
    }
}
