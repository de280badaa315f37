//! The chain facade handed to the execution runtime.

use std::sync::{Arc, PoisonError, RwLock};

use enhancer_dsl::ResourceReference;
use tracing::{debug, info, warn};

use crate::config::ChainConfig;
use crate::error::ChainError;
use crate::graph::DecoderRegistry;
use crate::list_chain::ListChain;
use crate::plan::ExecutionPlan;
use crate::resource_chain::ResourceChain;
use crate::tracker::{ResourceTracker, TrackingId};
use crate::Chain;

/// Where the plan of the active chain comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainSource {
    /// Chain list lines from the configuration
    List,
    /// A watched execution plan resource
    Resource { name: String, format: String },
}

struct Active {
    chain: Arc<dyn Chain>,
    source: ChainSource,
    tracking: Option<TrackingId>,
}

/// A [`Chain`] activated from a [`ChainConfig`].
///
/// A configured `graph_resource` always wins over `chain_list`. All calls
/// fail with [`ChainError::NotActive`] before activation and after
/// deactivation.
pub struct GraphChain {
    tracker: Option<Arc<dyn ResourceTracker>>,
    decoders: DecoderRegistry,
    active: RwLock<Option<Active>>,
}

impl GraphChain {
    /// Facade whose resource chains are fed by `tracker`
    pub fn new(tracker: Arc<dyn ResourceTracker>) -> Self {
        Self {
            tracker: Some(tracker),
            decoders: DecoderRegistry::default(),
            active: RwLock::new(None),
        }
    }

    /// Facade without a resource tracker. Resource chains stay unavailable.
    pub fn without_tracker() -> Self {
        Self {
            tracker: None,
            decoders: DecoderRegistry::default(),
            active: RwLock::new(None),
        }
    }

    /// Replace the decoders used by resource chains activated afterwards
    pub fn with_decoders(mut self, decoders: DecoderRegistry) -> Self {
        self.decoders = decoders;
        self
    }

    /// Activate (or re-activate) the chain.
    ///
    /// A previously active configuration is deactivated first, also if the
    /// new configuration turns out to be invalid.
    pub fn activate(&self, config: &ChainConfig) -> Result<(), ChainError> {
        self.deactivate();

        let name = config.name.trim();
        if name.is_empty() {
            return Err(ChainError::configuration(
                name,
                "the chain name must not be empty",
            ));
        }

        let active = match config.graph_resource() {
            Some(reference) => {
                if !config.chain_list.is_empty() {
                    debug!(chain = name, "Chain list ignored, graph resource takes precedence");
                }
                self.activate_resource(name, reference, config)?
            }
            None if !config.chain_list.is_empty() => Active {
                chain: Arc::new(ListChain::new(
                    name,
                    &config.chain_list,
                    config.chain_properties.clone(),
                )?),
                source: ChainSource::List,
                tracking: None,
            },
            None => {
                return Err(ChainError::configuration(
                    name,
                    "neither a graph resource nor a chain list is configured",
                ))
            }
        };

        info!(chain = name, source = ?active.source, "Chain activated");
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(active);
        Ok(())
    }

    fn activate_resource(
        &self,
        name: &str,
        reference: &str,
        config: &ChainConfig,
    ) -> Result<Active, ChainError> {
        let reference =
            ResourceReference::parse(reference).map_err(|err| ChainError::from_dsl(name, err))?;
        let chain = Arc::new(ResourceChain::new(
            name,
            &reference,
            self.decoders.clone(),
            config.chain_properties.clone(),
        )?);
        let source = ChainSource::Resource {
            name: chain.resource_name().to_string(),
            format: chain.format().to_string(),
        };

        let tracking = match &self.tracker {
            Some(tracker) => Some(tracker.add(chain.resource_name(), chain.clone())),
            None => {
                warn!(
                    chain = name,
                    resource = chain.resource_name(),
                    "No resource tracker available, the execution plan will stay unavailable"
                );
                None
            }
        };

        Ok(Active {
            chain,
            source,
            tracking,
        })
    }

    /// Release the resource watch (if any) and drop the active chain
    pub fn deactivate(&self) {
        let previous = self
            .active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(previous) = previous else {
            return;
        };
        if let (Some(id), Some(tracker)) = (previous.tracking, &self.tracker) {
            tracker.remove(id);
        }
        info!(chain = ?previous.chain.name().ok(), "Chain deactivated");
    }

    pub fn is_active(&self) -> bool {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Source of the active chain
    pub fn source(&self) -> Option<ChainSource> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|active| active.source.clone())
    }

    fn current(&self) -> Result<Arc<dyn Chain>, ChainError> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|active| active.chain.clone())
            .ok_or(ChainError::NotActive)
    }
}

impl Chain for GraphChain {
    fn name(&self) -> Result<String, ChainError> {
        self.current()?.name()
    }

    fn execution_plan(&self) -> Result<Arc<ExecutionPlan>, ChainError> {
        self.current()?.execution_plan()
    }

    fn engines(&self) -> Result<std::collections::BTreeSet<String>, ChainError> {
        self.current()?.engines()
    }
}

impl Drop for GraphChain {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::InMemoryResourceTracker;

    const PLAN: &str = concat!(
        "_:n1 <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://stanbol.apache.org/ontology/enhancer/executionplan#ExecutionNode> .\n",
        "_:n1 <http://stanbol.apache.org/ontology/enhancer/executionplan#engine> \"tika\" .\n",
    );

    #[test]
    fn test_not_active_before_activation() {
        let chain = GraphChain::without_tracker();
        assert!(!chain.is_active());
        assert_eq!(chain.name(), Err(ChainError::NotActive));
        assert_eq!(chain.execution_plan().unwrap_err(), ChainError::NotActive);
        assert_eq!(chain.engines(), Err(ChainError::NotActive));
    }

    #[test]
    fn test_list_activation_and_deactivation() {
        let chain = GraphChain::without_tracker();
        chain
            .activate(&ChainConfig::list("default", ["a", "b;dependsOn=a"]))
            .unwrap();

        assert_eq!(chain.source(), Some(ChainSource::List));
        assert_eq!(chain.name().unwrap(), "default");
        assert_eq!(chain.engines().unwrap().len(), 2);

        chain.deactivate();
        assert_eq!(chain.name(), Err(ChainError::NotActive));
        assert!(chain.source().is_none());
    }

    #[test]
    fn test_resource_activation_registers_and_releases_watch() {
        let tracker = Arc::new(InMemoryResourceTracker::new());
        tracker.publish("plan.nt", PLAN);
        let chain = GraphChain::new(tracker.clone());

        chain
            .activate(&ChainConfig::resource("default", "plan.nt"))
            .unwrap();
        assert_eq!(tracker.listener_count(), 1);
        assert_eq!(
            chain.source(),
            Some(ChainSource::Resource {
                name: "plan.nt".to_string(),
                format: "application/n-triples".to_string()
            })
        );
        assert!(chain.engines().unwrap().contains("tika"));

        chain.deactivate();
        assert_eq!(tracker.listener_count(), 0);
    }

    #[test]
    fn test_reactivation_replaces_previous_chain() {
        let tracker = Arc::new(InMemoryResourceTracker::new());
        let chain = GraphChain::new(tracker.clone());

        chain
            .activate(&ChainConfig::resource("default", "plan.nt"))
            .unwrap();
        chain
            .activate(&ChainConfig::list("default", ["x"]))
            .unwrap();

        assert_eq!(tracker.listener_count(), 0);
        assert!(chain.engines().unwrap().contains("x"));
    }

    #[test]
    fn test_failed_activation_leaves_chain_inactive() {
        let chain = GraphChain::without_tracker();
        chain.activate(&ChainConfig::list("default", ["a"])).unwrap();

        let err = chain
            .activate(&ChainConfig::list("default", ["a;dependsOn=b"]))
            .unwrap_err();
        assert!(matches!(err, ChainError::PlanBuild { .. }));
        assert!(!chain.is_active());
    }

    #[test]
    fn test_configuration_errors() {
        let chain = GraphChain::without_tracker();
        for config in [
            ChainConfig::list("", ["a"]),
            ChainConfig::default(),
            ChainConfig::list("default", Vec::<String>::new()),
            ChainConfig::resource("default", "plan.rdf;format="),
            ChainConfig::resource("default", "plan.unknown"),
        ] {
            let err = chain.activate(&config).unwrap_err();
            assert!(
                matches!(err, ChainError::Configuration { .. }),
                "{:?} gave {:?}",
                config,
                err
            );
        }
    }

    #[test]
    fn test_without_tracker_resource_stays_unavailable() {
        let chain = GraphChain::without_tracker();
        chain
            .activate(&ChainConfig::resource("default", "plan.nt"))
            .unwrap();
        assert!(matches!(
            chain.execution_plan(),
            Err(ChainError::ResourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_drop_releases_watch() {
        let tracker = Arc::new(InMemoryResourceTracker::new());
        {
            let chain = GraphChain::new(tracker.clone());
            chain
                .activate(&ChainConfig::resource("default", "plan.nt"))
                .unwrap();
            assert_eq!(tracker.listener_count(), 1);
        }
        assert_eq!(tracker.listener_count(), 0);
    }
}
