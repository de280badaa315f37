//! # Enhancer Chain
//!
//! Compiles enhancement chain configurations into validated execution plans
//! and serves them to the execution runtime.
//!
//! A chain is configured either with chain list lines (see
//! [`enhancer_dsl`]) or with a reference to an execution plan resource, a
//! serialized triple graph delivered by a [`ResourceTracker`]. Both sources
//! produce the same [`ExecutionPlan`]: a set of uniquely named
//! [`ExecutionNode`]s whose `dependsOn` edges are referentially closed and
//! acyclic.
//!
//! ## Example
//!
//! ```
//! use enhancer_chain::{Chain, ChainConfig, GraphChain};
//!
//! let chain = GraphChain::without_tracker();
//! chain
//!     .activate(&ChainConfig::list(
//!         "default",
//!         ["metaxa", "langId;dependsOn=metaxa", "ner;dependsOn=langId;optional"],
//!     ))
//!     .unwrap();
//!
//! let plan = chain.execution_plan().unwrap();
//! assert!(plan.node("ner").unwrap().optional);
//! assert_eq!(plan.execution_order(), vec![vec!["metaxa"], vec!["langId"], vec!["ner"]]);
//! ```
//!
//! Resource backed chains decode lazily: resource updates only invalidate
//! the cached plan, the next reader rebuilds it.
//!
//! ```
//! use std::sync::Arc;
//! use enhancer_chain::{Chain, ChainConfig, ChainError, GraphChain, InMemoryResourceTracker};
//!
//! let tracker = Arc::new(InMemoryResourceTracker::new());
//! let chain = GraphChain::new(tracker.clone());
//! chain.activate(&ChainConfig::resource("default", "plan.nt")).unwrap();
//!
//! assert!(matches!(chain.execution_plan(), Err(ChainError::ResourceUnavailable { .. })));
//!
//! tracker.publish(
//!     "plan.nt",
//!     "_:n <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> \
//!      <http://stanbol.apache.org/ontology/enhancer/executionplan#ExecutionNode> .\n\
//!      _:n <http://stanbol.apache.org/ontology/enhancer/executionplan#engine> \"tika\" .\n",
//! );
//! assert!(chain.engines().unwrap().contains("tika"));
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

mod error;
mod graph_chain;
mod list_chain;
mod resource_chain;

pub mod config;
pub mod graph;
pub mod plan;
pub mod tracker;
pub mod validation;

pub use config::{ChainConfig, ChainsFile, ConfigError};
pub use error::{ChainError, DecodeError, PlanBuildError};
pub use graph::DecoderRegistry;
pub use graph_chain::{ChainSource, GraphChain};
pub use list_chain::ListChain;
pub use plan::{build_plan, ExecutionNode, ExecutionPlan, Properties};
pub use resource_chain::{PlanStatus, ResourceChain};
pub use tracker::{InMemoryResourceTracker, ResourceListener, ResourceTracker, TrackingId, WatchDecision};

/// A named chain of enhancement stages and its execution plan.
///
/// Implementations are shared between reader threads.
pub trait Chain: Send + Sync {
    /// Name of the chain
    fn name(&self) -> Result<String, ChainError>;

    /// The current execution plan
    fn execution_plan(&self) -> Result<Arc<ExecutionPlan>, ChainError>;

    /// Names of the engines referenced by the current execution plan
    fn engines(&self) -> Result<BTreeSet<String>, ChainError> {
        Ok(self.execution_plan()?.engines())
    }
}
