//! Hosts the chains of a configuration file the way an enhancer runtime would.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use enhancer_chain::{
    Chain, ChainError, ChainSource, ChainsFile, ExecutionPlan, GraphChain,
    InMemoryResourceTracker,
};
use tracing::{info, warn};

use crate::data_dir::{DataDirFeeder, SyncReport};

/// State of one configured chain
#[derive(Debug)]
pub struct ChainReport {
    pub name: String,
    pub source: Option<ChainSource>,
    pub outcome: Result<Arc<ExecutionPlan>, ChainError>,
}

impl ChainReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// One line summary: status, chain, source and the execution waves
    pub fn summary(&self) -> String {
        let source = match &self.source {
            Some(ChainSource::List) => "list".to_string(),
            Some(ChainSource::Resource { name, format }) => format!("{} ({})", name, format),
            None => "-".to_string(),
        };
        match &self.outcome {
            Ok(plan) => {
                let waves: Vec<String> = plan
                    .execution_order()
                    .iter()
                    .map(|wave| format!("[{}]", wave.join(", ")))
                    .collect();
                format!("ok    {} <{}> {}", self.name, source, waves.join(" -> "))
            }
            Err(err) => format!("FAIL  {} <{}> {}: {}", self.name, source, err.error_code(), err),
        }
    }
}

/// All chains of a [`ChainsFile`], fed from an optional data directory
pub struct ChainHost {
    tracker: Arc<InMemoryResourceTracker>,
    feeder: Option<DataDirFeeder>,
    chains: BTreeMap<String, GraphChain>,
    activation_errors: BTreeMap<String, ChainError>,
}

impl ChainHost {
    /// Load the data directory (if any) and activate every configured chain.
    ///
    /// `data_dir` overrides the directory named in the configuration file.
    /// Chains that fail to activate are kept as failures in [`Self::reports`].
    pub fn start(file: &ChainsFile, data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let tracker = Arc::new(InMemoryResourceTracker::new());
        let feeder = data_dir
            .or_else(|| file.data_dir.clone())
            .map(|dir| DataDirFeeder::new(dir, tracker.clone()));

        let host = Self {
            tracker,
            feeder,
            chains: BTreeMap::new(),
            activation_errors: BTreeMap::new(),
        };
        host.sync()?;
        Ok(host.activate_all(file))
    }

    fn activate_all(mut self, file: &ChainsFile) -> Self {
        for config in &file.chains {
            let chain = GraphChain::new(self.tracker.clone());
            match chain.activate(config) {
                Ok(()) => {
                    self.chains.insert(config.name.clone(), chain);
                }
                Err(err) => {
                    warn!(chain = %config.name, error = %err, "Chain activation failed");
                    self.activation_errors.insert(config.name.clone(), err);
                }
            }
        }
        info!(
            active = self.chains.len(),
            failed = self.activation_errors.len(),
            "Chains activated"
        );
        self
    }

    /// Re-read the data directory, a no-op without one
    pub fn sync(&self) -> anyhow::Result<SyncReport> {
        match &self.feeder {
            Some(feeder) => feeder
                .sync()
                .with_context(|| format!("Failed to read data directory {}", feeder.dir().display())),
            None => Ok(SyncReport::default()),
        }
    }

    pub fn chain(&self, name: &str) -> Option<&GraphChain> {
        self.chains.get(name)
    }

    /// Report for every configured chain, ordered by name
    pub fn reports(&self) -> Vec<ChainReport> {
        let active = self.chains.iter().map(|(name, chain)| ChainReport {
            name: name.clone(),
            source: chain.source(),
            outcome: chain.execution_plan(),
        });
        let failed = self.activation_errors.iter().map(|(name, err)| ChainReport {
            name: name.clone(),
            source: None,
            outcome: Err(err.clone()),
        });

        let mut reports: Vec<ChainReport> = active.chain(failed).collect();
        reports.sort_by(|a, b| a.name.cmp(&b.name));
        reports
    }

    /// Plan of a single chain
    pub fn plan(&self, name: &str) -> anyhow::Result<Arc<ExecutionPlan>> {
        if let Some(err) = self.activation_errors.get(name) {
            return Err(err.clone()).with_context(|| format!("Chain '{}' failed to activate", name));
        }
        let chain = self
            .chain(name)
            .with_context(|| format!("No chain named '{}' is configured", name))?;
        chain
            .execution_plan()
            .with_context(|| format!("Chain '{}' has no execution plan", name))
    }
}
