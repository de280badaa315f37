//! Activation configuration of chains.
//!
//! ```yaml
//! chains:
//!   - name: default
//!     chain_list:
//!       - metaxa
//!       - langId;dependsOn=metaxa
//!     chain_properties:
//!       language: [en, de]
//!       threshold: 0.7
//!   - name: managed
//!     graph_resource: managed.nt
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::plan::Properties;

/// Errors raised while loading a chains file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read configuration file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Chain '{0}' is configured more than once")]
    DuplicateChain(String),
}

/// Configuration of a single chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Name of the chain
    pub name: String,

    /// `name[;format=<id>]` reference to an execution plan resource. Takes
    /// precedence over `chain_list`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_resource: Option<String>,

    /// Chain list lines
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain_list: Vec<String>,

    /// Chain level properties; scalar values are read as single element lists
    #[serde(
        default,
        deserialize_with = "deserialize_properties",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub chain_properties: Properties,
}

impl ChainConfig {
    /// Configuration of a list based chain
    pub fn list<I, S>(name: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            chain_list: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Configuration of a resource based chain
    pub fn resource(name: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph_resource: Some(reference.into()),
            ..Self::default()
        }
    }

    pub fn with_chain_list<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chain_list = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_chain_property<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.chain_properties
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// The configured graph resource, ignoring blank values
    pub fn graph_resource(&self) -> Option<&str> {
        self.graph_resource
            .as_deref()
            .map(str::trim)
            .filter(|reference| !reference.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Bool(value) => value.to_string(),
            Scalar::Int(value) => value.to_string(),
            Scalar::Float(value) => value.to_string(),
            Scalar::Str(value) => value,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PropertyValue {
    Many(Vec<Scalar>),
    One(Scalar),
}

fn deserialize_properties<'de, D>(deserializer: D) -> Result<Properties, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, PropertyValue>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            let values = match value {
                PropertyValue::Many(values) => values.into_iter().map(Scalar::into_string).collect(),
                PropertyValue::One(value) => vec![value.into_string()],
            };
            (key, values)
        })
        .collect())
}

/// A file configuring several chains
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainsFile {
    /// Directory holding the execution plan resources; relative paths are
    /// resolved against the configuration file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub chains: Vec<ChainConfig>,
}

impl ChainsFile {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: ChainsFile = serde_yaml::from_str(yaml)?;

        let mut seen = HashSet::new();
        for chain in &file.chains {
            if !seen.insert(chain.name.as_str()) {
                return Err(ConfigError::DuplicateChain(chain.name.clone()));
            }
        }

        Ok(file)
    }

    /// Load a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut file = Self::from_yaml_str(&yaml)?;

        if let (Some(data_dir), Some(parent)) = (&file.data_dir, path.parent()) {
            if data_dir.is_relative() {
                file.data_dir = Some(parent.join(data_dir));
            }
        }

        info!(path = %path.display(), chains = file.chains.len(), "Loaded chain configuration");
        Ok(file)
    }

    pub fn chain(&self, name: &str) -> Option<&ChainConfig> {
        self.chains.iter().find(|chain| chain.name == name)
    }
}
