use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration of a single stage as written in one chain list line
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageConfig {
    /// Name of the stage (the engine name)
    pub name: String,

    /// `true` if the `optional` clause is present
    #[serde(default)]
    pub optional: bool,

    /// Targets of the `dependsOn` clause in configuration order, without duplicates
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Every other `key=v1,v2` clause. Values keep their configuration order
    /// because some keys are positional.
    #[serde(default)]
    pub properties: BTreeMap<String, Vec<String>>,
}

impl StageConfig {
    /// Create a stage without clauses
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder style helper marking the stage optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Builder style helper adding a dependency
    pub fn depends_on(mut self, target: impl Into<String>) -> Self {
        let target = target.into();
        if !self.depends_on.contains(&target) {
            self.depends_on.push(target);
        }
        self
    }

    /// Builder style helper appending values to a property
    pub fn property<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.properties
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }
}

/// The parsed, not yet validated, chain list.
///
/// Stages are kept in input order and may still contain duplicates; see
/// [`crate::validation::validate_document`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainListDocument {
    pub stages: Vec<StageConfig>,
}

impl ChainListDocument {
    /// Consume the document into a map keyed by stage name.
    ///
    /// Only call this on a validated document: with duplicate names the
    /// later stage would replace the earlier one.
    pub fn into_stage_map(self) -> BTreeMap<String, StageConfig> {
        self.stages
            .into_iter()
            .map(|stage| (stage.name.clone(), stage))
            .collect()
    }

    /// Names of all stages in input order
    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|stage| stage.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_helpers() {
        let stage = StageConfig::new("ner")
            .optional()
            .depends_on("langId")
            .depends_on("langId")
            .property("model", ["en", "de"]);

        assert_eq!(stage.name, "ner");
        assert!(stage.optional);
        assert_eq!(stage.depends_on, vec!["langId".to_string()]);
        assert_eq!(
            stage.properties.get("model"),
            Some(&vec!["en".to_string(), "de".to_string()])
        );
    }

    #[test]
    fn test_into_stage_map() {
        let document = ChainListDocument {
            stages: vec![StageConfig::new("b"), StageConfig::new("a")],
        };
        assert_eq!(document.stage_names().collect::<Vec<_>>(), vec!["b", "a"]);

        let map = document.into_stage_map();
        assert_eq!(map.keys().cloned().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
