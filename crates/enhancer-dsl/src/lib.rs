//! # Enhancer DSL
//!
//! The chain list DSL describes an enhancement chain with one stage per line.
//! Every line starts with the stage (engine) name, followed by `;` separated
//! clauses:
//!
//! ```text
//! stageName[;optional][;dependsOn=target1,target2][;key=val1,val2]...
//! ```
//!
//! This crate turns such lines into per-stage [`StageConfig`] records. It also
//! parses the `name;format=<id>` references used to point a chain at an
//! externally provided execution plan resource.
//!
//! ## Example
//!
//! ```
//! use enhancer_dsl::parse_and_validate_chain_list;
//!
//! let lines = ["metaxa", "langId;dependsOn=metaxa", "ner;dependsOn=langId;optional"];
//! let stages = parse_and_validate_chain_list(lines).unwrap();
//!
//! assert_eq!(stages.len(), 3);
//! assert!(stages["ner"].optional);
//! assert_eq!(stages["ner"].depends_on, vec!["langId".to_string()]);
//! ```

mod error;
mod parser;

pub mod resource;
pub mod stage;
pub mod validation;

use std::collections::BTreeMap;

pub use error::DslError;
pub use parser::parse_chain_list;
pub use resource::{guess_format, ResourceReference};
pub use stage::{ChainListDocument, StageConfig};
pub use validation::ValidationError;

/// Parse and validate a chain list.
///
/// 1. Parses every line into a [`StageConfig`] (see [`parse_chain_list`])
/// 2. Rejects configurations without a single usable stage
/// 3. Validates the stage names (uniqueness, reserved characters)
///
/// The result is keyed by stage name so iteration order is deterministic.
///
/// # Errors
///
/// * [`DslError::MalformedClause`] / [`DslError::InvalidFlagValue`] for lines
///   that can not be parsed
/// * [`DslError::EmptyChain`] if no line defines a stage
/// * [`DslError::ValidationError`] / [`DslError::MultipleValidationErrors`]
///   for duplicate or invalid stage names
///
/// ```
/// use enhancer_dsl::{parse_and_validate_chain_list, DslError};
///
/// let result = parse_and_validate_chain_list(["tika", "tika;optional"]);
/// let err = result.unwrap_err();
/// assert!(err.error_code().contains("DUPLICATE_ID"));
/// ```
pub fn parse_and_validate_chain_list<I, S>(
    lines: I,
) -> Result<BTreeMap<String, StageConfig>, DslError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let document = parser::parse_chain_list(lines)?;

    if document.stages.is_empty() {
        return Err(DslError::EmptyChain);
    }

    validation::validate_document(&document)?;

    Ok(document.into_stage_map())
}
