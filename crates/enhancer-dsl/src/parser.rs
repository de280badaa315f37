use tracing::{debug, warn};

use crate::error::DslError;
use crate::stage::{ChainListDocument, StageConfig};

/// Clause marking a stage optional
pub const OPTIONAL: &str = "optional";

/// Clause listing the stages a stage depends on
pub const DEPENDS_ON: &str = "dependsOn";

const CLAUSE_SEPARATOR: char = ';';
const VALUE_SEPARATOR: char = ',';

/// A single `;` separated clause of a chain list line
#[derive(Debug, PartialEq, Eq)]
enum Clause<'a> {
    /// A clause without `=`
    Flag(&'a str),
    /// A `key=v1,v2` clause
    Parameter { key: &'a str, raw: &'a str },
}

impl<'a> Clause<'a> {
    fn parse(clause: &'a str) -> Self {
        match clause.split_once('=') {
            Some((key, raw)) => Clause::Parameter {
                key: key.trim(),
                raw,
            },
            None => Clause::Flag(clause),
        }
    }
}

fn split_values(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(VALUE_SEPARATOR)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_flag_value(stage: &str, clause: &str, raw: &str) -> Result<bool, DslError> {
    let values: Vec<&str> = split_values(raw).collect();
    match values.as_slice() {
        [] => Ok(true),
        [value] if value.eq_ignore_ascii_case("true") => Ok(true),
        [value] if value.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(DslError::InvalidFlagValue {
            stage: stage.to_string(),
            clause: clause.to_string(),
        }),
    }
}

/// Parse a single chain list line.
///
/// Returns `Ok(None)` for lines that do not define a stage.
fn parse_line(line: &str) -> Result<Option<StageConfig>, DslError> {
    let mut parts = line.split(CLAUSE_SEPARATOR);
    let name = parts.next().unwrap_or_default().trim();

    if name.is_empty() {
        if !line.trim().is_empty() {
            warn!(line, "Dropping chain list line without a stage name");
        } else {
            warn!("Dropping empty chain list line");
        }
        return Ok(None);
    }

    let mut stage = StageConfig::new(name);

    for clause in parts.map(str::trim).filter(|clause| !clause.is_empty()) {
        match Clause::parse(clause) {
            Clause::Flag(OPTIONAL) => stage.optional = true,
            Clause::Flag(flag) => {
                debug!(stage = name, flag, "Ignoring unknown chain list flag");
            }
            Clause::Parameter { key: "", .. } => {
                return Err(DslError::MalformedClause {
                    stage: name.to_string(),
                    clause: clause.to_string(),
                });
            }
            Clause::Parameter { key: OPTIONAL, raw } => {
                stage.optional = parse_flag_value(name, clause, raw)?;
            }
            Clause::Parameter {
                key: DEPENDS_ON,
                raw,
            } => {
                for target in split_values(raw) {
                    if !stage.depends_on.iter().any(|existing| existing == target) {
                        stage.depends_on.push(target.to_string());
                    }
                }
            }
            Clause::Parameter { key, raw } => {
                stage
                    .properties
                    .entry(key.to_string())
                    .or_default()
                    .extend(split_values(raw).map(str::to_string));
            }
        }
    }

    Ok(Some(stage))
}

/// Parse chain list lines into a [`ChainListDocument`].
///
/// Every line has the form
/// `stageName[;optional][;dependsOn=target1,target2][;key=val1,val2]...`.
/// The document keeps the input order and is not validated; duplicate
/// stage names are reported by [`crate::validation::validate_document`].
pub fn parse_chain_list<I, S>(lines: I) -> Result<ChainListDocument, DslError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut document = ChainListDocument::default();

    for line in lines {
        if let Some(stage) = parse_line(line.as_ref())? {
            document.stages.push(stage);
        }
    }

    debug!(stages = document.stages.len(), "Parsed chain list");
    Ok(document)
}
