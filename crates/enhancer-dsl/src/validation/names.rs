use std::collections::HashMap;

use crate::stage::ChainListDocument;
use crate::validation::{error_codes, ValidationError, Validator};

/// Characters that would make a stage name unreferenceable from a
/// `dependsOn` clause
const RESERVED_CHARACTERS: &[char] = &['=', ','];

/// Rejects stage names used by more than one line
pub struct DuplicateNameValidator;

impl Validator for DuplicateNameValidator {
    fn validate(&self, document: &ChainListDocument) -> Vec<ValidationError> {
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        let mut errors = Vec::new();

        for (idx, name) in document.stage_names().enumerate() {
            match first_seen.get(name) {
                Some(first) => errors.push(
                    ValidationError::new(
                        error_codes::DUPLICATE_ID,
                        format!(
                            "Stage '{}' is defined more than once (first definition at line {})",
                            name,
                            first + 1
                        ),
                    )
                    .at(format!("stages[{}]", idx)),
                ),
                None => {
                    first_seen.insert(name, idx);
                }
            }
        }

        errors
    }
}

/// Rejects stage names containing reserved characters
pub struct ReservedCharacterValidator;

impl Validator for ReservedCharacterValidator {
    fn validate(&self, document: &ChainListDocument) -> Vec<ValidationError> {
        document
            .stage_names()
            .enumerate()
            .filter(|(_, name)| name.contains(RESERVED_CHARACTERS))
            .map(|(idx, name)| {
                ValidationError::new(
                    error_codes::INVALID_NAME,
                    format!(
                        "Stage name '{}' must not contain any of {:?}",
                        name, RESERVED_CHARACTERS
                    ),
                )
                .at(format!("stages[{}].name", idx))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageConfig;

    fn document(names: &[&str]) -> ChainListDocument {
        ChainListDocument {
            stages: names.iter().map(|name| StageConfig::new(*name)).collect(),
        }
    }

    #[test]
    fn test_unique_names_pass() {
        let errors = DuplicateNameValidator.validate(&document(&["a", "b", "c"]));
        assert!(errors.is_empty(), "Unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_every_repetition_is_reported() {
        let errors = DuplicateNameValidator.validate(&document(&["a", "b", "a", "a"]));
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.code == error_codes::DUPLICATE_ID));
        assert_eq!(errors[0].path.as_deref(), Some("stages[2]"));
        assert!(errors[0].message.contains("line 1"));
    }

    #[test]
    fn test_reserved_characters() {
        let errors = ReservedCharacterValidator.validate(&document(&["ok", "dependsOn=x", "a,b"]));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].code, error_codes::INVALID_NAME);
        assert!(errors[0].message.contains("'dependsOn=x'"));
        assert_eq!(errors[1].path.as_deref(), Some("stages[2].name"));
    }
}
