use std::fmt;
use thiserror::Error;

use crate::validation::ValidationError;

/// All errors that can occur while processing chain list or resource reference configuration
#[derive(Error, Debug)]
pub enum DslError {
    /// A single validation error
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    /// Multiple validation errors
    #[error("{}", MultipleErrorsFormat(.0))]
    MultipleValidationErrors(Vec<ValidationError>),

    /// A `key=value` clause without a key
    #[error("Malformed clause '{clause}' for stage '{stage}': a parameter requires a non-empty key")]
    MalformedClause { stage: String, clause: String },

    /// A boolean clause (e.g. `optional=maybe`) with a value that is neither `true` nor `false`
    #[error("Invalid value in clause '{clause}' for stage '{stage}': expected 'true' or 'false'")]
    InvalidFlagValue { stage: String, clause: String },

    /// The chain list does not contain a single usable stage
    #[error("The chain list must define at least a single stage")]
    EmptyChain,

    /// A resource reference without a resource name
    #[error("Invalid resource reference '{0}': the resource name must not be empty")]
    InvalidResourceReference(String),

    /// A resource reference with `format=` but no value
    #[error("The 'format' parameter of resource reference '{0}' must not be empty")]
    EmptyFormat(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

struct MultipleErrorsFormat<'a>(&'a [ValidationError]);

impl fmt::Display for MultipleErrorsFormat<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multiple validation errors ({} issues):", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            write!(f, "\n  {}. {}", i + 1, err)?;
        }
        Ok(())
    }
}

impl DslError {
    /// Create a DslError from a vector of validation errors
    pub fn from_validation_errors(mut errors: Vec<ValidationError>) -> Self {
        if errors.len() > 1 {
            return DslError::MultipleValidationErrors(errors);
        }
        match errors.pop() {
            Some(error) => DslError::ValidationError(error),
            None => DslError::InternalError(
                "Called from_validation_errors with empty vector".to_string(),
            ),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DslError::ValidationError(err) => err.code,
            DslError::MultipleValidationErrors(_) => "ERR_DSL_VALIDATION_MULTIPLE",
            DslError::MalformedClause { .. } => "ERR_DSL_MALFORMED_CLAUSE",
            DslError::InvalidFlagValue { .. } => "ERR_DSL_INVALID_FLAG_VALUE",
            DslError::EmptyChain => "ERR_DSL_EMPTY_CHAIN",
            DslError::InvalidResourceReference(_) => "ERR_DSL_INVALID_RESOURCE_REFERENCE",
            DslError::EmptyFormat(_) => "ERR_DSL_EMPTY_FORMAT",
            DslError::InternalError(_) => "ERR_DSL_INTERNAL",
        }
    }
}
