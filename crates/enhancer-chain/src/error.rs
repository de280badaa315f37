use std::fmt;
use thiserror::Error;

use enhancer_dsl::{DslError, ValidationError};

/// Errors raised while decoding a serialized triple graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The input is not valid UTF-8
    #[error("Input is not valid UTF-8: {0}")]
    Encoding(String),

    /// A line based format could not be parsed
    #[error("Syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A JSON based format could not be parsed
    #[error("Invalid JSON document: {0}")]
    Json(String),

    /// An RDF document (Turtle, RDF/XML) could not be parsed
    #[error("Invalid {format} document: {message}")]
    Document { format: &'static str, message: String },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err.to_string())
    }
}

/// Errors raised while building an execution plan from either source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanBuildError {
    /// A single validation error
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    /// Multiple validation errors
    #[error("{}", MultipleErrorsFormat(.0))]
    MultipleValidationErrors(Vec<ValidationError>),

    /// The plan would not contain a single execution node
    #[error("The execution plan does not define any execution node")]
    EmptyPlan,

    /// No decoder is registered for the format of the resource
    #[error("No decoder registered for format '{0}'")]
    UnsupportedFormat(String),

    /// The resource bytes could not be decoded
    #[error("Failed to decode resource '{resource}': {source}")]
    Decode {
        resource: String,
        #[source]
        source: DecodeError,
    },
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

impl PlanBuildError {
    /// Create a PlanBuildError from a non-empty vector of validation errors
    pub fn from_validation_errors(mut errors: Vec<ValidationError>) -> Self {
        if errors.len() > 1 {
            return PlanBuildError::MultipleValidationErrors(errors);
        }
        match errors.pop() {
            Some(error) => PlanBuildError::Validation(error),
            None => PlanBuildError::EmptyPlan,
        }
    }

    /// All validation errors carried by this error
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            PlanBuildError::Validation(error) => std::slice::from_ref(error),
            PlanBuildError::MultipleValidationErrors(errors) => errors,
            _ => &[],
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            PlanBuildError::Validation(err) => err.code,
            PlanBuildError::MultipleValidationErrors(_) => "ERR_PLAN_VALIDATION_MULTIPLE",
            PlanBuildError::EmptyPlan => "ERR_PLAN_EMPTY",
            PlanBuildError::UnsupportedFormat(_) => "ERR_PLAN_UNSUPPORTED_FORMAT",
            PlanBuildError::Decode { .. } => "ERR_PLAN_DECODE",
        }
    }
}

/// Errors reported by a [`crate::Chain`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The chain can not be activated with the supplied configuration
    #[error("Configuration error for chain '{chain}': {message}")]
    Configuration { chain: String, message: String },

    /// The execution plan could not be built
    #[error("Unable to build the execution plan of chain '{chain}': {source}")]
    PlanBuild {
        chain: String,
        #[source]
        source: PlanBuildError,
    },

    /// The watched execution plan resource has not delivered any data
    #[error("Execution plan resource '{resource}' of chain '{chain}' is not available")]
    ResourceUnavailable { chain: String, resource: String },

    /// The chain was never activated or has been deactivated
    #[error("Chain is not active")]
    NotActive,
}

impl ChainError {
    pub fn configuration(chain: impl Into<String>, message: impl Into<String>) -> Self {
        ChainError::Configuration {
            chain: chain.into(),
            message: message.into(),
        }
    }

    pub fn plan_build(chain: impl Into<String>, source: PlanBuildError) -> Self {
        ChainError::PlanBuild {
            chain: chain.into(),
            source,
        }
    }

    /// Wrap a DSL error raised while reading the configuration of `chain`
    pub fn from_dsl(chain: impl Into<String>, err: DslError) -> Self {
        ChainError::configuration(chain, err.to_string())
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ChainError::Configuration { .. } => "ERR_CHAIN_CONFIGURATION",
            ChainError::PlanBuild { source, .. } => source.error_code(),
            ChainError::ResourceUnavailable { .. } => "ERR_CHAIN_RESOURCE_UNAVAILABLE",
            ChainError::NotActive => "ERR_CHAIN_NOT_ACTIVE",
        }
    }
}
