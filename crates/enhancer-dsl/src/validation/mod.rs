use std::error::Error;
use std::fmt;

use crate::error::DslError;
use crate::stage::ChainListDocument;

mod names;

/// Represents a validation error found in a chain configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error code (should be a constant identifier)
    pub code: &'static str,

    /// Human-readable error message
    pub message: String,

    /// Optional path to the location of the error (e.g., "stages[2].name")
    pub path: Option<String>,
}

impl ValidationError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl Error for ValidationError {}

/// Validation error codes
pub mod error_codes {
    /// Two stages share a name
    pub const DUPLICATE_ID: &str = "ERR_DSL_VALIDATION_DUPLICATE_ID";

    /// A stage name contains a reserved character
    pub const INVALID_NAME: &str = "ERR_DSL_VALIDATION_INVALID_NAME";
}

/// A trait for validators that check specific aspects of a chain list
pub trait Validator {
    /// Validate the document and return a list of validation errors (if any)
    fn validate(&self, document: &ChainListDocument) -> Vec<ValidationError>;
}

/// Validate a parsed chain list
pub fn validate_document(document: &ChainListDocument) -> Result<(), DslError> {
    let validators: Vec<Box<dyn Validator>> = vec![
        Box::new(names::DuplicateNameValidator),
        Box::new(names::ReservedCharacterValidator),
    ];

    let errors: Vec<ValidationError> = validators
        .iter()
        .flat_map(|validator| validator.validate(document))
        .collect();

    if !errors.is_empty() {
        return Err(DslError::from_validation_errors(errors));
    }

    Ok(())
}
