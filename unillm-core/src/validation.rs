//! Schema validation contract
//!
//! Validation semantics belong to the [`SchemaValidator`] implementation. This
//! module only runs it and records whether it passed.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Structural validation of a JSON value against a caller schema
pub trait SchemaValidator: Send + Sync {
    /// Check `instance`, returning every violation found
    fn validate(&self, instance: &Value) -> Result<(), ValidationError>;
}

/// Why a validation did not pass
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The schema itself could not be compiled
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    /// The instance violates the schema
    #[error("Instance does not match schema: {}", .0.join("; "))]
    Mismatch(Vec<String>),
}

/// Outcome of validating one snapshot of a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    /// Whether the validator accepted the instance
    pub valid: bool,
    /// Whether the instance was taken from an unfinished response
    pub partial: bool,
    /// Violations reported by the validator
    pub errors: Vec<String>,
}

impl Validation {
    /// Validate a finished response
    pub fn complete(validator: &dyn SchemaValidator, instance: &Map<String, Value>) -> Self {
        Self::run(validator, Value::Object(instance.clone()), false)
    }

    /// Validate a response that is still streaming
    ///
    /// Keys whose value is still pending (`null` in the partial parse) are
    /// left out, so only values that have fully arrived are checked. Missing
    /// required keys still fail.
    pub fn partial(validator: &dyn SchemaValidator, instance: &Map<String, Value>) -> Self {
        let settled: Map<String, Value> = instance
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self::run(validator, Value::Object(settled), true)
    }

    fn run(validator: &dyn SchemaValidator, instance: Value, partial: bool) -> Self {
        match validator.validate(&instance) {
            Ok(()) => Self {
                valid: true,
                partial,
                errors: Vec::new(),
            },
            Err(ValidationError::Mismatch(errors)) => Self {
                valid: false,
                partial,
                errors,
            },
            Err(err @ ValidationError::InvalidSchema(_)) => Self {
                valid: false,
                partial,
                errors: vec![err.to_string()],
            },
        }
    }
}
