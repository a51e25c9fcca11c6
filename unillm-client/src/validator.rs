//! JSON Schema validation backed by the `jsonschema` crate

use serde_json::Value;
use std::fmt;
use unillm_core::{SchemaValidator, ValidationError};

/// A compiled JSON Schema
///
/// The schema is compiled once and reused for every snapshot of a response.
pub struct JsonSchemaValidator {
    validator: jsonschema::Validator,
}

impl JsonSchemaValidator {
    /// Compile a schema
    pub fn new(schema: &Value) -> Result<Self, ValidationError> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| ValidationError::InvalidSchema(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Whether `instance` satisfies the schema
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, instance: &Value) -> Result<(), ValidationError> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(instance)
            .map(|err| err.to_string())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Mismatch(errors))
        }
    }
}

impl fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaValidator").finish_non_exhaustive()
    }
}
