//! JSON Schema validator implementation.

use crate::jsonschema::{
    SchemaIssue, SchemaValidationError, SchemaValidationResult, SchemaValidator,
};
use jsonschema::Validator;
use std::collections::HashMap;

/// JSON Schema validator backed by the `jsonschema` crate (Draft 2020-12).
///
/// Schemas are compiled once at registration and reused for every document.
#[derive(Default)]
pub struct JsonSchemaValidator {
    validators: HashMap<String, Validator>,
}

impl JsonSchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `schema` and register it under `name`, replacing any previous one.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        schema: &serde_json::Value,
    ) -> SchemaValidationResult<()> {
        let validator = Validator::new(schema).map_err(|e| {
            SchemaValidationError::single(format!("Invalid JSON Schema: {}", e))
        })?;
        self.validators.insert(name.into(), validator);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(
        &self,
        schema_name: &str,
        data: &serde_json::Value,
    ) -> SchemaValidationResult<()> {
        let validator = self.validators.get(schema_name).ok_or_else(|| {
            SchemaValidationError::single(format!("Unknown schema: {}", schema_name))
        })?;

        let issues: Vec<SchemaIssue> = validator
            .iter_errors(data)
            .map(|e| SchemaIssue {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if !issues.is_empty() {
            return Err(SchemaValidationError { issues });
        }

        Ok(())
    }
}
