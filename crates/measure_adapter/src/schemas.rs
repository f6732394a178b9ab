//! JSON Schemas that inbound measurement requests are validated against.

use common::jsonschema::{JsonSchemaValidator, SchemaValidationResult};
use serde_json::{json, Value};

/// Schema a task's request must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestSchema {
    /// Envelope fields only.
    Dn,
    /// Envelope fields plus at least one scalar parameter.
    DnAction,
}

impl RequestSchema {
    pub const ALL: [RequestSchema; 2] = [RequestSchema::Dn, RequestSchema::DnAction];

    pub fn name(&self) -> &'static str {
        match self {
            RequestSchema::Dn => "dn",
            RequestSchema::DnAction => "dn_action",
        }
    }

    pub fn definition(&self) -> Value {
        match self {
            RequestSchema::Dn => json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "type": "object",
                "properties": {
                    "id": {},
                    "task": {"type": "string"},
                    "parameters": {"type": "object"},
                    "region_id": {},
                    "user_id": {}
                },
                "required": ["id", "task", "parameters", "region_id", "user_id"]
            }),
            RequestSchema::DnAction => json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "type": "object",
                "properties": {
                    "id": {},
                    "task": {"type": "string"},
                    "parameters": {
                        "type": "object",
                        "minProperties": 1,
                        "additionalProperties": {"type": ["string", "number"]}
                    },
                    "region_id": {},
                    "user_id": {}
                },
                "required": ["id", "task", "parameters", "region_id", "user_id"]
            }),
        }
    }
}

/// A validator with every request schema registered under its name.
pub fn request_schema_validator() -> SchemaValidationResult<JsonSchemaValidator> {
    let mut validator = JsonSchemaValidator::new();
    for schema in RequestSchema::ALL {
        validator.register(schema.name(), &schema.definition())?;
    }
    Ok(validator)
}
