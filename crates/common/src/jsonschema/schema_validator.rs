//! Schema validator trait for JSON Schema validation.

use serde::Serialize;

/// Result type for schema validation operations.
pub type SchemaValidationResult<T> = Result<T, SchemaValidationError>;

/// A single schema violation, shaped like the error objects downstream
/// consumers already receive (`instancePath`, `schemaPath`, `message`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaIssue {
    pub instance_path: String,
    pub schema_path: String,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            instance_path: String::new(),
            schema_path: String::new(),
            message: message.into(),
        }
    }
}

/// Error type for schema validation failures.
#[derive(Debug, Clone)]
pub struct SchemaValidationError {
    /// Violations in the order the validator reported them
    pub issues: Vec<SchemaIssue>,
}

impl SchemaValidationError {
    pub fn single(message: impl Into<String>) -> Self {
        Self {
            issues: vec![SchemaIssue::new(message)],
        }
    }

    /// Message of the first reported violation, if any.
    pub fn first_message(&self) -> Option<&str> {
        self.issues.first().map(|issue| issue.message.as_str())
    }
}

impl std::fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self
            .issues
            .iter()
            .map(|issue| {
                if issue.instance_path.is_empty() {
                    issue.message.clone()
                } else {
                    format!("{} at {}", issue.message, issue.instance_path)
                }
            })
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for SchemaValidationError {}

/// Validates JSON documents against named, pre-registered JSON Schemas.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SchemaValidator: Send + Sync {
    /// Validate `data` against the schema registered as `schema_name`.
    ///
    /// # Returns
    /// * `Ok(())` if validation passes
    /// * `Err(SchemaValidationError)` with every violation otherwise; an
    ///   unknown schema name is reported as a single violation
    fn validate(&self, schema_name: &str, data: &serde_json::Value)
        -> SchemaValidationResult<()>;
}
