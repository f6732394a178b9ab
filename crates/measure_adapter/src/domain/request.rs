use crate::domain::{display_value, is_falsy};
use serde_json::Value;
use thiserror::Error;

static ABSENT: Value = Value::Null;

/// An inbound measurement task, kept as the document it arrived as so the
/// schema validator sees exactly what the caller sent.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRequest {
    document: Value,
}

impl TaskRequest {
    pub fn from_document(document: Value) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Top-level field, `null` when absent.
    pub fn field(&self, name: &str) -> &Value {
        self.document.get(name).unwrap_or(&ABSENT)
    }

    /// `None` when the request carries no `id` at all.
    pub fn id(&self) -> Option<&Value> {
        self.document.get("id")
    }

    pub fn task(&self) -> Option<&Value> {
        self.document.get("task")
    }

    /// Task as shown in error messages.
    pub fn task_label(&self) -> String {
        self.task()
            .map_or_else(|| "undefined".to_string(), display_value)
    }

    pub fn parameters(&self) -> &Value {
        self.field("parameters")
    }

    pub fn region_id(&self) -> &Value {
        self.field("region_id")
    }

    pub fn user_id(&self) -> &Value {
        self.field("user_id")
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("empty message")]
    Empty,
}

/// Reads an inbound payload. Falsy JSON (`null`, `false`, `0`, `""`) carries
/// no task and is rejected like malformed input.
pub fn parse_request(payload: &[u8]) -> Result<TaskRequest, ParseError> {
    let document: Value = serde_json::from_slice(payload)?;
    if is_falsy(&document) {
        return Err(ParseError::Empty);
    }
    Ok(TaskRequest::from_document(document))
}
