use crate::domain::{AdapterError, ERROR_NO_ERROR};
use serde::Serialize;
use serde_json::{json, Value};

pub const ENVELOPE_VERSION: &str = "1.0.0";

/// The single reply published for every accepted inbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    pub code: i64,
    pub message: EnvelopeMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub version: &'static str,
    pub data: Value,
    /// Set only on success.
    pub action: Option<String>,
}

impl ResponseEnvelope {
    pub fn success(id: Option<Value>, action: impl Into<String>, data: Value) -> Self {
        Self {
            code: ERROR_NO_ERROR,
            message: EnvelopeMessage {
                id,
                version: ENVELOPE_VERSION,
                data,
                action: Some(action.into()),
            },
        }
    }

    pub fn failure(id: Option<Value>, error: &AdapterError) -> Self {
        Self {
            code: error.code(),
            message: EnvelopeMessage {
                id,
                version: ENVELOPE_VERSION,
                data: json!({
                    "exception": error.exception(),
                    "description": error.description(),
                }),
                action: None,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == ERROR_NO_ERROR
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_carries_action() {
        let envelope = ResponseEnvelope::success(
            Some(json!("r1")),
            "equipment.measure.xdsl",
            json!({"pvc": {}}),
        );

        assert!(envelope.is_success());
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "code": 0,
                "message": {
                    "id": "r1",
                    "version": "1.0.0",
                    "data": {"pvc": {}},
                    "action": "equipment.measure.xdsl"
                }
            })
        );
    }

    #[test]
    fn test_failure_envelope_has_null_action() {
        let error = AdapterError::TaskNotFound {
            task: "unknown.task".to_string(),
        };
        let envelope = ResponseEnvelope::failure(Some(json!(5)), &error);

        assert!(!envelope.is_success());
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "code": 100,
                "message": {
                    "id": 5,
                    "version": "1.0.0",
                    "data": {
                        "exception": "Incorrect task: unknown.task",
                        "description": "Некорректная задача: unknown.task"
                    },
                    "action": null
                }
            })
        );
    }

    #[test]
    fn test_missing_id_is_omitted() {
        let error = AdapterError::Execution("boom".to_string());
        let bytes = ResponseEnvelope::failure(None, &error).to_bytes().unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert!(value["message"].get("id").is_none());
        assert_eq!(value["code"], json!(120));
    }
}
