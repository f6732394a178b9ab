use crate::domain::{AdapterError, ProviderResult};
use serde_json::Value;

const HTTP_OK: i64 = 200;
const CMD_STATE_OK: &str = "OK";
const CMD_STATUS_DONE: &str = "DONE";

/// Accepts a provider reply only when the transport succeeded and the
/// command reports `cmdState: OK` with `cmdStatus: DONE`.
pub fn check_result(result: &ProviderResult) -> Result<(), AdapterError> {
    if result.code != HTTP_OK {
        return Err(AdapterError::ProviderRequestFailed {
            code: result.code,
            message: result.message.clone(),
            description: result.description.clone(),
        });
    }

    if result.message.is_null() {
        return Err(AdapterError::Execution(
            "provider returned an empty message".to_string(),
        ));
    }

    let state = result.message.get("cmdState").cloned().unwrap_or(Value::Null);
    let status = result.message.get("cmdStatus").cloned().unwrap_or(Value::Null);
    if state.as_str() != Some(CMD_STATE_OK) || status.as_str() != Some(CMD_STATUS_DONE) {
        return Err(AdapterError::ProviderExecutionFailed { status, state });
    }

    Ok(())
}
