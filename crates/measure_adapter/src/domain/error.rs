use common::jsonschema::{SchemaIssue, SchemaValidationError};
use serde_json::{Map, Value};
use thiserror::Error;

pub const ERROR_NO_ERROR: i64 = 0;
pub const ERROR_TASK_CHECK: i64 = 100;
pub const ERROR_EXECUTE: i64 = 120;
pub const ERROR_FAILED_VALIDATE: i64 = 400;
pub const ERROR_PROVIDER_RESPONSE_DECODE: i64 = 402;
pub const ERROR_PROVIDER_EXECUTION: i64 = 512;

const DESCRIPTION_TASK_CHECK: &str = "Некорректная задача: ";
const DESCRIPTION_FAILED_VALIDATE: &str = "Ошибка валидации входящих параметров: ";
const DESCRIPTION_PROVIDER_RESPONSE_DECODE: &str = "Ошибка при разборе ответа системы-провайдера";
const DESCRIPTION_PROVIDER_EXECUTION: &str = "Ошибка запроса в МУИК";

/// Every way a dispatch can fail; each variant maps to one envelope code.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Incorrect task: {task}")]
    TaskNotFound { task: String },

    #[error("request validation failed with {} issue(s)", .issues.len())]
    ValidationFailed { issues: Vec<SchemaIssue> },

    /// Non-200 reply from the provider transport; code, message and
    /// description are forwarded untouched.
    #[error("provider request failed with code {code}")]
    ProviderRequestFailed {
        code: i64,
        message: Value,
        description: Option<String>,
    },

    /// The provider answered but the command did not complete.
    #[error("provider command finished with state {state} and status {status}")]
    ProviderExecutionFailed { status: Value, state: Value },

    #[error("{0}")]
    ProviderResponseDecode(String),

    #[error("{0}")]
    Execution(String),
}

impl AdapterError {
    pub fn code(&self) -> i64 {
        match self {
            AdapterError::TaskNotFound { .. } => ERROR_TASK_CHECK,
            AdapterError::ValidationFailed { .. } => ERROR_FAILED_VALIDATE,
            // A zero passthrough code would read as success
            AdapterError::ProviderRequestFailed { code, .. } if *code != ERROR_NO_ERROR => *code,
            AdapterError::ProviderRequestFailed { .. } => ERROR_EXECUTE,
            AdapterError::ProviderExecutionFailed { .. } => ERROR_PROVIDER_EXECUTION,
            AdapterError::ProviderResponseDecode(_) => ERROR_PROVIDER_RESPONSE_DECODE,
            AdapterError::Execution(_) => ERROR_EXECUTE,
        }
    }

    /// The `exception` field of the error envelope.
    pub fn exception(&self) -> Value {
        match self {
            AdapterError::ValidationFailed { issues } => {
                serde_json::to_value(issues).unwrap_or(Value::Null)
            }
            AdapterError::ProviderRequestFailed { message, .. } => message.clone(),
            AdapterError::ProviderExecutionFailed { status, state } => {
                let mut exception = Map::new();
                if !status.is_null() {
                    exception.insert("status".to_string(), status.clone());
                }
                if !state.is_null() {
                    exception.insert("state".to_string(), state.clone());
                }
                Value::Object(exception)
            }
            other => Value::String(other.to_string()),
        }
    }

    /// The `description` field of the error envelope.
    pub fn description(&self) -> String {
        match self {
            AdapterError::TaskNotFound { task } => format!("{DESCRIPTION_TASK_CHECK}{task}"),
            AdapterError::ValidationFailed { issues } => issues
                .first()
                .map(|issue| format!("{DESCRIPTION_FAILED_VALIDATE}{}", issue.message))
                .unwrap_or_default(),
            AdapterError::ProviderRequestFailed { description, .. } => {
                description.clone().unwrap_or_default()
            }
            AdapterError::ProviderExecutionFailed { .. } => {
                DESCRIPTION_PROVIDER_EXECUTION.to_string()
            }
            AdapterError::ProviderResponseDecode(_) => {
                DESCRIPTION_PROVIDER_RESPONSE_DECODE.to_string()
            }
            AdapterError::Execution(_) => String::new(),
        }
    }
}

impl From<SchemaValidationError> for AdapterError {
    fn from(error: SchemaValidationError) -> Self {
        AdapterError::ValidationFailed {
            issues: error.issues,
        }
    }
}

impl From<NormalizeError> for AdapterError {
    fn from(error: NormalizeError) -> Self {
        AdapterError::ProviderResponseDecode(error.to_string())
    }
}

impl From<anyhow::Error> for AdapterError {
    fn from(error: anyhow::Error) -> Self {
        AdapterError::Execution(format!("{:#}", error))
    }
}

/// Shape problems in a provider payload; always reported as code 402.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("provider payload is missing `{0}`")]
    MissingField(String),

    #[error("`{0}` is not a list")]
    NotAList(String),

    #[error("`{0}` is not a string")]
    NotAString(String),
}

pub type NormalizeResult<T> = Result<T, NormalizeError>;
