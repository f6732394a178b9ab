use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

/// Fixed command timeout forwarded to the provider, in seconds.
pub const PROVIDER_COMMAND_TIMEOUT: u32 = 300;

/// Body of a provider command request.
///
/// Either `dn` is set or the optional address fields are, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderParams {
    pub timeout: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dn: Option<Value>,
    pub req_id: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub operator: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filial_id: Option<Value>,
    #[serde(flatten)]
    pub address: Map<String, Value>,
}

/// Raw provider reply: transport status plus the vendor payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResult {
    pub code: i64,
    pub message: Value,
    pub description: Option<String>,
}

impl ProviderResult {
    pub fn new(code: i64, message: Value) -> Self {
        Self {
            code,
            message,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The measurement provider, called once per dispatch.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Sends one command; `Err` means the provider could not be reached or
    /// its reply could not be read.
    async fn send_post(&self, method: &str, params: &ProviderParams)
        -> anyhow::Result<ProviderResult>;
}
