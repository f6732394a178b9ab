use crate::domain::{
    check_result, parse_request, AdapterError, FilialDirectory, ProviderClient, ProviderRoutes,
    ResponseEnvelope, TaskRegistry, TaskRequest,
};
use common::jsonschema::SchemaValidator;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Read-only lookup tables loaded at start.
#[derive(Debug, Clone, Default)]
pub struct AdapterSettings {
    pub filials: FilialDirectory,
    pub routes: ProviderRoutes,
}

/// Runs one measurement task end to end and turns the outcome into the
/// reply envelope.
///
/// Flow:
/// 1. Resolve the task kind
/// 2. Validate the request against the task's schema
/// 3. Build the provider command
/// 4. Call the provider once
/// 5. Check the command completed
/// 6. Normalize the provider reply
///
/// A failure at any step ends the flow; the error becomes the envelope.
pub struct MessageDispatcher {
    registry: TaskRegistry,
    filials: FilialDirectory,
    schema_validator: Arc<dyn SchemaValidator>,
    provider: Arc<dyn ProviderClient>,
}

impl MessageDispatcher {
    pub fn new(
        settings: AdapterSettings,
        schema_validator: Arc<dyn SchemaValidator>,
        provider: Arc<dyn ProviderClient>,
    ) -> Self {
        Self {
            registry: TaskRegistry::new(&settings.routes),
            filials: settings.filials,
            schema_validator,
            provider,
        }
    }

    /// Parses and dispatches a raw inbound payload. Payloads that are not a
    /// task request are logged and produce no envelope.
    pub async fn handle_payload(&self, payload: &[u8]) -> Option<ResponseEnvelope> {
        match parse_request(payload) {
            Ok(request) => Some(self.dispatch(&request).await),
            Err(e) => {
                warn!(error = %e, payload_size = payload.len(), "dropping inbound message");
                None
            }
        }
    }

    #[instrument(skip(self, request), fields(task = %request.task_label()))]
    pub async fn dispatch(&self, request: &TaskRequest) -> ResponseEnvelope {
        let id = request.id().cloned();
        match self.execute(request).await {
            Ok((action, data)) => {
                debug!(action = %action, "task completed");
                ResponseEnvelope::success(id, action, data)
            }
            Err(e) => {
                error!(code = e.code(), error = %e, "task failed");
                ResponseEnvelope::failure(id, &e)
            }
        }
    }

    async fn execute(&self, request: &TaskRequest) -> Result<(&'static str, Value), AdapterError> {
        let spec = self.registry.resolve(request)?;

        self.schema_validator
            .validate(spec.schema.name(), request.document())?;

        let params = (spec.build_params)(request, &self.filials)?;
        debug!(method = %spec.provider_method, req_id = %params.req_id, "calling provider");

        let result = self.provider.send_post(&spec.provider_method, &params).await?;
        check_result(&result)?;

        let payload = (spec.normalize)(&result.message)?;
        let data = serde_json::to_value(payload)
            .map_err(|e| AdapterError::Execution(e.to_string()))?;

        Ok((spec.kind.name(), data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockProviderClient, ProviderResult};
    use common::jsonschema::{MockSchemaValidator, SchemaIssue, SchemaValidationError};
    use serde_json::json;

    fn fttx_request() -> TaskRequest {
        TaskRequest::from_document(json!({
            "id": "req-1",
            "task": "equipment.measure.fttx",
            "parameters": {"mrf.customer_dn": "4951234567"},
            "region_id": 1,
            "user_id": "operator"
        }))
    }

    fn fttx_reply() -> Value {
        json!({
            "cmdState": "OK",
            "cmdStatus": "DONE",
            "equipment": "[SW] DLINK DES3200",
            "portAddr": "10.0.0.2:-5",
            "mac": "00:00:00:00:00:01",
            "admStatus": "up",
            "operStatus": "up",
            "fttxData": {"speed": "100000000", "sRules": [{"svlan": "10", "vlan": "20"}]}
        })
    }

    fn accepting_validator() -> MockSchemaValidator {
        let mut validator = MockSchemaValidator::new();
        validator.expect_validate().returning(|_, _| Ok(()));
        validator
    }

    fn dispatcher(validator: MockSchemaValidator, provider: MockProviderClient) -> MessageDispatcher {
        MessageDispatcher::new(
            AdapterSettings::default(),
            Arc::new(validator),
            Arc::new(provider),
        )
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let mut provider = MockProviderClient::new();
        provider
            .expect_send_post()
            .withf(|method, params| {
                method == "measure"
                    && params.dn == Some(json!("4951234567"))
                    && params.req_id == "req-1-data"
            })
            .times(1)
            .return_once(|_, _| Ok(ProviderResult::new(200, fttx_reply())));

        let mut validator = MockSchemaValidator::new();
        validator
            .expect_validate()
            .withf(|schema, _| schema == "dn_action")
            .times(1)
            .returning(|_, _| Ok(()));

        let envelope = dispatcher(validator, provider).dispatch(&fttx_request()).await;

        assert_eq!(envelope.code, 0);
        assert_eq!(envelope.message.id, Some(json!("req-1")));
        assert_eq!(envelope.message.action.as_deref(), Some("equipment.measure.fttx"));
        assert_eq!(envelope.message.data["interface_status"]["speed"], json!(100));
        assert_eq!(envelope.message.data["tech_data"]["port"], json!(5));
    }

    #[tokio::test]
    async fn test_unknown_task_skips_provider() {
        let mut provider = MockProviderClient::new();
        provider.expect_send_post().times(0);
        let mut validator = MockSchemaValidator::new();
        validator.expect_validate().times(0);

        let request = TaskRequest::from_document(json!({"id": 9, "task": "unknown.task"}));
        let envelope = dispatcher(validator, provider).dispatch(&request).await;

        assert_eq!(envelope.code, 100);
        assert_eq!(envelope.message.action, None);
        assert_eq!(
            envelope.message.data,
            json!({
                "exception": "Incorrect task: unknown.task",
                "description": "Некорректная задача: unknown.task"
            })
        );
    }

    #[tokio::test]
    async fn test_validation_failure() {
        let mut provider = MockProviderClient::new();
        provider.expect_send_post().times(0);
        let mut validator = MockSchemaValidator::new();
        validator.expect_validate().times(1).returning(|_, _| {
            Err(SchemaValidationError {
                issues: vec![SchemaIssue::new("\"region_id\" is a required property")],
            })
        });

        let envelope = dispatcher(validator, provider).dispatch(&fttx_request()).await;

        assert_eq!(envelope.code, 400);
        assert_eq!(
            envelope.message.data["description"],
            json!("Ошибка валидации входящих параметров: \"region_id\" is a required property")
        );
        assert_eq!(
            envelope.message.data["exception"][0]["message"],
            json!("\"region_id\" is a required property")
        );
    }

    #[tokio::test]
    async fn test_provider_transport_error_is_execution_error() {
        let mut provider = MockProviderClient::new();
        provider
            .expect_send_post()
            .times(1)
            .return_once(|_, _| Err(anyhow::anyhow!("connection refused")));

        let envelope = dispatcher(accepting_validator(), provider)
            .dispatch(&fttx_request())
            .await;

        assert_eq!(envelope.code, 120);
        assert_eq!(
            envelope.message.data,
            json!({"exception": "connection refused", "description": ""})
        );
    }

    #[tokio::test]
    async fn test_failed_command() {
        let mut provider = MockProviderClient::new();
        provider.expect_send_post().times(1).return_once(|_, _| {
            Ok(ProviderResult::new(
                200,
                json!({"cmdState": "FAILED", "cmdStatus": "CANCELED"}),
            ))
        });

        let envelope = dispatcher(accepting_validator(), provider)
            .dispatch(&fttx_request())
            .await;

        assert_eq!(envelope.code, 512);
        assert_eq!(envelope.message.data["exception"]["state"], json!("FAILED"));
        assert_eq!(
            envelope.message.data["description"],
            json!("Ошибка запроса в МУИК")
        );
    }

    #[tokio::test]
    async fn test_undecodable_reply() {
        let mut reply = fttx_reply();
        reply["fttxData"].as_object_mut().unwrap().remove("sRules");
        let mut provider = MockProviderClient::new();
        provider
            .expect_send_post()
            .times(1)
            .return_once(move |_, _| Ok(ProviderResult::new(200, reply)));

        let envelope = dispatcher(accepting_validator(), provider)
            .dispatch(&fttx_request())
            .await;

        assert_eq!(envelope.code, 402);
        assert_eq!(
            envelope.message.data["description"],
            json!("Ошибка при разборе ответа системы-провайдера")
        );
    }

    #[tokio::test]
    async fn test_handle_payload_drops_malformed_json() {
        let mut provider = MockProviderClient::new();
        provider.expect_send_post().times(0);
        let mut validator = MockSchemaValidator::new();
        validator.expect_validate().times(0);

        let dispatcher = dispatcher(validator, provider);

        assert!(dispatcher.handle_payload(b"{\"id\":").await.is_none());
        assert!(dispatcher.handle_payload(b"null").await.is_none());
    }

    #[tokio::test]
    async fn test_handle_payload_answers_parseable_json() {
        let dispatcher = dispatcher(MockSchemaValidator::new(), MockProviderClient::new());

        let envelope = dispatcher
            .handle_payload(br#"{"id":"x","task":"equipment.measure.vdsl"}"#)
            .await
            .unwrap();

        assert_eq!(envelope.code, 100);
        assert_eq!(envelope.message.id, Some(json!("x")));
    }
}
