use crate::domain::ResponseEnvelope;
use anyhow::{Context, Result};
use bytes::Bytes;
use common::nats::MessagePublisher;
use std::sync::Arc;
use tracing::debug;

/// Publishes reply envelopes as JSON on a fixed subject.
pub struct EnvelopeProducer {
    publisher: Arc<dyn MessagePublisher>,
    subject: String,
}

impl EnvelopeProducer {
    pub fn new(publisher: Arc<dyn MessagePublisher>, subject: String) -> Self {
        debug!(subject = %subject, "initialized EnvelopeProducer");
        Self { publisher, subject }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub async fn publish(&self, envelope: &ResponseEnvelope) -> Result<()> {
        let payload = envelope
            .to_bytes()
            .context("Failed to serialize response envelope")?;

        self.publisher
            .publish(self.subject.clone(), Bytes::from(payload))
            .await?;

        debug!(subject = %self.subject, code = envelope.code, "published envelope");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AdapterError;
    use common::nats::MockMessagePublisher;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_publish_serializes_envelope() {
        let mut publisher = MockMessagePublisher::new();
        publisher
            .expect_publish()
            .withf(|subject, payload| {
                let body: Value = serde_json::from_slice(payload).unwrap();
                subject == "transmitter"
                    && body["code"] == json!(0)
                    && body["message"]["action"] == json!("equipment.measure.xpon")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let producer = EnvelopeProducer::new(Arc::new(publisher), "transmitter".to_string());
        let envelope =
            ResponseEnvelope::success(Some(json!(1)), "equipment.measure.xpon", json!({}));

        assert!(producer.publish(&envelope).await.is_ok());
    }

    #[tokio::test]
    async fn test_publish_error_propagates() {
        let mut publisher = MockMessagePublisher::new();
        publisher
            .expect_publish()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("NATS publish failed")));

        let producer = EnvelopeProducer::new(Arc::new(publisher), "transmitter".to_string());
        let envelope =
            ResponseEnvelope::failure(None, &AdapterError::Execution("boom".to_string()));

        let result = producer.publish(&envelope).await;
        assert!(result.unwrap_err().to_string().contains("NATS publish failed"));
    }
}
