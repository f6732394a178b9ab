use crate::nats::traits::MessagePublisher;
use anyhow::{Context, Result};
use async_nats::RequestErrorKind;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Core NATS (non-JetStream) connection shared by subscribers and publishers
pub struct NatsClient {
    client: async_nats::Client,
}

impl NatsClient {
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        info!(url = %url, timeout_ms = timeout.as_millis(), "Connecting to NATS");

        let client = async_nats::ConnectOptions::new()
            .connection_timeout(timeout)
            .connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Successfully connected to NATS");
        Ok(Self { client })
    }

    /// Subscribe to a subject; messages arrive in publish order
    pub async fn subscribe(&self, subject: &str) -> Result<async_nats::Subscriber> {
        info!(subject = %subject, "Subscribing to subject");

        self.client
            .subscribe(subject.to_string())
            .await
            .context("Failed to subscribe")
    }

    /// Send `payload` as a request on `subject` and report whether an instance is
    /// already serving it. Only an explicit no-responders reply means the subject
    /// is free; a request that stays unanswered for `timeout` is a busy subscriber.
    pub async fn has_responder(&self, subject: &str, payload: Bytes, timeout: Duration) -> bool {
        let outcome =
            tokio::time::timeout(timeout, self.client.request(subject.to_string(), payload))
                .await
                .ok();
        responder_present(subject, outcome)
    }

    /// Create a MessagePublisher trait object from this client
    pub fn create_publisher(&self) -> Arc<dyn MessagePublisher> {
        Arc::new(NatsMessagePublisher::new(self.client.clone()))
    }

    /// Flush buffered publishes before shutdown
    pub async fn close(&self) -> Result<()> {
        info!("Closing NATS connection");
        self.client
            .flush()
            .await
            .context("Failed to flush NATS connection")?;
        Ok(())
    }
}

/// `None` is a probe that outlived the local timeout.
fn responder_present(
    subject: &str,
    outcome: Option<Result<async_nats::Message, async_nats::RequestError>>,
) -> bool {
    match outcome {
        Some(Ok(_)) => true,
        Some(Err(e)) => match e.kind() {
            RequestErrorKind::NoResponders => {
                debug!(subject = %subject, "No responder on subject");
                false
            }
            RequestErrorKind::TimedOut => {
                debug!(subject = %subject, "Responder is subscribed but did not answer in time");
                true
            }
            _ => {
                warn!(subject = %subject, error = %e, "Responder probe failed");
                false
            }
        },
        None => {
            debug!(subject = %subject, "Responder probe timed out, subscriber is busy");
            true
        }
    }
}

/// Concrete implementation of MessagePublisher using async-nats
pub struct NatsMessagePublisher {
    client: async_nats::Client,
}

impl NatsMessagePublisher {
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessagePublisher for NatsMessagePublisher {
    #[instrument(skip(self, payload), fields(subject = %subject, payload_size = payload.len()))]
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        self.client
            .publish(subject, payload)
            .await
            .context("Failed to publish message to NATS")?;
        Ok(())
    }
}
