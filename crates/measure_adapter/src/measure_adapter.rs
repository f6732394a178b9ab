use crate::domain::{AdapterSettings, MessageDispatcher, ProviderClient};
use crate::nats::{InboundMessage, MeasureConsumer};
use bytes::Bytes;
use common::jsonschema::SchemaValidator;
use common::nats::NatsClient;
use futures::{future::BoxFuture, stream::BoxStream, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct MeasureAdapterConfig {
    pub subscribe_subject: String,
    pub publish_subject: String,
}

impl MeasureAdapterConfig {
    /// Payload a starting instance sends to detect a live one.
    pub fn sentinel(&self) -> Bytes {
        Bytes::from(self.subscribe_subject.clone())
    }
}

/// The subscribed measurement pipeline, ready to hand to the runner.
pub struct MeasureAdapter {
    consumer: MeasureConsumer,
    messages: BoxStream<'static, InboundMessage>,
}

impl MeasureAdapter {
    pub async fn new(
        nats_client: &NatsClient,
        settings: AdapterSettings,
        schema_validator: Arc<dyn SchemaValidator>,
        provider: Arc<dyn ProviderClient>,
        config: MeasureAdapterConfig,
    ) -> anyhow::Result<Self> {
        info!(
            subscribe_subject = %config.subscribe_subject,
            publish_subject = %config.publish_subject,
            "Initializing measure adapter"
        );

        let dispatcher = Arc::new(MessageDispatcher::new(settings, schema_validator, provider));
        let consumer = MeasureConsumer::new(
            dispatcher,
            nats_client.create_publisher(),
            config.publish_subject.clone(),
            config.sentinel(),
        );

        let messages = nats_client
            .subscribe(&config.subscribe_subject)
            .await?
            .map(InboundMessage::from)
            .boxed();

        info!("Measure adapter initialized");
        Ok(Self { consumer, messages })
    }

    pub fn into_runner_process(
        self,
    ) -> Box<dyn FnOnce(CancellationToken) -> BoxFuture<'static, anyhow::Result<()>> + Send> {
        let Self { consumer, messages } = self;
        Box::new(move |ctx| Box::pin(async move { consumer.run(messages, ctx).await }))
    }
}
