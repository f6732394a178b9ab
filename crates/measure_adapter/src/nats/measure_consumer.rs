use crate::domain::MessageDispatcher;
use crate::nats::EnvelopeProducer;
use anyhow::Result;
use bytes::Bytes;
use common::nats::MessagePublisher;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// A message received on the task subject.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub payload: Bytes,
    pub reply: Option<String>,
}

impl InboundMessage {
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            reply: None,
        }
    }

    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }
}

impl From<async_nats::Message> for InboundMessage {
    fn from(message: async_nats::Message) -> Self {
        Self {
            payload: message.payload,
            reply: message.reply.map(|subject| subject.to_string()),
        }
    }
}

/// Consumes task requests one at a time and publishes one envelope for each.
///
/// A payload equal to the sentinel is a startup probe from another instance;
/// it is answered (when it carries a reply subject) and never dispatched.
pub struct MeasureConsumer {
    dispatcher: Arc<MessageDispatcher>,
    producer: EnvelopeProducer,
    publisher: Arc<dyn MessagePublisher>,
    sentinel: Bytes,
}

impl MeasureConsumer {
    pub fn new(
        dispatcher: Arc<MessageDispatcher>,
        publisher: Arc<dyn MessagePublisher>,
        publish_subject: String,
        sentinel: Bytes,
    ) -> Self {
        Self {
            dispatcher,
            producer: EnvelopeProducer::new(Arc::clone(&publisher), publish_subject),
            publisher,
            sentinel,
        }
    }

    pub async fn run<S>(&self, mut messages: S, ctx: CancellationToken) -> Result<()>
    where
        S: Stream<Item = InboundMessage> + Unpin,
    {
        info!(publish_subject = %self.producer.subject(), "Starting measure consumer loop");

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!("Received shutdown signal, stopping measure consumer");
                    break;
                }
                next = messages.next() => match next {
                    Some(message) => self.handle(message).await,
                    None => {
                        warn!("Subscription closed, stopping measure consumer");
                        break;
                    }
                }
            }
        }

        info!("Measure consumer stopped gracefully");
        Ok(())
    }

    async fn handle(&self, message: InboundMessage) {
        if message.payload == self.sentinel {
            info!("another instance of this adapter was trying to get started");
            if let Some(reply) = message.reply {
                if let Err(e) = self.publisher.publish(reply, self.sentinel.clone()).await {
                    warn!(error = %e, "Failed to answer instance probe");
                }
            }
            return;
        }

        let Some(envelope) = self.dispatcher.handle_payload(&message.payload).await else {
            return;
        };

        match self.producer.publish(&envelope).await {
            Ok(()) => debug!(code = envelope.code, "envelope delivered"),
            Err(e) => error!(error = %e, code = envelope.code, "Failed to publish envelope"),
        }
    }
}
