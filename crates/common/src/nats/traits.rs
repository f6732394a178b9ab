use anyhow::Result;
use async_trait::async_trait;

/// Trait for core NATS publish operations
/// Abstracts fire-and-forget publishing so producers can be tested without a server
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publish a payload to a subject
    async fn publish(&self, subject: String, payload: bytes::Bytes) -> Result<()>;
}
