//! Publish/subscribe interface

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

/// Pub-sub errors
#[derive(Debug, thiserror::Error)]
pub enum PubSubError {
    #[error("Trigger name cannot be empty")]
    EmptyTrigger,
}

/// Publish/subscribe handle injectable as a resolver parameter
#[async_trait]
pub trait PubSubEngine: Send + Sync {
    /// Publish a payload, returning the number of subscribers that received it
    async fn publish(&self, trigger: &str, payload: Value) -> Result<usize, PubSubError>;

    /// Subscribe to the payloads published on a trigger
    fn subscribe(&self, trigger: &str) -> BoxStream<'static, Value>;
}
