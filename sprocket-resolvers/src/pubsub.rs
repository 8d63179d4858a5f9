//! In-memory publish/subscribe
//!
//! One `tokio::sync::broadcast` channel per trigger, created by the first
//! subscription and removed when the last subscription is dropped. Publishing
//! to a trigger nobody listens on creates nothing. Slow subscribers that fall
//! more than `buffer` payloads behind skip the missed payloads and keep
//! receiving.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::RwLock;
use serde_json::Value;
use sprocket_interfaces::{PubSubEngine, PubSubError};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tracing::{debug, warn};

type Channels = RwLock<HashMap<String, broadcast::Sender<Value>>>;

/// Pub-sub engine keeping every channel in process memory
pub struct InMemoryPubSub {
    buffer: usize,
    channels: Arc<Channels>,
}

impl InMemoryPubSub {
    /// Create an engine buffering up to `buffer` payloads per trigger
    pub fn new(buffer: usize) -> Self {
        Self {
            buffer: buffer.max(1),
            channels: Arc::default(),
        }
    }

    /// Number of live subscriptions on a trigger
    pub fn subscriber_count(&self, trigger: &str) -> usize {
        self.channels
            .read()
            .get(trigger)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Number of triggers with at least one live subscription
    pub fn trigger_count(&self) -> usize {
        self.channels.read().len()
    }
}

impl Default for InMemoryPubSub {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Receiving end of one subscription
///
/// Dropping it removes the trigger's channel once no other subscription
/// remains.
struct Subscription {
    rx: broadcast::Receiver<Value>,
    trigger: String,
    channels: Weak<Channels>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(channels) = self.channels.upgrade() else {
            return;
        };

        // Receivers are only created under the write lock, so the count is stable here.
        let mut channels = channels.write();
        if channels
            .get(&self.trigger)
            .is_some_and(|sender| sender.receiver_count() <= 1)
        {
            channels.remove(&self.trigger);
            debug!(trigger = %self.trigger, "Removed channel without subscribers");
        }
    }
}

#[async_trait]
impl PubSubEngine for InMemoryPubSub {
    async fn publish(&self, trigger: &str, payload: Value) -> Result<usize, PubSubError> {
        if trigger.is_empty() {
            return Err(PubSubError::EmptyTrigger);
        }

        let sent = match self.channels.read().get(trigger) {
            Some(sender) => sender.send(payload).ok(),
            None => None,
        };

        match sent {
            Some(subscriber_count) => {
                debug!(trigger, subscriber_count, "Published payload");
                Ok(subscriber_count)
            }
            None => {
                debug!(trigger, "No subscribers for published payload");
                Ok(0)
            }
        }
    }

    fn subscribe(&self, trigger: &str) -> BoxStream<'static, Value> {
        let rx = self
            .channels
            .write()
            .entry(trigger.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer).0)
            .subscribe();
        let subscription = Subscription {
            rx,
            trigger: trigger.to_string(),
            channels: Arc::downgrade(&self.channels),
        };

        stream::unfold(subscription, |mut subscription| async move {
            loop {
                match subscription.rx.recv().await {
                    Ok(payload) => return Some((payload, subscription)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(trigger = %subscription.trigger, skipped, "Subscription lagged, payloads dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!(trigger = %subscription.trigger, "Subscription channel closed");
                        return None;
                    }
                }
            }
        })
        .boxed()
    }
}

/// Publishing handle bound to one trigger
///
/// Injected into handlers that declare a pub-sub parameter with a trigger.
#[derive(Clone)]
pub struct Publisher {
    engine: Arc<dyn PubSubEngine>,
    trigger: String,
}

impl Publisher {
    pub fn new(engine: Arc<dyn PubSubEngine>, trigger: impl Into<String>) -> Self {
        Self {
            engine,
            trigger: trigger.into(),
        }
    }

    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// Publish a payload on the bound trigger
    pub async fn publish(&self, payload: Value) -> Result<usize, PubSubError> {
        self.engine.publish(&self.trigger, payload).await
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher").field("trigger", &self.trigger).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let pub_sub = InMemoryPubSub::new(8);
        let mut first = pub_sub.subscribe("RECIPE_ADDED");
        let mut second = pub_sub.subscribe("RECIPE_ADDED");
        let mut other = pub_sub.subscribe("RECIPE_REMOVED");

        let delivered = pub_sub.publish("RECIPE_ADDED", json!({ "id": 1 })).await.unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(first.next().await, Some(json!({ "id": 1 })));
        assert_eq!(second.next().await, Some(json!({ "id": 1 })));

        pub_sub.publish("RECIPE_REMOVED", json!(2)).await.unwrap();
        assert_eq!(other.next().await, Some(json!(2)));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let pub_sub = InMemoryPubSub::default();
        assert_eq!(pub_sub.publish("NOBODY", json!(null)).await.unwrap(), 0);
        assert_eq!(pub_sub.subscriber_count("NOBODY"), 0);
    }

    #[tokio::test]
    async fn test_channels_exist_only_while_subscribed() {
        let pub_sub = InMemoryPubSub::new(4);

        for id in 0..100 {
            pub_sub.publish(&format!("RECIPE_UPDATED:{id}"), json!(id)).await.unwrap();
        }
        assert_eq!(pub_sub.trigger_count(), 0);

        let first = pub_sub.subscribe("RECIPE_UPDATED:1");
        let mut second = pub_sub.subscribe("RECIPE_UPDATED:1");
        assert_eq!(pub_sub.trigger_count(), 1);

        drop(first);
        assert_eq!(pub_sub.subscriber_count("RECIPE_UPDATED:1"), 1);
        assert_eq!(pub_sub.publish("RECIPE_UPDATED:1", json!("fresh")).await.unwrap(), 1);
        assert_eq!(second.next().await, Some(json!("fresh")));

        drop(second);
        assert_eq!(pub_sub.trigger_count(), 0);
        assert_eq!(pub_sub.publish("RECIPE_UPDATED:1", json!("late")).await.unwrap(), 0);
        assert_eq!(pub_sub.trigger_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_trigger_rejected() {
        let pub_sub = InMemoryPubSub::default();
        assert!(matches!(
            pub_sub.publish("", json!(1)).await,
            Err(PubSubError::EmptyTrigger)
        ));
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips_ahead() {
        let pub_sub = InMemoryPubSub::new(2);
        let mut stream = pub_sub.subscribe("TICK");

        for tick in 0..5 {
            pub_sub.publish("TICK", json!(tick)).await.unwrap();
        }

        assert_eq!(stream.next().await, Some(json!(3)));
        assert_eq!(stream.next().await, Some(json!(4)));
    }

    #[tokio::test]
    async fn test_publisher_bound_to_trigger() {
        let engine = Arc::new(InMemoryPubSub::new(4));
        let mut stream = engine.subscribe("NOTIFICATIONS");
        let publisher = Publisher::new(engine.clone(), "NOTIFICATIONS");

        assert_eq!(publisher.trigger(), "NOTIFICATIONS");
        publisher.publish(json!("hello")).await.unwrap();

        assert_eq!(stream.next().await, Some(json!("hello")));
        assert_eq!(engine.subscriber_count("NOTIFICATIONS"), 1);
    }
}
