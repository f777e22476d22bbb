//! Message bus trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{MessagingError, Result};

/// Trait for publishing messages to a broker.
///
/// Publication is fire-and-forget at-least-once: the bus does not retry
/// failed publishes, callers decide what a failure means per notification
/// kind.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publishes a JSON payload under a routing key.
    async fn publish(&self, routing_key: &str, payload: serde_json::Value) -> Result<()>;
}

/// A message captured by the in-memory bus.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub routing_key: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Default)]
struct InMemoryBusState {
    published: Vec<PublishedMessage>,
    fail_on_publish: bool,
}

/// In-memory message bus for testing.
///
/// Records every published message and can be configured to fail, which
/// exercises the critical/best-effort distinction in the notifier.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageBus {
    state: Arc<RwLock<InMemoryBusState>>,
}

impl InMemoryMessageBus {
    /// Creates a new in-memory bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the bus to fail every publish call.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().unwrap().fail_on_publish = fail;
    }

    /// Returns every message published so far.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.state.read().unwrap().published.clone()
    }

    /// Returns the messages published under a routing key.
    pub fn published_to(&self, routing_key: &str) -> Vec<PublishedMessage> {
        self.state
            .read()
            .unwrap()
            .published
            .iter()
            .filter(|message| message.routing_key == routing_key)
            .cloned()
            .collect()
    }

    /// Returns the number of published messages.
    pub fn publish_count(&self) -> usize {
        self.state.read().unwrap().published.len()
    }
}

#[async_trait]
impl MessageBus for InMemoryMessageBus {
    async fn publish(&self, routing_key: &str, payload: serde_json::Value) -> Result<()> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_publish {
            return Err(MessagingError::Publish {
                routing_key: routing_key.to_string(),
                reason: "bus unavailable".to_string(),
            });
        }

        state.published.push(PublishedMessage {
            routing_key: routing_key.to_string(),
            payload,
        });
        Ok(())
    }
}
