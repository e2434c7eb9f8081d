use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use thiserror::Error;

/// Errors raised by message-bus operations.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("bus publish error: {0}")]
    Publish(#[from] async_nats::PublishError),

    #[error("bus subscribe error: {0}")]
    Subscribe(#[from] async_nats::SubscribeError),

    #[error("bus unavailable: {0}")]
    Unavailable(String),
}

/// Fire-and-forget publish capability of the external message bus.
///
/// Behind a trait so the fan-out path can be exercised in tests without a
/// running broker.
#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<(), BusError>;
}

/// NATS-backed message bus.
pub struct NatsBus {
    client: async_nats::Client,
}

impl NatsBus {
    pub async fn connect(url: &str) -> Result<Self, async_nats::ConnectError> {
        let client = async_nats::connect(url).await?;
        Ok(Self { client })
    }

    /// Subscribe to `topic` and spawn a task that logs every message
    /// received there. Nothing in the core consumes these messages; the
    /// subscription exists to make bus traffic visible at startup.
    pub async fn spawn_log_subscriber(&self, topic: &str) -> Result<(), BusError> {
        let mut subscriber = self.client.subscribe(topic.to_string()).await?;
        let topic = topic.to_string();

        tokio::spawn(async move {
            while let Some(message) = subscriber.next().await {
                match serde_json::from_slice::<serde_json::Value>(&message.payload) {
                    Ok(payload) => {
                        tracing::info!(topic = %topic, %payload, "bus message received");
                    }
                    Err(_) => {
                        tracing::warn!(topic = %topic, "bus message with non-JSON payload");
                    }
                }
            }
            tracing::debug!(topic = %topic, "bus log subscriber closed");
        });

        Ok(())
    }
}

#[async_trait]
impl MessageBus for NatsBus {
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<(), BusError> {
        self.client.publish(topic.to_string(), payload).await?;
        Ok(())
    }
}
