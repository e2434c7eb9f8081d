use super::bus::MessageBus;
use super::registry::ConnectionRegistry;
use crate::events::ChangeEvent;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{error, warn};

/// Fans a change event out to the message bus and to all live WebSocket
/// subscribers.
///
/// `announce` always succeeds from the caller's point of view: a bus
/// failure is logged and swallowed, and WebSocket failures are already
/// isolated per connection inside the registry. No ordering is guaranteed
/// between the two channels.
#[derive(Clone)]
pub struct Notifier {
    bus: Arc<dyn MessageBus>,
    registry: Arc<ConnectionRegistry>,
    topic: String,
}

impl Notifier {
    pub fn new(
        bus: Arc<dyn MessageBus>,
        registry: Arc<ConnectionRegistry>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            bus,
            registry,
            topic: topic.into(),
        }
    }

    /// Deliver `event` to both channels, best effort.
    pub async fn announce(&self, event: &ChangeEvent) {
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "failed to serialize change event, dropping it");
                return;
            }
        };

        if let Err(e) = self
            .bus
            .publish(&self.topic, Bytes::from(json.clone()))
            .await
        {
            warn!(error = %e, topic = %self.topic, "bus publish failed");
        }

        self.registry.broadcast(&json).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RateItem;
    use crate::notify::bus::BusError;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use tokio::sync::Mutex;

    /// Records publishes; optionally fails every one of them.
    struct RecordingBus {
        published: Mutex<Vec<(String, Bytes)>>,
        fail: bool,
    }

    impl RecordingBus {
        fn new(fail: bool) -> Self {
            Self {
                published: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl MessageBus for RecordingBus {
        async fn publish(&self, topic: &str, payload: Bytes) -> Result<(), BusError> {
            self.published
                .lock()
                .await
                .push((topic.to_string(), payload));
            if self.fail {
                Err(BusError::Unavailable("broker down".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn sample_event() -> ChangeEvent {
        ChangeEvent::created(RateItem {
            id: 1,
            base_currency: "USD".to_string(),
            target_currency: "EUR".to_string(),
            rate: Decimal::new(90, 2),
        })
    }

    #[tokio::test]
    async fn announce_publishes_once_and_reaches_every_subscriber() {
        let bus = Arc::new(RecordingBus::new(false));
        let registry = Arc::new(ConnectionRegistry::new());
        let notifier = Notifier::new(bus.clone(), registry.clone(), "items.updates");

        let (_a, mut rx_a) = registry.register().await;
        let (_b, mut rx_b) = registry.register().await;

        notifier.announce(&sample_event()).await;

        let published = bus.published.lock().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "items.updates");

        let frame_a = rx_a.recv().await.unwrap();
        let frame_b = rx_b.recv().await.unwrap();
        assert_eq!(frame_a, frame_b);
        let json: serde_json::Value = serde_json::from_str(&frame_a).unwrap();
        assert_eq!(json["type"], "created");
        assert_eq!(json["item"]["rate"], "0.90");
    }

    #[tokio::test]
    async fn bus_failure_does_not_block_the_broadcast() {
        let bus = Arc::new(RecordingBus::new(true));
        let registry = Arc::new(ConnectionRegistry::new());
        let notifier = Notifier::new(bus.clone(), registry.clone(), "items.updates");

        let (_id, mut rx) = registry.register().await;

        notifier.announce(&sample_event()).await;

        // Publish was attempted exactly once despite failing.
        assert_eq!(bus.published.lock().await.len(), 1);
        // The WebSocket channel still got the event.
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn announce_with_no_subscribers_still_publishes() {
        let bus = Arc::new(RecordingBus::new(false));
        let registry = Arc::new(ConnectionRegistry::new());
        let notifier = Notifier::new(bus.clone(), registry.clone(), "items.updates");

        notifier.announce(&sample_event()).await;

        assert_eq!(bus.published.lock().await.len(), 1);
        assert_eq!(registry.connection_count().await, 0);
    }
}
