use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};

/// Identifier assigned to a registered WebSocket subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

struct Connection {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<String>,
}

/// Tracks live WebSocket subscriber handles.
///
/// A handle is the sending half of an unbounded channel; the WebSocket
/// handler task owns the receiving half and forwards frames to its socket.
/// A failed send means the handler task is gone, so the handle is collected
/// during the broadcast pass and pruned only after the pass completes — the
/// active set is never mutated while it is being iterated.
///
/// The set is unbounded and applies no backpressure; a dead subscriber is
/// only detected reactively on its next failed send.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<Vec<Connection>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new subscriber, returning its id and the receiving half of
    /// its outbound channel.
    pub async fn register(&self) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let mut connections = self.connections.lock().await;
        connections.push(Connection { id, tx });
        info!(connection = ?id, total = connections.len(), "WebSocket subscriber registered");

        (id, rx)
    }

    /// Remove a subscriber. Removing an unknown id is a no-op.
    pub async fn unregister(&self, id: ConnectionId) {
        let mut connections = self.connections.lock().await;
        let before = connections.len();
        connections.retain(|conn| conn.id != id);
        if connections.len() < before {
            info!(connection = ?id, total = connections.len(), "WebSocket subscriber unregistered");
        }
    }

    /// Deliver `text` to every subscriber in registration order.
    ///
    /// Subscribers whose delivery fails are unregistered after the full
    /// pass; they receive no further broadcasts.
    pub async fn broadcast(&self, text: &str) {
        let mut connections = self.connections.lock().await;

        let mut dead: Vec<ConnectionId> = Vec::new();
        for conn in connections.iter() {
            if conn.tx.send(text.to_string()).is_err() {
                debug!(connection = ?conn.id, "broadcast delivery failed");
                dead.push(conn.id);
            }
        }

        if !dead.is_empty() {
            connections.retain(|conn| !dead.contains(&conn.id));
            info!(
                pruned = dead.len(),
                total = connections.len(),
                "pruned dead WebSocket subscribers after broadcast"
            );
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber() {
        let registry = ConnectionRegistry::new();
        let (_id_a, mut rx_a) = registry.register().await;
        let (_id_b, mut rx_b) = registry.register().await;

        registry.broadcast("hello").await;

        assert_eq!(rx_a.recv().await.as_deref(), Some("hello"));
        assert_eq!(rx_b.recv().await.as_deref(), Some("hello"));
        assert_eq!(registry.connection_count().await, 2);
    }

    #[tokio::test]
    async fn failed_subscriber_is_pruned_after_the_pass() {
        let registry = ConnectionRegistry::new();
        let (_id_a, rx_a) = registry.register().await;
        let (_id_b, mut rx_b) = registry.register().await;

        // Dropping the receiver makes the next send to it fail.
        drop(rx_a);
        registry.broadcast("first").await;

        assert_eq!(registry.connection_count().await, 1);
        assert_eq!(rx_b.recv().await.as_deref(), Some("first"));

        // The surviving subscriber keeps receiving.
        registry.broadcast("second").await;
        assert_eq!(rx_b.recv().await.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn unregister_stops_delivery() {
        let registry = ConnectionRegistry::new();
        let (id, mut rx) = registry.register().await;

        registry.unregister(id).await;
        registry.broadcast("gone").await;

        assert_eq!(registry.connection_count().await, 0);
        // Channel is closed once the sender half is dropped by unregister.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn broadcast_to_empty_registry_is_a_noop() {
        let registry = ConnectionRegistry::new();
        registry.broadcast("nobody home").await;
        assert_eq!(registry.connection_count().await, 0);
    }
}
