//! Connection registry and fan-out for pub/sub streams.
//!
//! [`ChannelHub`] owns the mapping from stream name to the set of
//! connections subscribed to it. Each connection hands the hub the sending
//! half of its own bounded [`mpsc`] inbox; publishing clones the message
//! into every inbox registered for the stream at that moment.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, mpsc};

use super::ConnectionId;

/// A message published to a stream, as seen by a subscriber.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Broadcast {
    /// Stream the message was published to.
    pub stream: String,
    /// Publisher-defined payload.
    pub message: serde_json::Value,
    /// Publish timestamp.
    pub timestamp: DateTime<Utc>,
}

type StreamSubscribers = HashMap<ConnectionId, mpsc::Sender<Broadcast>>;

/// Pub/sub registry shared by every connection.
///
/// Cheap to clone; all clones share one registry.
///
/// # Delivery
///
/// - Only connections registered when [`ChannelHub::publish`] runs see the
///   message. There is no replay.
/// - Delivery is at-most-once. A full or closed inbox drops the message.
/// - Each inbox is FIFO, so a subscriber observes messages in publish order.
#[derive(Debug, Clone)]
pub struct ChannelHub {
    streams: Arc<RwLock<HashMap<String, StreamSubscribers>>>,
    inbox_capacity: usize,
}

impl ChannelHub {
    /// Creates an empty hub whose inboxes buffer up to `inbox_capacity`
    /// undelivered messages.
    #[must_use]
    pub fn new(inbox_capacity: usize) -> Self {
        Self {
            streams: Arc::new(RwLock::new(HashMap::new())),
            inbox_capacity: inbox_capacity.max(1),
        }
    }

    /// Opens a fresh inbox for a connection.
    #[must_use]
    pub fn open_inbox(&self) -> (mpsc::Sender<Broadcast>, mpsc::Receiver<Broadcast>) {
        mpsc::channel(self.inbox_capacity)
    }

    /// Registers `connection` on `stream`.
    ///
    /// Returns `false` if the connection was already registered, in which
    /// case the registration is left untouched.
    pub async fn subscribe(
        &self,
        connection: ConnectionId,
        stream: &str,
        inbox: mpsc::Sender<Broadcast>,
    ) -> bool {
        let mut streams = self.streams.write().await;
        let subscribers = streams.entry(stream.to_string()).or_default();
        if subscribers.contains_key(&connection) {
            return false;
        }
        subscribers.insert(connection, inbox);
        tracing::debug!(%connection, stream, "subscribed");
        true
    }

    /// Removes `connection` from `stream`. A no-op if it was not registered.
    ///
    /// Returns `true` if a registration was removed.
    pub async fn unsubscribe(&self, connection: ConnectionId, stream: &str) -> bool {
        let mut streams = self.streams.write().await;
        let Some(subscribers) = streams.get_mut(stream) else {
            return false;
        };
        let removed = subscribers.remove(&connection).is_some();
        if subscribers.is_empty() {
            streams.remove(stream);
        }
        if removed {
            tracing::debug!(%connection, stream, "unsubscribed");
        }
        removed
    }

    /// Removes `connection` from every stream. Returns how many
    /// registrations were dropped.
    pub async fn disconnect(&self, connection: ConnectionId) -> usize {
        let mut streams = self.streams.write().await;
        let mut removed = 0;
        streams.retain(|_, subscribers| {
            if subscribers.remove(&connection).is_some() {
                removed += 1;
            }
            !subscribers.is_empty()
        });
        removed
    }

    /// Publishes `message` to every connection currently on `stream`.
    ///
    /// Returns the number of inboxes that accepted the message. Publishing
    /// to a stream with no subscribers is not an error.
    pub async fn publish(&self, stream: &str, message: serde_json::Value) -> usize {
        let streams = self.streams.read().await;
        let Some(subscribers) = streams.get(stream) else {
            return 0;
        };

        let broadcast = Broadcast {
            stream: stream.to_string(),
            message,
            timestamp: Utc::now(),
        };

        let mut delivered = 0;
        for (connection, inbox) in subscribers {
            match inbox.try_send(broadcast.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(%connection, stream, "subscriber inbox full, dropping message");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
        delivered
    }

    /// Returns the number of connections registered on `stream`.
    pub async fn subscriber_count(&self, stream: &str) -> usize {
        self.streams
            .read()
            .await
            .get(stream)
            .map_or(0, HashMap::len)
    }
}

impl Default for ChannelHub {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use serde_json::json;

    const STREAM: &str = "counter";

    #[tokio::test]
    async fn publish_without_subscribers_returns_zero() {
        let hub = ChannelHub::new(8);
        assert_eq!(hub.publish(STREAM, json!({"count": 1})).await, 0);
    }

    #[tokio::test]
    async fn subscriber_receives_message_once() {
        let hub = ChannelHub::new(8);
        let conn = ConnectionId::new();
        let (tx, mut rx) = hub.open_inbox();
        assert!(hub.subscribe(conn, STREAM, tx).await);

        assert_eq!(hub.publish(STREAM, json!({"count": 1})).await, 1);

        let Some(received) = rx.recv().await else {
            panic!("expected a broadcast");
        };
        assert_eq!(received.stream, STREAM);
        assert_eq!(received.message, json!({"count": 1}));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn duplicate_subscribe_does_not_double_deliver() {
        let hub = ChannelHub::new(8);
        let conn = ConnectionId::new();
        let (tx, mut rx) = hub.open_inbox();
        assert!(hub.subscribe(conn, STREAM, tx.clone()).await);
        assert!(!hub.subscribe(conn, STREAM, tx).await);

        assert_eq!(hub.publish(STREAM, json!(1)).await, 1);
        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unsubscribed_connection_receives_nothing() {
        let hub = ChannelHub::new(8);
        let conn = ConnectionId::new();
        let (tx, mut rx) = hub.open_inbox();
        hub.subscribe(conn, STREAM, tx).await;
        assert!(hub.unsubscribe(conn, STREAM).await);

        assert_eq!(hub.publish(STREAM, json!(1)).await, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent() {
        let hub = ChannelHub::new(8);
        let conn = ConnectionId::new();
        assert!(!hub.unsubscribe(conn, STREAM).await);

        let (tx, _rx) = hub.open_inbox();
        hub.subscribe(conn, STREAM, tx).await;
        assert!(hub.unsubscribe(conn, STREAM).await);
        assert!(!hub.unsubscribe(conn, STREAM).await);
    }

    #[tokio::test]
    async fn late_subscriber_gets_no_replay() {
        let hub = ChannelHub::new(8);
        hub.publish(STREAM, json!("before")).await;

        let conn = ConnectionId::new();
        let (tx, mut rx) = hub.open_inbox();
        hub.subscribe(conn, STREAM, tx).await;
        hub.publish(STREAM, json!("after")).await;

        let Some(received) = rx.recv().await else {
            panic!("expected a broadcast");
        };
        assert_eq!(received.message, json!("after"));
    }

    #[tokio::test]
    async fn messages_arrive_in_publish_order() {
        let hub = ChannelHub::new(16);
        let conn = ConnectionId::new();
        let (tx, mut rx) = hub.open_inbox();
        hub.subscribe(conn, STREAM, tx).await;

        for n in 0..10 {
            hub.publish(STREAM, json!(n)).await;
        }
        for n in 0..10 {
            let Some(received) = rx.recv().await else {
                panic!("missing broadcast {n}");
            };
            assert_eq!(received.message, json!(n));
        }
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive() {
        let hub = ChannelHub::new(8);
        let (tx1, mut rx1) = hub.open_inbox();
        let (tx2, mut rx2) = hub.open_inbox();
        hub.subscribe(ConnectionId::new(), STREAM, tx1).await;
        hub.subscribe(ConnectionId::new(), STREAM, tx2).await;

        assert_eq!(hub.publish(STREAM, json!("hello")).await, 2);
        assert!(rx1.recv().await.is_some());
        assert!(rx2.recv().await.is_some());
    }

    #[tokio::test]
    async fn closed_inbox_is_silently_skipped() {
        let hub = ChannelHub::new(8);
        let (tx, rx) = hub.open_inbox();
        hub.subscribe(ConnectionId::new(), STREAM, tx).await;
        drop(rx);

        assert_eq!(hub.publish(STREAM, json!(1)).await, 0);
    }

    #[tokio::test]
    async fn full_inbox_drops_message() {
        let hub = ChannelHub::new(1);
        let (tx, mut rx) = hub.open_inbox();
        hub.subscribe(ConnectionId::new(), STREAM, tx).await;

        assert_eq!(hub.publish(STREAM, json!(1)).await, 1);
        assert_eq!(hub.publish(STREAM, json!(2)).await, 0);

        let Some(received) = rx.recv().await else {
            panic!("expected first broadcast");
        };
        assert_eq!(received.message, json!(1));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn disconnect_removes_every_registration() {
        let hub = ChannelHub::new(8);
        let conn = ConnectionId::new();
        let (tx, _rx) = hub.open_inbox();
        hub.subscribe(conn, STREAM, tx.clone()).await;
        hub.subscribe(conn, "other", tx).await;

        assert_eq!(hub.disconnect(conn).await, 2);
        assert_eq!(hub.subscriber_count(STREAM).await, 0);
        assert_eq!(hub.subscriber_count("other").await, 0);
        assert_eq!(hub.disconnect(conn).await, 0);
    }

    #[tokio::test]
    async fn streams_are_isolated() {
        let hub = ChannelHub::new(8);
        let (tx, mut rx) = hub.open_inbox();
        hub.subscribe(ConnectionId::new(), STREAM, tx).await;

        assert_eq!(hub.publish("other", json!(1)).await, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_subscribe_publish_unsubscribe() {
        const CONNECTIONS: usize = 16;
        const MESSAGES: usize = 200;
        const TRAILING: usize = 10;
        let hub = ChannelHub::new(MESSAGES + TRAILING);

        let joins: Vec<_> = (0..CONNECTIONS)
            .map(|_| {
                let hub = hub.clone();
                tokio::spawn(async move {
                    let connection = ConnectionId::new();
                    let (tx, rx) = hub.open_inbox();
                    assert!(hub.subscribe(connection, STREAM, tx).await);
                    (connection, rx)
                })
            })
            .collect();
        let mut inboxes = Vec::with_capacity(CONNECTIONS);
        for join in joins {
            let Ok(entry) = join.await else {
                panic!("subscribe task failed");
            };
            inboxes.push(entry);
        }
        assert_eq!(hub.subscriber_count(STREAM).await, CONNECTIONS);

        // Number of publish calls that have returned so far.
        let published = Arc::new(AtomicUsize::new(0));
        let publisher = {
            let hub = hub.clone();
            let published = Arc::clone(&published);
            tokio::spawn(async move {
                for seq in 0..MESSAGES {
                    hub.publish(STREAM, json!(seq)).await;
                    published.store(seq + 1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                }
            })
        };

        let leavers: Vec<_> = inboxes
            .iter()
            .enumerate()
            .filter(|(n, _)| n % 2 == 1)
            .map(|(n, (connection, _))| {
                let hub = hub.clone();
                let published = Arc::clone(&published);
                let connection = *connection;
                tokio::spawn(async move {
                    for _ in 0..n * 3 {
                        tokio::task::yield_now().await;
                    }
                    assert!(hub.unsubscribe(connection, STREAM).await);
                    (connection, published.load(Ordering::SeqCst))
                })
            })
            .collect();

        let mut left = HashMap::new();
        for join in leavers {
            let Ok((connection, seen)) = join.await else {
                panic!("unsubscribe task failed");
            };
            left.insert(connection, seen);
        }
        let Ok(()) = publisher.await else {
            panic!("publisher task failed");
        };

        let remaining = CONNECTIONS - left.len();
        for seq in MESSAGES..MESSAGES + TRAILING {
            assert_eq!(hub.publish(STREAM, json!(seq)).await, remaining);
        }
        assert_eq!(hub.subscriber_count(STREAM).await, remaining);

        for (connection, mut rx) in inboxes {
            let mut received = Vec::new();
            while let Ok(broadcast) = rx.try_recv() {
                received.push(broadcast.message);
            }
            let in_order: Vec<_> = (0..received.len()).map(|seq| json!(seq)).collect();
            assert_eq!(received, in_order, "gap, duplicate or reorder for {connection}");

            match left.get(&connection) {
                None => assert_eq!(received.len(), MESSAGES + TRAILING),
                // At most one publish can be in flight when the unsubscribe
                // takes the write lock.
                Some(&seen) => assert!(
                    received.len() <= seen + 1,
                    "{connection} got {} messages after unsubscribing at {seen}",
                    received.len()
                ),
            }
        }
    }
}
