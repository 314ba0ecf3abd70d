//! Cable connection loop.
//!
//! Handles the read/write loop for a single WebSocket connection:
//! dispatches subscribe/unsubscribe commands against the [`ChannelHub`],
//! forwards broadcasts from the connection's inbox, and sends heartbeats.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use super::messages::{ClientCommand, ServerFrame};
use super::subscription::SubscriptionSet;
use crate::domain::{Broadcast, Channel, ChannelHub, ConnectionId};

/// Runs the read/write loop for a single cable connection.
///
/// The connection is removed from every stream when the loop exits,
/// whether the client closed cleanly or the socket failed.
pub async fn run_connection(socket: WebSocket, hub: ChannelHub, ping_interval: Option<Duration>) {
    let connection = ConnectionId::new();
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (inbox_tx, mut inbox_rx) = hub.open_inbox();
    let mut session = CableSession::new(connection, hub.clone(), inbox_tx);
    let mut heartbeat = ping_interval.and_then(heartbeat_interval);

    tracing::debug!(%connection, "cable connection opened");

    let welcome = ServerFrame::Welcome {
        connection_id: connection,
    };
    if ws_tx.send(Message::text(welcome.to_json())).await.is_ok() {
        loop {
            let outgoing = tokio::select! {
                msg = ws_rx.next() => match msg {
                    Some(Ok(Message::Text(text))) => Some(session.handle_text(&text).await),
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => None,
                },
                broadcast = inbox_rx.recv() => match broadcast {
                    Some(broadcast) => session.deliver(broadcast),
                    None => break,
                },
                () = next_heartbeat(heartbeat.as_mut()) => Some(ServerFrame::ping()),
            };

            if let Some(frame) = outgoing
                && ws_tx.send(Message::text(frame.to_json())).await.is_err()
            {
                break;
            }
        }
    }

    let subscriptions = session.subscription_count();
    let dropped = hub.disconnect(connection).await;
    tracing::debug!(%connection, subscriptions, dropped, "cable connection closed");
}

/// Builds the heartbeat timer, first firing one `period` from now.
///
/// Returns `None` when the first deadline is not representable.
fn heartbeat_interval(period: Duration) -> Option<Interval> {
    let start = Instant::now().checked_add(period)?;
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(interval)
}

async fn next_heartbeat(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Command handling state for one connection, independent of the socket.
#[derive(Debug)]
pub struct CableSession {
    connection: ConnectionId,
    hub: ChannelHub,
    inbox: mpsc::Sender<Broadcast>,
    subscriptions: SubscriptionSet,
}

impl CableSession {
    /// Creates a session whose broadcasts are delivered to `inbox`.
    #[must_use]
    pub fn new(connection: ConnectionId, hub: ChannelHub, inbox: mpsc::Sender<Broadcast>) -> Self {
        Self {
            connection,
            hub,
            inbox,
            subscriptions: SubscriptionSet::new(),
        }
    }

    /// Handles a text frame from the client and returns the reply.
    pub async fn handle_text(&mut self, text: &str) -> ServerFrame {
        match serde_json::from_str::<ClientCommand>(text) {
            Ok(command) => self.handle_command(command).await,
            Err(_) if serde_json::from_str::<serde_json::Value>(text).is_ok() => {
                ServerFrame::error("unknown command")
            }
            Err(_) => ServerFrame::error("malformed JSON"),
        }
    }

    /// Applies a parsed command.
    pub async fn handle_command(&mut self, command: ClientCommand) -> ServerFrame {
        match command {
            ClientCommand::Subscribe { identifier } => {
                let Some(channel) = Channel::from_identifier(&identifier) else {
                    tracing::debug!(connection = %self.connection, %identifier, "subscription rejected");
                    return ServerFrame::RejectSubscription { identifier };
                };
                self.subscriptions.insert(channel, &identifier);
                self.hub
                    .subscribe(self.connection, channel.stream(), self.inbox.clone())
                    .await;
                ServerFrame::ConfirmSubscription { identifier }
            }
            ClientCommand::Unsubscribe { identifier } => {
                if let Some(channel) = Channel::from_identifier(&identifier) {
                    self.subscriptions.remove(channel);
                    self.hub.unsubscribe(self.connection, channel.stream()).await;
                }
                ServerFrame::ConfirmUnsubscription { identifier }
            }
        }
    }

    /// Returns how many channels the client is currently subscribed to.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.count()
    }

    /// Turns a broadcast from the inbox into a frame, or `None` if the
    /// connection has since unsubscribed from its stream.
    #[must_use]
    pub fn deliver(&self, broadcast: Broadcast) -> Option<ServerFrame> {
        let identifier = self.subscriptions.identifier_for_stream(&broadcast.stream)?;
        Some(ServerFrame::Message {
            identifier: identifier.to_string(),
            message: broadcast.message,
            timestamp: broadcast.timestamp,
        })
    }
}
