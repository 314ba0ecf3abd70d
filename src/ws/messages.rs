//! WebSocket frame types for the cable protocol.
//!
//! Clients send [`ClientCommand`]s; the server answers with
//! [`ServerFrame`]s. Both are JSON text frames.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ConnectionId;

/// Commands that a client can send over the cable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Start receiving messages for a channel.
    Subscribe {
        /// Channel identifier, e.g. `"counter"`.
        identifier: String,
    },
    /// Stop receiving messages for a channel.
    Unsubscribe {
        /// Channel identifier, e.g. `"counter"`.
        identifier: String,
    },
}

/// Frames the server sends to a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// First frame on every connection.
    Welcome {
        /// Server-assigned connection id.
        connection_id: ConnectionId,
    },
    /// The subscription was registered (or already existed).
    ConfirmSubscription {
        /// Identifier echoed from the command.
        identifier: String,
    },
    /// The identifier does not name a known channel.
    RejectSubscription {
        /// Identifier echoed from the command.
        identifier: String,
    },
    /// The subscription is gone. Sent even if there was none.
    ConfirmUnsubscription {
        /// Identifier echoed from the command.
        identifier: String,
    },
    /// A message published to a subscribed stream.
    Message {
        /// Identifier the client subscribed with.
        identifier: String,
        /// Publisher-defined payload.
        message: serde_json::Value,
        /// Publish timestamp.
        timestamp: DateTime<Utc>,
    },
    /// Heartbeat carrying the server time in unix seconds.
    Ping {
        /// Unix timestamp.
        message: i64,
    },
    /// The last client frame could not be handled.
    Error {
        /// Human-readable reason.
        message: String,
    },
}

impl ServerFrame {
    /// Builds an [`ServerFrame::Error`].
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Builds a [`ServerFrame::Ping`] for the current time.
    #[must_use]
    pub fn ping() -> Self {
        Self::Ping {
            message: Utc::now().timestamp(),
        }
    }

    /// Serializes the frame to JSON text.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
