//! Per-connection subscription bookkeeping.
//!
//! Tracks which channels a WebSocket client has subscribed to, and under
//! which identifier, so outgoing frames echo the client's own naming.

use std::collections::HashMap;

use crate::domain::Channel;

/// The channels a single connection is subscribed to.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    identifiers: HashMap<Channel, String>,
}

impl SubscriptionSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a subscription. Returns `false` if the channel was already
    /// subscribed; the original identifier is kept.
    pub fn insert(&mut self, channel: Channel, identifier: &str) -> bool {
        if self.identifiers.contains_key(&channel) {
            return false;
        }
        self.identifiers.insert(channel, identifier.to_string());
        true
    }

    /// Forgets a subscription. Returns `true` if one existed.
    pub fn remove(&mut self, channel: Channel) -> bool {
        self.identifiers.remove(&channel).is_some()
    }

    /// Returns the identifier the client used for the channel reading
    /// `stream`, if subscribed.
    #[must_use]
    pub fn identifier_for_stream(&self, stream: &str) -> Option<&str> {
        self.identifiers
            .iter()
            .find(|(channel, _)| channel.stream() == stream)
            .map(|(_, identifier)| identifier.as_str())
    }

    /// Returns the number of active subscriptions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.identifiers.len()
    }
}
