//! Catalog of channels a client may subscribe to.
//!
//! A channel is the client-facing name; the stream is the hub key that
//! publishers target. Only the counter channel exists today.

use std::fmt;

/// Stream name that counter updates are published to.
pub const COUNTER_STREAM: &str = "counter";

/// A subscribable channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Streams from [`COUNTER_STREAM`].
    Counter,
}

impl Channel {
    /// Resolves a client-supplied identifier to a channel.
    ///
    /// Accepts the stream name (`"counter"`) or the class-style name
    /// (`"CounterChannel"`). Returns `None` for anything else.
    #[must_use]
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier.trim() {
            "counter" | "CounterChannel" => Some(Self::Counter),
            _ => None,
        }
    }

    /// The stream this channel reads from.
    #[must_use]
    pub const fn stream(self) -> &'static str {
        match self {
            Self::Counter => COUNTER_STREAM,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stream())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_identifiers() {
        assert_eq!(Channel::from_identifier("counter"), Some(Channel::Counter));
        assert_eq!(
            Channel::from_identifier("CounterChannel"),
            Some(Channel::Counter)
        );
        assert_eq!(Channel::from_identifier(" counter "), Some(Channel::Counter));
    }

    #[test]
    fn rejects_unknown_identifiers() {
        assert_eq!(Channel::from_identifier("chat"), None);
        assert_eq!(Channel::from_identifier(""), None);
    }

    #[test]
    fn counter_streams_from_counter() {
        assert_eq!(Channel::Counter.stream(), COUNTER_STREAM);
        assert_eq!(Channel::Counter.to_string(), "counter");
    }
}
