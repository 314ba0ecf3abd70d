//! Domain layer: visitor model and the pub/sub channel hub.
//!
//! This module contains the server-side domain model: visitor identity and
//! record types, the channel catalog, and the hub that tracks which
//! connections are subscribed to which streams.

pub mod channel;
pub mod channel_hub;
pub mod connection_id;
pub mod visitor;
pub mod visitor_id;

pub use channel::{COUNTER_STREAM, Channel};
pub use channel_hub::{Broadcast, ChannelHub};
pub use connection_id::ConnectionId;
pub use visitor::{Visitor, VisitorChanges};
pub use visitor_id::VisitorId;
