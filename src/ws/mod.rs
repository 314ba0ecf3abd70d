//! WebSocket layer: the pub/sub cable.
//!
//! The endpoint at `/cable` lets clients subscribe to channels and receive
//! messages published to their streams through the
//! [`crate::domain::ChannelHub`].

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
