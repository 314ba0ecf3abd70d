//! # visitor-counter
//!
//! Visitor CRUD service with a WebSocket broadcast channel.
//!
//! Visitors are rows holding a single integer `counter`, managed through
//! REST endpoints. Independently, clients connected to `/cable` can
//! subscribe to the `counter` stream and receive whatever is published to
//! it. The two halves do not talk to each other.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)      ├── Cable Handler (ws/)
//!     │                             │
//!     ├── VisitorService (service/) ├── ChannelHub (domain/)
//!     │
//!     └── VisitorStore (persistence/): PostgreSQL or in-memory
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
