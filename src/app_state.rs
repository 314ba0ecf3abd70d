//! Shared application state injected into all Axum handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::domain::ChannelHub;
use crate::persistence::VisitorStore;
use crate::service::VisitorService;

/// Longest heartbeat period accepted from configuration.
pub const MAX_CABLE_PING_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Visitor CRUD service.
    pub visitor_service: Arc<VisitorService>,
    /// Pub/sub registry for cable connections.
    pub channel_hub: ChannelHub,
    /// Heartbeat period for cable connections. `None` disables pings.
    pub cable_ping_interval: Option<Duration>,
}

impl AppState {
    /// Wires the service and hub around `store`.
    ///
    /// Ping intervals above [`MAX_CABLE_PING_INTERVAL`] are clamped to it.
    #[must_use]
    pub fn new(store: VisitorStore, config: &AppConfig) -> Self {
        let cable_ping_interval = (config.cable_ping_interval_secs > 0).then(|| {
            Duration::from_secs(config.cable_ping_interval_secs).min(MAX_CABLE_PING_INTERVAL)
        });
        Self {
            visitor_service: Arc::new(VisitorService::new(Arc::new(store))),
            channel_hub: ChannelHub::new(config.cable_subscriber_capacity),
            cable_ping_interval,
        }
    }
}
