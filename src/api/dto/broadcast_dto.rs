//! Broadcast publish DTOs.

use serde::Serialize;
use utoipa::ToSchema;

/// Response body for `POST /broadcasts/{stream}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublishResponse {
    /// Stream the message was published to.
    pub stream: String,
    /// Number of subscribers the message was handed to.
    pub delivered: usize,
}
