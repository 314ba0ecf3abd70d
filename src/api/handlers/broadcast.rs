//! Broadcast endpoint: publish a message to a pub/sub stream over HTTP.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::PublishResponse;
use crate::app_state::AppState;
use crate::error::{AppError, ErrorResponse};

/// `POST /broadcasts/{stream}` — Publish the JSON body to a stream.
///
/// # Errors
///
/// Returns [`AppError::MalformedBody`] if the body is not JSON.
#[utoipa::path(
    post,
    path = "/broadcasts/{stream}",
    tag = "Broadcasts",
    summary = "Publish to a stream",
    description = "Delivers the request body to every cable connection subscribed to the stream at publish time. Streams without subscribers accept the message and deliver it to nobody.",
    params(
        ("stream" = String, Path, description = "Stream name, e.g. `counter`"),
    ),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Message published", body = PublishResponse),
        (status = 400, description = "Body is not JSON", body = ErrorResponse),
    )
)]
pub async fn publish(
    State(state): State<AppState>,
    Path(stream): Path<String>,
    body: Bytes,
) -> Result<Json<PublishResponse>, AppError> {
    let message: serde_json::Value =
        serde_json::from_slice(&body).map_err(|e| AppError::MalformedBody(e.to_string()))?;

    let delivered = state.channel_hub.publish(&stream, message).await;
    tracing::debug!(%stream, delivered, "broadcast published");

    Ok(Json(PublishResponse { stream, delivered }))
}

/// Broadcast routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/broadcasts/{stream}", post(publish))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::domain::{COUNTER_STREAM, ConnectionId};
    use crate::persistence::VisitorStore;

    #[tokio::test]
    async fn publish_reaches_subscribers() {
        let state = AppState::new(VisitorStore::in_memory(), &AppConfig::default());
        let hub = state.channel_hub.clone();
        let (tx, mut rx) = hub.open_inbox();
        hub.subscribe(ConnectionId::new(), COUNTER_STREAM, tx).await;

        let app = routes().with_state(state);
        let request = Request::post("/broadcasts/counter")
            .body(Body::from(r#"{"count":4}"#))
            .unwrap_or_default();
        let response = app
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {});
        assert_eq!(response.status(), StatusCode::OK);

        let Some(broadcast) = rx.recv().await else {
            panic!("expected broadcast");
        };
        assert_eq!(broadcast.message, serde_json::json!({"count": 4}));
    }

    #[tokio::test]
    async fn non_json_body_is_rejected() {
        let state = AppState::new(VisitorStore::in_memory(), &AppConfig::default());
        let app = routes().with_state(state);
        let request = Request::post("/broadcasts/counter")
            .body(Body::from("hello"))
            .unwrap_or_default();
        let response = app
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {});
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
