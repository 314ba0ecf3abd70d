//! REST API layer: route handlers, DTOs, request decoding, and router
//! composition.

pub mod dto;
pub mod handlers;
pub mod openapi;
pub mod params;

use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::AppConfig;
use crate::ws::handler::cable_handler;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: REST routes, the `/cable` WebSocket, and
/// the tower middleware stack.
pub fn build_app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        .merge(build_router())
        .route("/cable", get(cable_handler));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs.max(1),
        )))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
