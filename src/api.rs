//! Unified API router for EventManager
//!
//! Mounts the events router under the configured base path and adds the
//! health probe, CORS and request tracing.
//!
//! ## Endpoint Map
//!
//! | Path                           | Description                  |
//! |--------------------------------|------------------------------|
//! | `/health`                      | Load balancer health probe   |
//! | `{base}/events`                | List (GET) / create (POST)   |
//! | `{base}/events/locations`      | Distinct locations           |
//! | `{base}/events/:id`            | Delete (DELETE)              |

use crate::config::ServerConfig;
use crate::events::{events_router, EventsState};
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete EventManager HTTP application
pub fn build_app(events_state: EventsState, server: &ServerConfig) -> Router {
    let events = events_router(events_state);
    let events = if server.base_path.is_empty() {
        events
    } else {
        Router::new().nest(&server.base_path, events)
    };

    Router::new()
        .route("/health", get(health_check))
        .merge(events)
        .fallback(not_found)
        .layer(build_cors(&server.cors_origins))
        .layer(TraceLayer::new_for_http())
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(crate::events::types::ApiError::not_found("No such route")),
    )
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                    None
                }
            })
            .collect();
        cors.allow_origin(parsed)
    }
}
