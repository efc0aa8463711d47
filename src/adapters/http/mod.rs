//! HTTP adapters - REST control surface and the subscriber WebSocket route.

pub mod listener;

use axum::http::HeaderValue;
use axum::{routing::get, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{ws_handler, WebSocketState};

pub use listener::{listener_routes, ListenerAppState};

/// Full API router, mounted under `/api`.
///
/// # Routes
/// - `POST /api/listener/start`
/// - `POST /api/listener/stop`
/// - `POST /api/gift/refresh`
/// - `GET /api/ws/:room_id` - Subscriber WebSocket
pub fn api_router(
    listener: ListenerAppState,
    websocket: WebSocketState,
    cors: CorsLayer,
) -> Router {
    let control = listener_routes().with_state(listener);
    let stream = Router::new()
        .route("/ws/:room_id", get(ws_handler))
        .with_state(websocket);

    Router::new()
        .nest("/api", control.merge(stream))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// CORS policy for the given origins. No origins allows any.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    }
}
