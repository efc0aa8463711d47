//! Axum router configuration for the listener control endpoints.

use axum::{routing::post, Router};

use super::handlers::{refresh_gifts, start_listen, stop_listen, ListenerAppState};

/// Create the listener control router.
///
/// # Routes
/// - `POST /listener/start` - Listen to a room
/// - `POST /listener/stop` - Stop a room, or whatever is active
/// - `POST /gift/refresh` - Refresh the stored gift catalog
pub fn listener_routes() -> Router<ListenerAppState> {
    Router::new()
        .route("/listener/start", post(start_listen))
        .route("/listener/stop", post(stop_listen))
        .route("/gift/refresh", post(refresh_gifts))
}
