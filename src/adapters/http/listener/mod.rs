//! HTTP adapter for the listener control surface.
//!
//! - `POST /api/listener/start` - Listen to a room (replaces any other)
//! - `POST /api/listener/stop` - Stop a room, or the active one
//! - `POST /api/gift/refresh` - Refresh the stored gift catalog

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{ListenerApiError, ListenerAppState};
pub use routes::listener_routes;
