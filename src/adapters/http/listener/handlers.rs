//! HTTP handlers for the listener control endpoints.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::{GiftCatalogError, GiftCatalogService, ListenerError, RoomListenerManager};
use crate::domain::foundation::{Credential, ValidationError};
use crate::ports::{LookupError, UpstreamError};

use super::dto::{
    ErrorResponse, RefreshGiftsRequest, RefreshGiftsResponse, StartListenRequest,
    StartListenResponse, StopListenRequest, StopListenResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ListenerAppState {
    pub listener: Arc<RoomListenerManager>,
    pub gifts: Arc<GiftCatalogService>,
}

impl ListenerAppState {
    pub fn new(listener: Arc<RoomListenerManager>, gifts: Arc<GiftCatalogService>) -> Self {
        Self { listener, gifts }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/listener/start - Listen to a room, replacing any other
pub async fn start_listen(
    State(state): State<ListenerAppState>,
    Json(request): Json<StartListenRequest>,
) -> Result<impl IntoResponse, ListenerApiError> {
    let room_id = request.room_id.parse()?;
    let credential = request.credential();

    let record = state.listener.start_listening(room_id, credential).await?;

    let mut response = StartListenResponse::new(room_id);
    if let Some(record) = record {
        response.room_title = Some(record.title);
        response.host_name = Some(record.host);
    }

    Ok(Json(response))
}

/// POST /api/listener/stop - Stop a room, or the active one
///
/// An empty body stops whatever is active. A body that does not parse is
/// rejected and nothing is stopped.
pub async fn stop_listen(
    State(state): State<ListenerAppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ListenerApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        StopListenRequest::default()
    } else {
        serde_json::from_slice::<StopListenRequest>(&body)
            .map_err(|e| ValidationError::invalid_format("room_id", e.to_string()))?
    };
    let room_id = match request.room_id {
        Some(param) => Some(param.parse()?),
        None => None,
    };

    let stopped = state.listener.stop_listening(room_id).await;

    let message = match stopped {
        Some(room) => format!("Stopped listening to room {}", room),
        None => "No room is being listened to".to_string(),
    };

    Ok(Json(StopListenResponse {
        message,
        room_id: stopped,
    }))
}

/// POST /api/gift/refresh - Replace the stored gift catalog with a room's panel
pub async fn refresh_gifts(
    State(state): State<ListenerAppState>,
    Json(request): Json<RefreshGiftsRequest>,
) -> Result<impl IntoResponse, ListenerApiError> {
    let room_id = request.room_id.parse()?;
    let credential = Credential::from_optional(request.credential);

    let gifts = state.gifts.refresh(room_id, credential.as_ref()).await?;

    Ok(Json(RefreshGiftsResponse {
        message: format!("Gift catalog of room {} updated", room_id),
        count: gifts.len(),
        gifts,
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts application errors to HTTP responses.
#[derive(Debug)]
pub enum ListenerApiError {
    InvalidRoomId(ValidationError),
    Listener(ListenerError),
    Gifts(GiftCatalogError),
}

impl From<ValidationError> for ListenerApiError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidRoomId(err)
    }
}

impl From<ListenerError> for ListenerApiError {
    fn from(err: ListenerError) -> Self {
        Self::Listener(err)
    }
}

impl From<GiftCatalogError> for ListenerApiError {
    fn from(err: GiftCatalogError) -> Self {
        Self::Gifts(err)
    }
}

impl IntoResponse for ListenerApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code) = match &self {
            ListenerApiError::InvalidRoomId(_) => (StatusCode::BAD_REQUEST, "INVALID_ROOM_ID"),
            ListenerApiError::Listener(ListenerError::Upstream { source, .. }) => match source {
                UpstreamError::RoomNotFound(_) => (StatusCode::NOT_FOUND, "ROOM_NOT_FOUND"),
                UpstreamError::Rejected(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_REJECTED"),
                UpstreamError::Connect(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE"),
            },
            ListenerApiError::Gifts(GiftCatalogError::Lookup(LookupError::RateLimited)) => {
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED")
            }
            ListenerApiError::Gifts(GiftCatalogError::Lookup(_)) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE")
            }
            ListenerApiError::Gifts(GiftCatalogError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let message = match &self {
            ListenerApiError::InvalidRoomId(err) => err.to_string(),
            ListenerApiError::Listener(err) => err.to_string(),
            ListenerApiError::Gifts(GiftCatalogError::Storage(err)) => {
                tracing::error!(error = %err, "Gift catalog storage failed");
                "Failed to store gift catalog".to_string()
            }
            ListenerApiError::Gifts(err) => err.to_string(),
        };

        (status, Json(ErrorResponse::new(error_code, message))).into_response()
    }
}
