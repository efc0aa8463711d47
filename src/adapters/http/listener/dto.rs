//! Request/response DTOs for the listener control endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Credential, RoomId, ValidationError};
use crate::domain::live::GiftCatalogEntry;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Room id as sent by clients, either a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RoomIdParam {
    Number(u64),
    Text(String),
}

impl RoomIdParam {
    pub fn parse(&self) -> Result<RoomId, ValidationError> {
        match self {
            RoomIdParam::Number(id) => RoomId::new(*id),
            RoomIdParam::Text(raw) => raw.parse(),
        }
    }
}

/// Request to start listening to a room.
#[derive(Debug, Clone, Deserialize)]
pub struct StartListenRequest {
    pub room_id: RoomIdParam,
    /// Upstream session token. Omitted or blank means an anonymous listen.
    #[serde(default, alias = "sessdata")]
    pub credential: Option<String>,
}

impl StartListenRequest {
    pub fn credential(&self) -> Option<Credential> {
        Credential::from_optional(self.credential.clone())
    }
}

/// Request to stop listening. Without a room id the active room is stopped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopListenRequest {
    #[serde(default)]
    pub room_id: Option<RoomIdParam>,
}

/// Request to refresh a room's gift catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshGiftsRequest {
    pub room_id: RoomIdParam,
    #[serde(default, alias = "sessdata")]
    pub credential: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartListenResponse {
    pub message: String,
    pub room_id: RoomId,
    /// Path viewers connect to for the room's event stream.
    pub stream_url: String,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
}

impl StartListenResponse {
    pub fn new(room_id: RoomId) -> Self {
        Self {
            message: format!("Listening to room {}", room_id),
            room_id,
            stream_url: format!("/api/ws/{}", room_id),
            protocol: "websocket".to_string(),
            room_title: None,
            host_name: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopListenResponse {
    pub message: String,
    /// Room that was stopped, absent when nothing was listening.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshGiftsResponse {
    pub message: String,
    pub count: usize,
    pub gifts: Vec<GiftCatalogEntry>,
}

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_id_accepts_number_or_string() {
        let numeric: StartListenRequest = serde_json::from_str(r#"{"room_id": 21452505}"#).unwrap();
        let text: StartListenRequest = serde_json::from_str(r#"{"room_id": "21452505"}"#).unwrap();

        assert_eq!(numeric.room_id.parse().unwrap(), text.room_id.parse().unwrap());
    }

    #[test]
    fn zero_or_garbage_room_id_is_rejected() {
        assert!(RoomIdParam::Number(0).parse().is_err());
        assert!(RoomIdParam::Text("abc".into()).parse().is_err());
    }

    #[test]
    fn blank_credential_means_anonymous() {
        let req: StartListenRequest =
            serde_json::from_str(r#"{"room_id": 1, "sessdata": "  "}"#).unwrap();
        assert!(req.credential().is_none());

        let req: StartListenRequest =
            serde_json::from_str(r#"{"room_id": 1, "credential": "tok"}"#).unwrap();
        assert!(req.credential().is_some());
    }

    #[test]
    fn stop_request_room_is_optional() {
        let req: StopListenRequest = serde_json::from_str("{}").unwrap();
        assert!(req.room_id.is_none());
    }

    #[test]
    fn start_response_omits_unresolved_metadata() {
        let response = StartListenResponse::new(RoomId::new(7).unwrap());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["stream_url"], "/api/ws/7");
        assert_eq!(json["protocol"], "websocket");
        assert_eq!(json["room_id"], 7);
        assert!(json.get("room_title").is_none());
    }
}
