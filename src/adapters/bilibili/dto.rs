//! Response shapes of the upstream web API.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::live::GiftCatalogEntry;
use crate::ports::LookupError;

/// Business code the API returns when requests come too often.
pub const CODE_TOO_FREQUENT: i64 = -799;

/// Common `{ code, message, data }` envelope.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default, alias = "msg")]
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Unwraps the payload of a successful response.
    pub fn into_data(self) -> Result<T, LookupError> {
        match (self.code, self.data) {
            (0, Some(data)) => Ok(data),
            (0, None) => Err(LookupError::Malformed("missing data".to_string())),
            (CODE_TOO_FREQUENT, _) => Err(LookupError::RateLimited),
            (code, _) => Err(LookupError::Api {
                code,
                message: self.message,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RoomInfoData {
    pub title: String,
    /// Host uid.
    #[serde(default)]
    pub uid: u64,
}

#[derive(Debug, Deserialize)]
pub struct MasterInfoData {
    pub info: MasterInfo,
}

#[derive(Debug, Deserialize)]
pub struct MasterInfo {
    #[serde(default)]
    pub uname: String,
}

#[derive(Debug, Deserialize)]
pub struct SpaceInfoData {
    #[serde(default)]
    pub face: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GiftPanelData {
    #[serde(default)]
    pub gift_config: Value,
}

#[derive(Debug, Deserialize)]
struct GiftItem {
    name: String,
    #[serde(default)]
    price: f64,
    #[serde(default)]
    coin_type: Option<String>,
    #[serde(default)]
    img_basic: Option<String>,
    #[serde(default)]
    img_dynamic: Option<String>,
}

impl From<GiftItem> for GiftCatalogEntry {
    fn from(item: GiftItem) -> Self {
        let non_empty = |s: Option<String>| s.filter(|v| !v.is_empty());
        GiftCatalogEntry {
            name: item.name,
            price: item.price,
            coin_type: non_empty(item.coin_type).unwrap_or_else(|| "gold".to_string()),
            image: non_empty(item.img_basic)
                .or_else(|| non_empty(item.img_dynamic))
                .unwrap_or_default(),
        }
    }
}

impl GiftPanelData {
    /// Platform-wide items followed by room-specific ones.
    ///
    /// Sections that are not objects and items without a name are skipped.
    pub fn into_entries(self) -> Vec<GiftCatalogEntry> {
        ["base_config", "room_config"]
            .into_iter()
            .filter_map(|section| {
                self.gift_config
                    .get(section)
                    .filter(|v| v.is_object())
                    .and_then(|v| v.get("list"))
                    .and_then(Value::as_array)
            })
            .flatten()
            .filter_map(|item| serde_json::from_value::<GiftItem>(item.clone()).ok())
            .map(GiftCatalogEntry::from)
            .collect()
    }
}
