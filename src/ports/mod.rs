//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the listener core and the outside world. Adapters implement these ports.
//!
//! ## Room Ports
//!
//! - `UpstreamClient` - Wire-protocol client delivering typed room events
//! - `SubscriberConnection` - One outbound viewer connection
//!
//! ## Storage Ports
//!
//! - `HistoryRepository` - Event history, room records, gift catalog
//!
//! ## Lookup Ports
//!
//! - `RoomInfoProvider` - Room title and host name
//! - `ProfileLookup` - Sender avatars
//! - `GiftCatalogProvider` - Room gift panel

mod gift_catalog_provider;
mod history_repository;
mod profile_lookup;
mod room_info_provider;
mod subscriber_connection;
mod upstream_client;

pub use gift_catalog_provider::GiftCatalogProvider;
pub use history_repository::HistoryRepository;
pub use profile_lookup::ProfileLookup;
pub use room_info_provider::{LookupError, RoomInfo, RoomInfoProvider};
pub use subscriber_connection::{DeliveryError, SubscriberConnection};
pub use upstream_client::{UpstreamClient, UpstreamConnection, UpstreamError, UpstreamHandle};
