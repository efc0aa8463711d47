//! Application layer - Listening pipeline orchestration.
//!
//! Coordinates the domain normalizer with the ports: the single active room
//! session, per-room subscriber fan-out, write-through history and the side
//! lookups run at listen start.

mod avatar_backfill;
mod errors;
mod gift_catalog;
mod listener_manager;
mod metadata_fetcher;
mod room_client_registry;
mod subscriber_registry;

pub use avatar_backfill::AvatarBackfill;
pub use errors::{FailureSink, ListenerError, ListenerFailure};
pub use gift_catalog::{GiftCatalogError, GiftCatalogService};
pub use listener_manager::{ListenerPorts, ListenerSettings, RoomListenerManager};
pub use metadata_fetcher::{MetadataError, RoomMetadataFetcher, UNKNOWN_HOST};
pub use room_client_registry::{
    RoomClientRegistry, RoomEventSink, SessionContext, SessionEnd, SlotGuard, StartOutcome,
};
pub use subscriber_registry::{BroadcastReport, SubscriberRegistry};
