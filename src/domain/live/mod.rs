//! Live room domain - upstream events, their canonical form and pricing.
//!
//! # Flow
//!
//! ```text
//! UpstreamEvent ──► EventNormalizer ──► CanonicalEvent ──► subscribers
//!                                            │
//!                                            └──► HistoryRecord ──► history tables
//! ```

mod canonical;
mod errors;
mod normalizer;
pub mod pricing;
mod privilege;
mod records;
mod skins;
mod upstream_event;

pub use canonical::{CanonicalEvent, EventKind, Sender};
pub use errors::NormalizeError;
pub use normalizer::EventNormalizer;
pub use privilege::{IdentityRole, PrivilegeTier};
pub use records::{
    ChatRecord, GiftCatalogEntry, GiftRecord, HistoryRecord, MembershipRecord,
    PaidMessageRecord, RoomRecord, SenderColumns,
};
pub use skins::MembershipSkinTable;
pub use upstream_event::{
    ChatMessage, GiftMessage, MembershipMessage, PaidMessage, UpstreamEvent,
};
