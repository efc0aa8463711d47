//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps and error types that form the
//! vocabulary of the relay domain.

mod credential;
mod errors;
mod ids;
mod timestamp;

pub use credential::Credential;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ConnectionId, RoomId, Uid};
pub use timestamp::Timestamp;
