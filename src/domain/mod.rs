//! Domain layer - Core business logic.
//!
//! - `foundation` - identifiers, timestamps and shared error types
//! - `live` - upstream room events, normalization and pricing rules

pub mod foundation;
pub mod live;
