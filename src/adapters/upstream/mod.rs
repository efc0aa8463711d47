//! Upstream client adapters.
//!
//! The real wire-protocol client lives outside this crate and implements
//! [`crate::ports::UpstreamClient`]. This module ships the mock used by
//! tests and local runs.

mod mock;

pub use mock::{ConnectRecord, MockUpstreamClient};
