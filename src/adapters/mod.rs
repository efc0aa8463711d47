//! Adapters - Implementations of port interfaces.
//!
//! - `bilibili` - Web API lookups (room info, profiles, gift panel)
//! - `http` - REST control surface
//! - `memory` - In-memory history store
//! - `postgres` - PostgreSQL history store
//! - `upstream` - Upstream event source implementations
//! - `websocket` - Subscriber transport

pub mod bilibili;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod upstream;
pub mod websocket;
