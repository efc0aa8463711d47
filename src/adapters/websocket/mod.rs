//! WebSocket transport for room subscribers.
//!
//! # Architecture
//!
//! ```text
//! RoomListenerManager ── broadcast ──► QueuedSubscriber (bounded queue)
//!                                            │
//!                                            ▼
//!                                     writer task ──► WebSocket ──► viewer
//! ```
//!
//! # Components
//!
//! - [`messages`] - Control message protocol types
//! - [`subscriber`] - Queue-backed `SubscriberConnection`
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod handler;
pub mod messages;
pub mod subscriber;

pub use handler::{ws_handler, WebSocketState, DEFAULT_OUTBOUND_CAPACITY};
pub use messages::{ClientMessage, ServerMessage};
pub use subscriber::{OutboundFrame, QueuedSubscriber};
