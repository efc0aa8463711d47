//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresHistoryRepository` - Event history, rooms and gift catalog
//! - `connect_pool` / `run_migrations` - Pool setup and embedded schema

mod history_repository;
mod pool;

pub use history_repository::PostgresHistoryRepository;
pub use pool::{connect_pool, run_migrations};
