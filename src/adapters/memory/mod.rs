//! In-memory adapters for tests and local runs.

mod history_repository;

pub use history_repository::InMemoryHistoryRepository;
