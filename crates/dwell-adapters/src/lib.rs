//! Dwell adapters - Infrastructure implementations
//!
//! This crate contains concrete implementations of the ports defined in
//! dwell-core. It bridges the domain logic with the SQLite session store.

pub mod sqlite;
pub mod testing;

pub use sqlite::SqliteSessionRepository;
pub use testing::FailingSessionRepository;
