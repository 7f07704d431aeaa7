//! Storage module for persistent data storage
//!
//! Provides the SQLite-based record store.

mod database;

pub use database::SqliteStore;
