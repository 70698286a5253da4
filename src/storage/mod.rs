//! Storage Layer
//!
//! Handles all data persistence: SQLite key-value database and JSON config.

pub mod config;
pub mod database;

pub use config::*;
pub use database::*;
