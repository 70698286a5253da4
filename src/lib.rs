//! Flora Lens - Plant Identification Library
//!
//! This library provides the backend for the Flora Lens application.
//! It includes:
//! - Command handlers for the presentation layer
//! - Identification orchestration, history and reminders
//! - Storage layer (SQLite, Config)
//! - Data models and utilities

pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

// Re-export commonly used items from commands
pub use commands::{
    // Identification commands
    identify_image, lookup_plant,
    // History commands
    list_history, get_history_record, remove_history_record,
    // Reminder commands
    list_reminders, add_reminder, accept_suggested_reminder, toggle_reminder, remove_reminder,
    // Settings commands
    get_settings, update_settings, reset_settings,
    // Health commands
    get_health,
};
// Re-export models (avoiding settings module conflict)
pub use models::response::*;
pub use models::settings::{AppConfig, SettingsUpdate};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
