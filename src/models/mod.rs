//! Data Models
//!
//! Contains all data structures used throughout the application.

pub mod history;
pub mod reminder;
pub mod response;
pub mod settings;

pub use history::*;
pub use reminder::*;
pub use response::*;
pub use settings::*;
