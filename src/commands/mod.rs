//! Commands
//!
//! Entry points for the presentation layer. Every command returns a
//! `CommandResponse`; errors never escape as panics or `Err` values.

pub mod health;
pub mod history;
pub mod identification;
pub mod reminders;
pub mod settings;

pub use health::*;
pub use history::*;
pub use identification::*;
pub use reminders::*;
pub use settings::*;
