//! Services
//!
//! Business logic services for the application.
//! Services handle the core functionality and are called by commands.

pub mod history;
pub mod identification;
pub mod image;
pub mod reminders;

pub use history::{ResultCache, HISTORY_LIMIT};
pub use identification::{
    Enrichment, EnrichmentDegraded, IdentificationError, IdentificationService,
};
pub use image::{read_image, ImageInput, MAX_IMAGE_SIZE};
pub use reminders::{classify, ReminderScheduler};
