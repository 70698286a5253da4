//! Reminder Models
//!
//! Maintenance tasks and their keyword-derived categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of a maintenance task, derived from its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderCategory {
    Hydration,
    Light,
    Nutrient,
    Soil,
    General,
}

impl ReminderCategory {
    /// Icon shown next to a task of this category.
    pub fn icon(&self) -> &'static str {
        match self {
            ReminderCategory::Hydration => "💧",
            ReminderCategory::Light => "☀️",
            ReminderCategory::Nutrient => "🧪",
            ReminderCategory::Soil => "🌱",
            ReminderCategory::General => "🌿",
        }
    }
}

impl std::fmt::Display for ReminderCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReminderCategory::Hydration => write!(f, "hydration"),
            ReminderCategory::Light => write!(f, "light"),
            ReminderCategory::Nutrient => write!(f, "nutrient"),
            ReminderCategory::Soil => write!(f, "soil"),
            ReminderCategory::General => write!(f, "general"),
        }
    }
}

/// A scheduled maintenance task for one plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderTask {
    pub id: String,
    pub plant_name: String,
    pub task: String,
    pub due_at: DateTime<Utc>,
    pub done: bool,
    pub category: ReminderCategory,
    /// Emoji for `category`, stored with the task for display
    pub icon: String,
}
