//! Reminder Scheduler
//!
//! Keyword classification of maintenance tasks and the persisted task list
//! stored under [`REMINDERS_KEY`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use flora_lens_core::{KeyValueStore, SuggestedReminder, REMINDERS_KEY};

use crate::models::reminder::{ReminderCategory, ReminderTask};

/// Keyword sets in priority order. The first category with a match wins.
const CATEGORY_KEYWORDS: &[(ReminderCategory, &[&str])] = &[
    (ReminderCategory::Hydration, &["water", "hydrat"]),
    (ReminderCategory::Light, &["sun", "light"]),
    (ReminderCategory::Nutrient, &["fertilize", "nutrient", "feed"]),
    (ReminderCategory::Soil, &["soil", "repot"]),
];

/// Categorize a task by case-insensitive substring match.
pub fn classify(task: &str) -> ReminderCategory {
    let lowered = task.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(ReminderCategory::General)
}

/// Repository for maintenance tasks.
pub struct ReminderScheduler {
    store: Arc<dyn KeyValueStore>,
    tasks: Vec<ReminderTask>,
    due_after: Duration,
}

impl ReminderScheduler {
    /// Load the persisted list with the default 24 hour due window.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_due_hours(store, 24)
    }

    pub fn with_due_hours(store: Arc<dyn KeyValueStore>, due_hours: u32) -> Self {
        let tasks = match store.get(REMINDERS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("[Reminders] Ignoring malformed persisted reminders: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("[Reminders] Could not read persisted reminders: {}", e);
                Vec::new()
            }
        };

        Self {
            store,
            tasks,
            due_after: Duration::hours(i64::from(due_hours)),
        }
    }

    pub fn set_due_hours(&mut self, due_hours: u32) {
        self.due_after = Duration::hours(i64::from(due_hours));
    }

    /// Create a task due one window from now and prepend it.
    ///
    /// Scheduling the same task twice yields two entries.
    pub fn schedule(&mut self, task: &str, plant_name: &str) -> ReminderTask {
        self.schedule_at(task, plant_name, Utc::now())
    }

    /// Same as [`schedule`](Self::schedule) with an explicit creation time.
    pub fn schedule_at(
        &mut self,
        task: &str,
        plant_name: &str,
        created_at: DateTime<Utc>,
    ) -> ReminderTask {
        let category = classify(task);
        let reminder = ReminderTask {
            id: uuid::Uuid::new_v4().to_string(),
            plant_name: plant_name.to_string(),
            task: task.to_string(),
            due_at: created_at + self.due_after,
            done: false,
            category,
            icon: category.icon().to_string(),
        };

        self.tasks.insert(0, reminder.clone());
        tracing::info!(
            "[Reminders] Scheduled '{}' for {} ({})",
            reminder.task,
            reminder.plant_name,
            reminder.category
        );
        self.persist();
        reminder
    }

    /// Accept one of an identification's suggested reminders.
    pub fn schedule_suggestion(
        &mut self,
        suggestion: &SuggestedReminder,
        plant_name: &str,
    ) -> ReminderTask {
        self.schedule(&suggestion.task, plant_name)
    }

    /// Tasks in display order, newest first.
    pub fn list(&self) -> &[ReminderTask] {
        &self.tasks
    }

    /// Flip completion for a task. Returns the updated task.
    pub fn toggle_done(&mut self, id: &str) -> Option<ReminderTask> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.done = !task.done;
        let updated = task.clone();

        tracing::debug!(
            "[Reminders] '{}' marked {}",
            updated.task,
            if updated.done { "done" } else { "pending" }
        );
        self.persist();
        Some(updated)
    }

    /// Remove a task. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return false;
        }
        self.persist();
        true
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.tasks)
            .map_err(flora_lens_core::CoreError::from)
            .and_then(|json| self.store.set(REMINDERS_KEY, &json));

        if let Err(e) = result {
            tracing::warn!("[Reminders] Failed to persist reminders: {}", e);
        }
    }
}

impl std::fmt::Debug for ReminderScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderScheduler")
            .field("tasks", &self.tasks.len())
            .field("due_after", &self.due_after)
            .finish()
    }
}
