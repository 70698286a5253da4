//! Reminder Scheduler Integration Tests

use std::sync::Arc;

use chrono::{Duration, Utc};

use flora_lens::models::ReminderCategory;
use flora_lens::services::{classify, ReminderScheduler};
use flora_lens::storage::Database;
use flora_lens_core::KeyValueStore;

use crate::support::identification;

#[test]
fn test_classification_examples() {
    assert_eq!(classify("Water the soil weekly"), ReminderCategory::Hydration);
    assert_eq!(classify("Rotate for even light"), ReminderCategory::Light);
    assert_eq!(classify("Dust the leaves"), ReminderCategory::General);
    assert_eq!(classify("Feed monthly"), ReminderCategory::Nutrient);
    assert_eq!(classify("Repot next spring"), ReminderCategory::Soil);
}

#[test]
fn test_schedule_due_in_24_hours_and_pending() {
    let mut scheduler = ReminderScheduler::load(Arc::new(Database::new_in_memory().unwrap()));
    let before = Utc::now();
    let task = scheduler.schedule("Mist the leaves", "Fern");
    let after = Utc::now();

    assert!(!task.done);
    assert!(task.due_at >= before + Duration::hours(24));
    assert!(task.due_at <= after + Duration::hours(24));
    assert_eq!(task.category, ReminderCategory::General);
    assert_eq!(task.icon, "🌿");
}

#[test]
fn test_duplicate_tasks_are_independent() {
    let mut scheduler = ReminderScheduler::load(Arc::new(Database::new_in_memory().unwrap()));
    let a = scheduler.schedule("Water thoroughly", "Monstera");
    let b = scheduler.schedule("Water thoroughly", "Monstera");

    assert_ne!(a.id, b.id);
    assert_eq!(scheduler.list().len(), 2);
    assert_eq!(scheduler.list()[0], b);
    assert_eq!(scheduler.list()[1], a);
}

#[test]
fn test_accepting_suggestions_persists() {
    let db = Database::new_in_memory().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(db);
    let ident = identification("Swiss Cheese Plant");

    let mut scheduler = ReminderScheduler::load(store.clone());
    for suggestion in &ident.suggested_reminders {
        scheduler.schedule_suggestion(suggestion, &ident.common_name);
    }

    let reloaded = ReminderScheduler::load(store);
    let categories: Vec<ReminderCategory> =
        reloaded.list().iter().map(|t| t.category).collect();
    assert_eq!(
        categories,
        vec![ReminderCategory::General, ReminderCategory::Hydration]
    );
    assert!(reloaded
        .list()
        .iter()
        .all(|t| t.plant_name == "Swiss Cheese Plant"));
}
