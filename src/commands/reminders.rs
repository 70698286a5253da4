//! Reminder Commands
//!
//! Commands for scheduling and completing plant care tasks.

use crate::models::reminder::ReminderTask;
use crate::models::response::CommandResponse;
use crate::state::AppState;
use crate::utils::error::AppError;

/// List all reminders
pub async fn list_reminders(state: &AppState) -> CommandResponse<Vec<ReminderTask>> {
    state
        .with_reminders(|scheduler| Ok(scheduler.list().to_vec()))
        .await
        .into()
}

/// Schedule a reminder typed in by the user
pub async fn add_reminder(
    state: &AppState,
    plant_name: &str,
    task: &str,
) -> CommandResponse<ReminderTask> {
    let plant_name = plant_name.trim();
    let task = task.trim();
    if plant_name.is_empty() || task.is_empty() {
        return CommandResponse::err("Plant name and task must not be empty");
    }

    state
        .with_reminders_mut(|scheduler| Ok(scheduler.schedule(task, plant_name)))
        .await
        .into()
}

/// Schedule one of a past discovery's suggested reminders
pub async fn accept_suggested_reminder(
    state: &AppState,
    history_id: i64,
    index: usize,
) -> CommandResponse<ReminderTask> {
    state.accept_suggestion(history_id, index).await.into()
}

/// Toggle a reminder between done and pending
pub async fn toggle_reminder(state: &AppState, id: &str) -> CommandResponse<ReminderTask> {
    state
        .with_reminders_mut(|scheduler| {
            scheduler
                .toggle_done(id)
                .ok_or_else(|| AppError::not_found(format!("Reminder {}", id)))
        })
        .await
        .into()
}

/// Remove a reminder
pub async fn remove_reminder(state: &AppState, id: &str) -> CommandResponse<bool> {
    state
        .with_reminders_mut(|scheduler| Ok(scheduler.remove(id)))
        .await
        .into()
}
