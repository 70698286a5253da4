//! History Commands
//!
//! Listing, re-display and removal of past discoveries.

use crate::models::history::{HistoryRecord, HistorySummary};
use crate::models::response::CommandResponse;
use crate::state::AppState;
use crate::utils::error::AppError;

/// List past discoveries, newest first
pub async fn list_history(state: &AppState) -> CommandResponse<Vec<HistorySummary>> {
    state
        .with_history(|cache| Ok(cache.list().iter().map(HistorySummary::from).collect()))
        .await
        .into()
}

/// Get one past discovery
pub async fn get_history_record(state: &AppState, id: i64) -> CommandResponse<HistoryRecord> {
    state
        .with_history(|cache| {
            cache
                .get(id)
                .ok_or_else(|| AppError::not_found(format!("History record {}", id)))
        })
        .await
        .into()
}

/// Permanently remove a discovery.
///
/// The caller is responsible for confirming with the user first. Returns
/// whether a record was removed; an unknown id is not an error.
pub async fn remove_history_record(state: &AppState, id: i64) -> CommandResponse<bool> {
    state
        .with_history_mut(|cache| Ok(cache.remove(id)))
        .await
        .into()
}
