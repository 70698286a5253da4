//! Result Cache
//!
//! Bounded, newest-first history of accepted identifications, persisted as a
//! whole collection under [`HISTORY_KEY`]. Persistence is fail-soft: a write
//! that fails is logged and the in-memory view stays authoritative for the
//! session.

use std::sync::Arc;

use chrono::Utc;

use flora_lens_core::{Identification, KeyValueStore, HISTORY_KEY};

use crate::models::history::HistoryRecord;

/// Maximum number of records kept.
pub const HISTORY_LIMIT: usize = 20;

/// Repository for past identifications.
pub struct ResultCache {
    store: Arc<dyn KeyValueStore>,
    records: Vec<HistoryRecord>,
    last_id: i64,
}

impl ResultCache {
    /// Load the persisted collection. A missing, unreadable, or malformed
    /// value starts an empty cache.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let mut records: Vec<HistoryRecord> = match store.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!("[History] Ignoring malformed persisted history: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("[History] Could not read persisted history: {}", e);
                Vec::new()
            }
        };
        records.truncate(HISTORY_LIMIT);

        let last_id = records.iter().map(|r| r.id).max().unwrap_or(0);
        tracing::debug!("[History] Loaded {} record(s)", records.len());

        Self {
            store,
            records,
            last_id,
        }
    }

    /// Prepend a new record, evict past the bound, and persist.
    pub fn record(
        &mut self,
        identification: Identification,
        source_image: Option<String>,
    ) -> HistoryRecord {
        let record = HistoryRecord {
            id: self.next_id(),
            identification,
            source_image,
        };

        self.records.insert(0, record.clone());
        if self.records.len() > HISTORY_LIMIT {
            let evicted = self.records.len() - HISTORY_LIMIT;
            self.records.truncate(HISTORY_LIMIT);
            tracing::debug!("[History] Evicted {} oldest record(s)", evicted);
        }

        tracing::info!(
            "[History] Recorded {} as {}",
            record.identification.common_name,
            record.id
        );
        self.persist();
        record
    }

    /// Records, newest first.
    pub fn list(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// A copy of one record for re-display.
    pub fn get(&self, id: i64) -> Option<HistoryRecord> {
        self.records.iter().find(|r| r.id == id).cloned()
    }

    /// Remove a record by id. Returns whether anything was removed; an
    /// unknown id leaves the collection and storage untouched.
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            return false;
        }

        tracing::info!("[History] Removed record {}", id);
        self.persist();
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Millisecond timestamp, bumped when needed so ids strictly increase.
    fn next_id(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        self.last_id = now.max(self.last_id + 1);
        self.last_id
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.records)
            .map_err(flora_lens_core::CoreError::from)
            .and_then(|json| self.store.set(HISTORY_KEY, &json));

        if let Err(e) = result {
            tracing::warn!("[History] Failed to persist history: {}", e);
        }
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("records", &self.records.len())
            .field("last_id", &self.last_id)
            .finish()
    }
}
