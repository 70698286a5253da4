//! Key-Value Persistence Seam
//!
//! The history and reminder repositories persist whole collections as JSON
//! text under a single key. Anything that can get and set strings by key can
//! back them: the SQLite settings table in the application, or
//! [`MemoryStore`] in tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{CoreError, CoreResult};

/// Storage key for the identification history collection.
pub const HISTORY_KEY: &str = "flora_history";

/// Storage key for the reminder collection.
pub const REMINDERS_KEY: &str = "flora_reminders";

/// String-keyed persistence substrate.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> CoreResult<Option<String>>;

    /// Overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> CoreResult<()>;
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| CoreError::internal(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| CoreError::internal(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(HISTORY_KEY).unwrap(), None);

        store.set(HISTORY_KEY, "[]").unwrap();
        assert_eq!(store.get(HISTORY_KEY).unwrap(), Some("[]".to_string()));

        store.set(HISTORY_KEY, "[1]").unwrap();
        assert_eq!(store.get(HISTORY_KEY).unwrap(), Some("[1]".to_string()));
        assert_eq!(store.get(REMINDERS_KEY).unwrap(), None);
    }
}
