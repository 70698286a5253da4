//! History Models
//!
//! A past identification as kept by the result cache.

use serde::{Deserialize, Serialize};

use flora_lens_core::Identification;

/// One accepted identification.
///
/// `id` is the creation time in milliseconds since the Unix epoch, made
/// strictly increasing by the cache so it doubles as a unique token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: i64,
    pub identification: Identification,
    /// Source photo as a `data:` URL, absent for name lookups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_image: Option<String>,
}

/// Result of an identification command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discovery {
    pub identification: Identification,
    /// Set when the result was recorded in history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_id: Option<i64>,
}

/// Compact row for history listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub id: i64,
    pub common_name: String,
    pub scientific_name: String,
    pub health: String,
    pub has_image: bool,
}

impl From<&HistoryRecord> for HistorySummary {
    fn from(record: &HistoryRecord) -> Self {
        Self {
            id: record.id,
            common_name: record.identification.common_name.clone(),
            scientific_name: record.identification.scientific_name.clone(),
            health: record.identification.health_label().to_string(),
            has_image: record.source_image.is_some(),
        }
    }
}
