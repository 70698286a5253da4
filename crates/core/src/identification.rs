//! Identification Data Model
//!
//! The botanical report produced by one identification attempt. Field names
//! serialize in camelCase so persisted history stays readable by any client
//! that speaks the same JSON shape as the inference response.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CoreError, CoreResult};

/// Summary used when the geographic enrichment could not be obtained.
pub const DISTRIBUTION_UNAVAILABLE: &str = "Global distribution data is currently unavailable.";

/// Title given to a location citation that arrives without one.
pub const DEFAULT_LINK_TITLE: &str = "View Distribution";

/// A complete identification result.
///
/// Every field except `map_data` is required by the response schema.
/// `map_data` is attached once, after the enrichment stage, via
/// [`Identification::with_map_data`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identification {
    pub common_name: String,
    pub scientific_name: String,
    pub family: String,
    pub description: String,
    pub care_instructions: CareInstructions,
    pub toxicity: Toxicity,
    pub health_status: HealthStatus,
    pub is_weed: WeedStatus,
    pub suggested_reminders: Vec<SuggestedReminder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_data: Option<MapData>,
}

impl Identification {
    /// Attach the enrichment outcome. A value that is already present is kept.
    pub fn with_map_data(mut self, map_data: MapData) -> Self {
        if self.map_data.is_none() {
            self.map_data = Some(map_data);
        }
        self
    }

    /// Short status label used by history listings.
    pub fn health_label(&self) -> &'static str {
        if self.health_status.is_healthy {
            "Healthy"
        } else {
            "Needs Care"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareInstructions {
    pub watering: String,
    pub sunlight: String,
    pub soil: String,
    pub fertilizer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toxicity {
    pub is_toxic: bool,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub is_healthy: bool,
    pub diagnosis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
    /// 0 to 100
    #[serde(deserialize_with = "deserialize_health_score")]
    pub health_score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeedStatus {
    pub status: bool,
    pub reasoning: String,
}

/// A maintenance task proposed by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedReminder {
    pub task: String,
    pub description: String,
    pub frequency: String,
}

/// Native-range summary with map citations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapData {
    pub summary: String,
    pub links: Vec<MapLink>,
}

impl MapData {
    /// The neutral value used when enrichment degrades.
    pub fn unavailable() -> Self {
        Self {
            summary: DISTRIBUTION_UNAVAILABLE.to_string(),
            links: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapLink {
    pub title: String,
    pub uri: String,
}

/// Accepts any JSON number that is a whole value in 0..=100.
///
/// Providers that type the score as a generic number send `85.0`; the
/// schema validator has already rejected fractional or out-of-range values
/// by the time this runs on a fresh payload.
fn deserialize_health_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.fract() != 0.0 || !(0.0..=100.0).contains(&raw) {
        return Err(serde::de::Error::custom(format!(
            "healthScore must be a whole number between 0 and 100, got {}",
            raw
        )));
    }
    Ok(raw as u8)
}

/// A non-empty, trimmed plant name used for name-based lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpeciesName(String);

impl SpeciesName {
    pub fn new(name: impl Into<String>) -> CoreResult<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CoreError::validation("species name must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SpeciesName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for SpeciesName {
    type Error = CoreError;

    fn try_from(value: &str) -> CoreResult<Self> {
        Self::new(value)
    }
}
