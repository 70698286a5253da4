//! Settings Models
//!
//! Application configuration and settings data structures.

use serde::{Deserialize, Serialize};

use flora_lens_core::ProxyConfig;

/// Default Gemini API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model for the primary (schema-constrained) identification call
    pub primary_model: String,
    /// Model for the geographic grounding call
    pub grounding_model: String,
    /// Gemini API base URL
    pub endpoint: String,
    /// Whole-request timeout enforced by the HTTP client
    pub request_timeout_secs: u64,
    /// Hours from creation until a new reminder is due
    pub reminder_due_hours: u32,
    /// Enable debug mode
    pub debug_mode: bool,
    /// Outbound proxy for gateway calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            primary_model: "gemini-3-flash-preview".to_string(),
            grounding_model: "gemini-2.5-flash".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 120,
            reminder_due_hours: 24,
            debug_mode: false,
            proxy: None,
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub primary_model: Option<String>,
    pub grounding_model: Option<String>,
    pub endpoint: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub reminder_due_hours: Option<u32>,
    pub debug_mode: Option<bool>,
    pub proxy: Option<ProxyConfig>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(model) = update.primary_model {
            self.primary_model = model;
        }
        if let Some(model) = update.grounding_model {
            self.grounding_model = model;
        }
        if let Some(endpoint) = update.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(timeout) = update.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(hours) = update.reminder_due_hours {
            self.reminder_due_hours = hours;
        }
        if let Some(debug) = update.debug_mode {
            self.debug_mode = debug;
        }
        if let Some(proxy) = update.proxy {
            self.proxy = Some(proxy);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.primary_model.trim().is_empty() {
            return Err("primary_model must not be empty".to_string());
        }
        if self.grounding_model.trim().is_empty() {
            return Err("grounding_model must not be empty".to_string());
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(format!(
                "Invalid endpoint: {}. Must start with http:// or https://",
                self.endpoint
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be at least 1 second".to_string());
        }

        if self.reminder_due_hours == 0 || self.reminder_due_hours > 24 * 365 {
            return Err("reminder_due_hours must be between 1 and 8760".to_string());
        }

        if let Some(proxy) = &self.proxy {
            proxy.validate()?;
        }

        Ok(())
    }
}
