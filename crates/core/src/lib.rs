//! Flora Lens Core
//!
//! Foundational types for the Flora Lens workspace. This crate has no
//! dependency on networking, databases, or the async runtime.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `identification` - The identification data model and `SpeciesName`
//! - `schema` - Response schema, validator, and the payload parser
//! - `store` - `KeyValueStore` persistence seam and `MemoryStore`
//! - `proxy` - Proxy configuration data types

pub mod error;
pub mod identification;
pub mod proxy;
pub mod schema;
pub mod store;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Data Model ─────────────────────────────────────────────────────────
pub use identification::{
    CareInstructions, HealthStatus, Identification, MapData, MapLink, SpeciesName,
    SuggestedReminder, Toxicity, WeedStatus, DEFAULT_LINK_TITLE, DISTRIBUTION_UNAVAILABLE,
};

// ── Response Schema ────────────────────────────────────────────────────
pub use schema::{identification_schema, parse_identification, ParseError, SchemaNode, SchemaViolation};

// ── Persistence ────────────────────────────────────────────────────────
pub use store::{KeyValueStore, MemoryStore, HISTORY_KEY, REMINDERS_KEY};

// ── Proxy Types ────────────────────────────────────────────────────────
pub use proxy::{ProxyConfig, ProxyProtocol};
