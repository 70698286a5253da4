//! Flora Lens LLM
//!
//! Provides the inference gateway seam used by the identification
//! orchestrator, plus the Google Gemini implementation of it.
//!
//! Also includes the HTTP client factory.

pub mod gemini;
pub mod http_client;
pub mod provider;
pub mod types;

// Re-export main types
pub use gemini::GeminiProvider;
pub use http_client::build_http_client;
pub use provider::{missing_api_key_error, parse_http_error, InferenceGateway};
pub use types::*;
