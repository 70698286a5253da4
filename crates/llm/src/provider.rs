//! Inference Gateway Trait
//!
//! Defines the request/response capability the identification orchestrator
//! depends on. Transport details stay behind this seam.

use async_trait::async_trait;

use super::types::{GenerateRequest, GenerateResponse, LlmError, LlmResult, ProviderConfig};

/// Trait that all inference providers must implement.
///
/// A single `generate` call covers both uses the orchestrator has:
/// schema-constrained structured output, and grounded free text with
/// citations.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Returns the default model used when a request names none.
    fn model(&self) -> &str;

    /// Returns whether this provider accepts image prompt parts.
    fn supports_multimodal(&self) -> bool {
        false
    }

    /// Returns whether this provider can ground answers with map citations.
    fn supports_grounding(&self) -> bool {
        false
    }

    /// Run one generation request.
    ///
    /// Suspends until a complete response or an error arrives.
    async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse>;

    /// Check if the provider is configured and reachable.
    async fn health_check(&self) -> LlmResult<()>;

    /// Get the configuration for this provider.
    fn config(&self) -> &ProviderConfig;
}

/// Helper function to create an error for missing API key
pub fn missing_api_key_error(provider: &str) -> LlmError {
    LlmError::AuthenticationFailed {
        message: format!("API key not configured for {}", provider),
    }
}

/// Helper function to parse HTTP error status codes
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> LlmError {
    match status {
        401 => LlmError::AuthenticationFailed {
            message: format!("{}: Invalid API key", provider),
        },
        403 => LlmError::AuthenticationFailed {
            message: format!("{}: Access denied", provider),
        },
        404 => LlmError::ModelNotFound {
            model: body.to_string(),
        },
        429 => LlmError::RateLimited {
            message: body.to_string(),
            retry_after: None,
        },
        400 => LlmError::InvalidRequest {
            message: body.to_string(),
        },
        500..=599 => LlmError::ServerError {
            message: body.to_string(),
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, body),
        },
    }
}
