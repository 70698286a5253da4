//! Plant Identification
//!
//! Two-stage identification over an [`InferenceGateway`](flora_lens_llm::InferenceGateway):
//!
//! - `orchestrator` - `IdentificationService`, the primary stage and the merge
//! - `enrichment` - best-effort geographic grounding (`Enrichment`)
//! - `prompts` - instruction text for both stages

pub mod enrichment;
pub mod orchestrator;
pub mod prompts;

use thiserror::Error;

use flora_lens_core::ParseError;
use flora_lens_llm::LlmError;

pub use enrichment::{Enrichment, EnrichmentDegraded};
pub use orchestrator::IdentificationService;

/// The only failures an identification attempt can end with.
///
/// Enrichment problems never appear here; they degrade to a fallback value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentificationError {
    /// The primary call returned no payload
    #[error("Inference gateway error: {0}")]
    Gateway(#[from] LlmError),

    /// The primary payload did not match the response schema
    #[error("Invalid identification payload: {0}")]
    Parse(#[from] ParseError),
}
