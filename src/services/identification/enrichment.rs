//! Geographic Enrichment
//!
//! Best-effort secondary stage: asks a grounded model where the species is
//! native and turns map citations into [`MapData`]. Every failure is folded
//! into [`Enrichment::Fallback`]; nothing here returns an error.

use thiserror::Error;

use flora_lens_core::{Identification, MapData, MapLink, DEFAULT_LINK_TITLE};
use flora_lens_llm::{
    Citation, CitationKind, GenerateRequest, GenerateResponse, GroundingTool, InferenceGateway,
    LlmError, LlmResult, PromptPart,
};

use super::prompts::distribution_question;

/// Why enrichment fell back to the neutral value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichmentDegraded {
    #[error("grounding call failed: {0}")]
    Gateway(LlmError),

    #[error("grounding returned no summary text")]
    EmptyResult,

    #[error("map citation {index} has no uri")]
    MalformedCitation { index: usize },
}

/// Outcome of the secondary stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment {
    Enriched(MapData),
    Fallback(EnrichmentDegraded),
}

impl Enrichment {
    pub fn is_enriched(&self) -> bool {
        matches!(self, Enrichment::Enriched(_))
    }

    /// The value to attach to the identification.
    pub fn into_map_data(self) -> MapData {
        match self {
            Enrichment::Enriched(data) => data,
            Enrichment::Fallback(_) => MapData::unavailable(),
        }
    }
}

/// Build the grounding request for an already-validated identification.
pub fn grounding_request(identification: &Identification, model: &str) -> GenerateRequest {
    GenerateRequest::new(vec![PromptPart::text(distribution_question(
        &identification.common_name,
        &identification.scientific_name,
    ))])
    .with_grounding(GroundingTool::Maps)
    .with_model(model)
}

/// Classify a grounding call outcome.
pub fn interpret_grounding(outcome: LlmResult<GenerateResponse>) -> Enrichment {
    let response = match outcome {
        Ok(response) => response,
        Err(e) => return Enrichment::Fallback(EnrichmentDegraded::Gateway(e)),
    };

    let Some(summary) = response.non_empty_text() else {
        return Enrichment::Fallback(EnrichmentDegraded::EmptyResult);
    };

    match map_links(&response.citations) {
        Ok(links) => Enrichment::Enriched(MapData {
            summary: summary.to_string(),
            links,
        }),
        Err(degraded) => Enrichment::Fallback(degraded),
    }
}

/// Keep map citations only, in provider order.
fn map_links(citations: &[Citation]) -> Result<Vec<MapLink>, EnrichmentDegraded> {
    citations
        .iter()
        .enumerate()
        .filter(|(_, c)| c.kind == CitationKind::Maps)
        .map(|(index, c)| {
            let uri = c
                .uri
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .ok_or(EnrichmentDegraded::MalformedCitation { index })?;
            let title = c
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_LINK_TITLE);
            Ok(MapLink {
                title: title.to_string(),
                uri: uri.to_string(),
            })
        })
        .collect()
}

/// Run the secondary stage against the gateway.
pub async fn enrich(
    gateway: &dyn InferenceGateway,
    identification: &Identification,
    model: &str,
) -> Enrichment {
    let request = grounding_request(identification, model);
    let enrichment = interpret_grounding(gateway.generate(request).await);

    match &enrichment {
        Enrichment::Enriched(data) => tracing::debug!(
            "[Enrichment] {} enriched with {} map link(s)",
            identification.scientific_name,
            data.links.len()
        ),
        Enrichment::Fallback(reason) => tracing::warn!(
            "[Enrichment] Falling back for {}: {}",
            identification.scientific_name,
            reason
        ),
    }

    enrichment
}
