//! Identification Orchestrator
//!
//! Runs the schema-constrained primary call, then the best-effort grounding
//! call, and merges both into one [`Identification`]. The two stages are
//! strictly sequential: the grounding request is keyed by the species names
//! the primary stage returns.

use std::sync::Arc;

use flora_lens_core::{identification_schema, parse_identification, Identification, SpeciesName};
use flora_lens_llm::{GenerateRequest, InferenceGateway, LlmError, PromptPart};

use super::enrichment::{enrich, Enrichment, EnrichmentDegraded};
use super::prompts::{name_instruction, IMAGE_INSTRUCTION};
use super::IdentificationError;
use crate::models::settings::AppConfig;
use crate::services::image::ImageInput;

/// Composes the primary and grounding stages over one gateway.
///
/// Cheap to clone; the gateway is shared.
#[derive(Clone)]
pub struct IdentificationService {
    gateway: Arc<dyn InferenceGateway>,
    primary_model: String,
    grounding_model: String,
}

impl IdentificationService {
    pub fn new(
        gateway: Arc<dyn InferenceGateway>,
        primary_model: impl Into<String>,
        grounding_model: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            primary_model: primary_model.into(),
            grounding_model: grounding_model.into(),
        }
    }

    pub fn from_config(gateway: Arc<dyn InferenceGateway>, config: &AppConfig) -> Self {
        Self::new(
            gateway,
            config.primary_model.clone(),
            config.grounding_model.clone(),
        )
    }

    /// Identify a plant from a photo.
    pub async fn identify_from_image(
        &self,
        image: &ImageInput,
    ) -> Result<Identification, IdentificationError> {
        if !self.gateway.supports_multimodal() {
            return Err(IdentificationError::Gateway(LlmError::InvalidRequest {
                message: format!("{} does not accept image input", self.gateway.name()),
            }));
        }

        tracing::info!(
            "[Identify] Image identification started ({}, {} bytes)",
            image.media_type(),
            image.bytes().len()
        );
        let parts = vec![PromptPart::text(IMAGE_INSTRUCTION), image.to_prompt_part()];
        let primary = self.run_primary(parts).await?;
        Ok(self.attach_enrichment(primary).await)
    }

    /// Look a plant up by name.
    pub async fn identify_from_name(
        &self,
        name: &SpeciesName,
    ) -> Result<Identification, IdentificationError> {
        tracing::info!("[Identify] Name lookup started for '{}'", name);
        let parts = vec![PromptPart::text(name_instruction(name.as_str()))];
        let primary = self.run_primary(parts).await?;
        Ok(self.attach_enrichment(primary).await)
    }

    /// Primary stage: one schema-constrained call, parsed and validated.
    async fn run_primary(
        &self,
        parts: Vec<PromptPart>,
    ) -> Result<Identification, IdentificationError> {
        let request = GenerateRequest::new(parts)
            .with_schema(identification_schema().to_json())
            .with_model(self.primary_model.clone());

        let response = self.gateway.generate(request).await.map_err(|e| {
            tracing::warn!("[Identify] Primary call failed: {}", e);
            IdentificationError::Gateway(e)
        })?;

        let identification =
            parse_identification(response.text.as_deref().unwrap_or_default()).map_err(|e| {
                tracing::warn!("[Identify] Primary payload rejected: {}", e);
                IdentificationError::Parse(e)
            })?;

        tracing::debug!(
            "[Identify] Primary stage identified {} ({}), {} tokens",
            identification.common_name,
            identification.scientific_name,
            response.usage.total_tokens()
        );
        Ok(identification)
    }

    /// Secondary stage and merge. Never fails.
    async fn attach_enrichment(&self, primary: Identification) -> Identification {
        let enrichment = if self.gateway.supports_grounding() {
            enrich(self.gateway.as_ref(), &primary, &self.grounding_model).await
        } else {
            tracing::debug!(
                "[Enrichment] {} has no grounding capability",
                self.gateway.name()
            );
            Enrichment::Fallback(EnrichmentDegraded::Gateway(LlmError::InvalidRequest {
                message: "grounding not supported".to_string(),
            }))
        };

        let identification = primary.with_map_data(enrichment.into_map_data());
        tracing::info!(
            "[Identify] Completed: {} ({})",
            identification.common_name,
            identification.scientific_name
        );
        identification
    }
}

impl std::fmt::Debug for IdentificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentificationService")
            .field("gateway", &self.gateway.name())
            .field("primary_model", &self.primary_model)
            .field("grounding_model", &self.grounding_model)
            .finish()
    }
}
