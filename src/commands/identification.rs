//! Identification Commands
//!
//! Photo identification and name lookup.

use std::path::Path;

use flora_lens_core::SpeciesName;

use crate::models::history::Discovery;
use crate::models::response::CommandResponse;
use crate::services::image::read_image;
use crate::state::AppState;

/// Shown when a photo could not be identified
pub const IMAGE_FAILURE_MESSAGE: &str = "Analysis failed. Please try a clearer shot.";

/// Shown when a name lookup could not be completed
pub const LOOKUP_FAILURE_MESSAGE: &str = "Could not find information for this plant.";

/// Identify a plant from a photo and record it in history
pub async fn identify_image(state: &AppState, path: &Path) -> CommandResponse<Discovery> {
    let image = match read_image(path).await {
        Ok(image) => image,
        Err(e) => return CommandResponse::err(e.to_string()),
    };

    let _guard = match state.begin_identification() {
        Ok(guard) => guard,
        Err(e) => return CommandResponse::err(e.to_string()),
    };
    let identifier = match state.identifier().await {
        Ok(identifier) => identifier,
        Err(e) => return CommandResponse::err(e.to_string()),
    };

    let identification = match identifier.identify_from_image(&image).await {
        Ok(identification) => identification,
        Err(e) => {
            tracing::warn!("[Identify] Image identification failed: {}", e);
            return CommandResponse::err(IMAGE_FAILURE_MESSAGE);
        }
    };

    state
        .record_history(identification, Some(image.to_data_url()))
        .await
        .map(|record| Discovery {
            identification: record.identification,
            history_id: Some(record.id),
        })
        .into()
}

/// Look a plant up by name, optionally recording it in history
pub async fn lookup_plant(state: &AppState, name: &str, save: bool) -> CommandResponse<Discovery> {
    let name = match SpeciesName::new(name) {
        Ok(name) => name,
        Err(e) => return CommandResponse::err(e.to_string()),
    };

    let _guard = match state.begin_identification() {
        Ok(guard) => guard,
        Err(e) => return CommandResponse::err(e.to_string()),
    };
    let identifier = match state.identifier().await {
        Ok(identifier) => identifier,
        Err(e) => return CommandResponse::err(e.to_string()),
    };

    let identification = match identifier.identify_from_name(&name).await {
        Ok(identification) => identification,
        Err(e) => {
            tracing::warn!("[Identify] Lookup for '{}' failed: {}", name, e);
            return CommandResponse::err(LOOKUP_FAILURE_MESSAGE);
        }
    };

    if !save {
        return CommandResponse::ok(Discovery {
            identification,
            history_id: None,
        });
    }

    state
        .record_history(identification, None)
        .await
        .map(|record| Discovery {
            identification: record.identification,
            history_id: Some(record.id),
        })
        .into()
}
