//! Health Check Commands
//!
//! Commands for checking the health status of backend services.

use crate::models::response::{CommandResponse, HealthResponse};
use crate::state::AppState;

/// Get the health status of all backend services.
///
/// With `probe` set the gateway is also contacted over the network.
pub async fn get_health(state: &AppState, probe: bool) -> CommandResponse<HealthResponse> {
    let mut health = HealthResponse::default();

    // Check database health
    health.database = state.is_database_healthy();

    // Check config health
    health.config = state.is_config_healthy();

    // Identification needs a key
    health.api_key = state.has_api_key();
    health.model = state.gateway_model();

    if probe {
        health.gateway_reachable = Some(state.probe_gateway().await.is_ok());
    }

    // Overall status
    let reachable = health.gateway_reachable.unwrap_or(true);
    health.status = if health.database && health.config && health.api_key && reachable {
        "healthy".to_string()
    } else {
        "degraded".to_string()
    };

    CommandResponse::ok(health)
}
