use axum::Json;
use axum::extract::State;
use serde::Serialize;

use clinovia_inference::ef::EfServiceHealth;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    calculators: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    ef_service: Option<EfServiceHealth>,
}

/// Liveness plus the state of the ejection-fraction service. Always 200:
/// an unreachable EF service degrades one calculator, not the API.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ef_service = match &state.ef_client {
        Some(client) => Some(client.health().await),
        None => None,
    };
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        calculators: state.orchestrator.registry().registrations().count(),
        ef_service,
    })
}
