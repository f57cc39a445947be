use std::sync::Arc;

use clinovia_inference::ef::HttpEfClient;
use clinovia_orchestrator::orchestrator::Orchestrator;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    /// Probed by the health check. `None` when no EF service is configured.
    pub ef_client: Option<Arc<HttpEfClient>>,
    pub max_video_bytes: usize,
}
