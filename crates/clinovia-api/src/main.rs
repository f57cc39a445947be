use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use clinovia_api::config::{AuditBackend, ServiceConfig};
use clinovia_api::state::AppState;
use clinovia_audit::alert::TracingAlertChannel;
use clinovia_audit::memory::MemoryAuditSink;
use clinovia_audit::s3::S3AuditSink;
use clinovia_audit::sink::AuditSink;
use clinovia_calculators::calculators::pce::PceTable;
use clinovia_inference::artifact::LocalArtifactStore;
use clinovia_inference::ef::HttpEfClient;
use clinovia_orchestrator::orchestrator::Orchestrator;
use clinovia_orchestrator::registry::{Backends, StrategyRegistry};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging for CloudWatch
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = ServiceConfig::from_env()?;

    let pce_table = match &config.ascvd_coefficients {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading ASCVD coefficient table");
            PceTable::from_path(path)?
        }
        None => PceTable::default(),
    };
    let ef = Arc::new(HttpEfClient::new(
        &config.ef_service_url,
        config.inference_timeout,
    )?);
    let backends = Backends {
        pce_table,
        artifacts: Arc::new(LocalArtifactStore::new(&config.model_root)),
        ef: ef.clone(),
    };
    let registry = StrategyRegistry::standard(&backends);
    registry.verify()?;

    let audit: Arc<dyn AuditSink> = match config.audit_backend {
        AuditBackend::S3 => {
            let s3 = clinovia_storage::client::build_client().await;
            Arc::new(S3AuditSink::new(s3, &config.audit_bucket))
        }
        AuditBackend::Memory => {
            tracing::warn!("audit records are held in memory and will not survive a restart");
            Arc::new(MemoryAuditSink::new())
        }
    };

    let orchestrator = Orchestrator::new(
        registry,
        audit,
        Arc::new(TracingAlertChannel),
        config.orchestrator_config(),
    );

    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        ef_client: Some(ef),
        max_video_bytes: config.max_video_bytes,
    };

    let app = clinovia_api::build_router(state);

    lambda_http::run(app).await.map_err(|e| eyre::eyre!(e))
}
