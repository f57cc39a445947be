//! clinovia-api
//!
//! HTTP surface for the prediction engine: one `POST` route per calculator,
//! the public calculator catalog, and a health check. Runs on AWS Lambda
//! through `lambda_http`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::{Extension, Router};
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use clinovia_core::calculator::{CalculatorId, catalog};
use clinovia_core::models::identity::Identity;

use state::AppState;

pub const API_PREFIX: &str = "/api/v1";

/// Headroom over the video cap for the multipart envelope.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let predictions = prediction_routes(state.max_video_bytes)
        .route_layer(axum_mw::from_fn(middleware::identity::require_identity));

    Router::new()
        // Health and catalog (no identity, public schema data)
        .route("/health", get(routes::health::health_check))
        .route(
            &format!("{API_PREFIX}/calculators"),
            get(routes::calculators::list_calculators),
        )
        .route(
            &format!("{API_PREFIX}/calculators/{{id}}"),
            get(routes::calculators::get_calculator_detail),
        )
        // One POST per calculator, identity required
        .merge(predictions)
        .fallback(routes::not_found)
        .layer(axum_mw::from_fn(middleware::request_log::log_request))
        .layer(cors)
        .with_state(state)
}

fn prediction_routes(max_video_bytes: usize) -> Router<AppState> {
    let mut router = Router::new();
    for spec in catalog() {
        let id = spec.id;
        let path = format!("{API_PREFIX}{}", spec.route_path());
        router = match id {
            CalculatorId::EfPrediction => router.route(
                &path,
                post(
                    move |state: State<AppState>,
                          identity: Extension<Identity>,
                          multipart: Result<Multipart, MultipartRejection>| {
                        routes::predict::predict_video(state, identity, id, multipart)
                    },
                )
                .layer(DefaultBodyLimit::max(
                    max_video_bytes.saturating_add(MULTIPART_OVERHEAD),
                )),
            ),
            _ => router.route(
                &path,
                post(
                    move |state: State<AppState>, identity: Extension<Identity>, body: Bytes| {
                        routes::predict::predict_fields(state, identity, id, body)
                    },
                ),
            ),
        };
    }
    router
}
