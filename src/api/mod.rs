pub mod dtos;
pub mod handlers;

use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use tower_http::LatencyUnit;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::health;
use crate::middleware::rate_limit::{RateLimit, rate_limit_middleware};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::extract,
        handlers::scan,
        handlers::list_sources,
        health::health_check
    ),
    components(schemas(
        dtos::TextRequest,
        dtos::ScanResponse,
        dtos::SourceSummary,
        dtos::ErrorResponse,
        crate::scanner::CandidateUrl,
        crate::pipeline::ArticleDraft,
        crate::pipeline::FailureRecord,
        health::HealthResponse
    )),
    tags(
        (name = "extract", description = "Trusted-source article extraction"),
        (name = "sources", description = "Source registry"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// Full application router. Serve it with
/// `into_make_service_with_connect_info::<SocketAddr>()`; the rate limiter
/// keys on the peer address.
pub fn router(state: AppState, rate_limit: RateLimit) -> Router {
    let limited = Router::new()
        .route("/v1/extract", post(handlers::extract))
        .route_layer(middleware::from_fn_with_state(rate_limit, rate_limit_middleware));

    Router::new()
        .merge(limited)
        .route("/v1/scan", post(handlers::scan))
        .route("/v1/sources", get(handlers::list_sources))
        .route("/healthz", get(health::health_check))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
