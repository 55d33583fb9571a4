use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::api::dtos::{ScanResponse, SourceSummary, TextRequest};
use crate::app_state::AppState;
use crate::pipeline::{ArticleDraft, FailureRecord};
use crate::scanner;

#[utoipa::path(
    post,
    path = "/v1/extract",
    tag = "extract",
    request_body = TextRequest,
    responses(
        (status = 200, description = "Draft built from a trusted source", body = ArticleDraft),
        (status = 422, description = "Link missing, untrusted, or not extractable", body = FailureRecord),
        (status = 429, description = "Rate limit exceeded", body = crate::api::dtos::ErrorResponse)
    )
)]
pub async fn extract(State(state): State<AppState>, Json(payload): Json<TextRequest>) -> Response {
    let result = state.pipeline.run(&payload.text).await;
    let status = if result.is_success() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    info!(status = status.as_u16(), "extract request finished");
    (status, Json(result)).into_response()
}

#[utoipa::path(
    post,
    path = "/v1/scan",
    tag = "extract",
    request_body = TextRequest,
    responses(
        (status = 200, description = "Link candidates found in the text", body = ScanResponse)
    )
)]
pub async fn scan(Json(payload): Json<TextRequest>) -> Json<ScanResponse> {
    Json(ScanResponse {
        candidates: scanner::scan(&payload.text),
        sole_url: scanner::is_sole_url(&payload.text),
    })
}

#[utoipa::path(
    get,
    path = "/v1/sources",
    tag = "sources",
    responses(
        (status = 200, description = "Trusted sources", body = Vec<SourceSummary>)
    )
)]
pub async fn list_sources(State(state): State<AppState>) -> Json<Vec<SourceSummary>> {
    Json(state.registry.entries().iter().map(SourceSummary::from).collect())
}
