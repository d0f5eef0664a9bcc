use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{AnalyzeRequest, AnalyzeResponse},
    routes::AppState,
    services::analysis,
};

/// Handler for the rotation analysis endpoint
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> AppResult<Json<AnalyzeResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(
            request_id = %request_id,
            error = %rejection.body_text(),
            "Rejected malformed analyze request"
        );
        AppError::InvalidInput(rejection.body_text())
    })?;

    tracing::info!(
        request_id = %request_id,
        owned_count = request.owned_shoes.len(),
        intent = ?request.intent,
        "Processing analyze request"
    );

    let report = analysis::analyze_rotation(&state.catalogue, &request).inspect_err(|e| {
        tracing::warn!(request_id = %request_id, error = %e, "Analysis failed");
    })?;
    let response =
        analysis::assemble_response(report, state.prose.as_deref(), state.prose_timeout).await;

    tracing::info!(
        request_id = %request_id,
        tier = u8::from(response.tier.tier),
        prose_source = ?response.prose_source,
        "Analysis completed"
    );

    Ok(Json(response))
}
