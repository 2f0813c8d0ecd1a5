//! Report endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::Method,
    routing::post,
};
use portal_common::{AppError, AppResult};
use portal_core::{ReportDraft, ReportReceipt};

use crate::{extractors::JsonBody, state::AppState};

/// Create a Notion page for a report.
async fn create_report(
    State(state): State<AppState>,
    JsonBody(draft): JsonBody<ReportDraft>,
) -> AppResult<Json<ReportReceipt>> {
    let receipt = state.report_service.submit(draft).await?;
    Ok(Json(receipt))
}

/// Reject every method other than `POST`.
async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed {
        method,
        allowed: Method::POST,
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/create-report",
        post(create_report).fallback(method_not_allowed),
    )
}
