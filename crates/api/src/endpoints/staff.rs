//! Staff directory endpoints.

use axum::{Json, Router, extract::State, routing::get};
use portal_common::StaffListing;

use crate::state::AppState;

/// List staff members that can be selected as senders or recipients.
async fn list_staff(State(state): State<AppState>) -> Json<Vec<StaffListing>> {
    Json(state.report_service.directory().listings())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_staff))
}
