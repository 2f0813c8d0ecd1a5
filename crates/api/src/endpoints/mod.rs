//! API endpoints.

mod reports;
mod staff;

use axum::Router;

use crate::state::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(reports::router())
        .nest("/staff", staff::router())
}
