//! HTTP API layer for the staff portal.
//!
//! - **Endpoints**: `create-report` submission proxy, staff directory
//! - **Extractors**: JSON bodies with uniform error responses
//! - **State**: shared, immutable services
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod state;

use std::any::Any;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
};
use portal_common::AppError;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub use endpoints::router;
pub use state::AppState;

/// Maximum accepted request body size.
pub const MAX_BODY_BYTES: usize = 256 * 1024;

fn panic_response(_err: Box<dyn Any + Send + 'static>) -> Response {
    AppError::Internal("unexpected failure while handling request".to_string()).into_response()
}

/// Build the full application: API routes under `/api` plus middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}
