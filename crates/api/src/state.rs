//! Shared application state.

use portal_core::ReportService;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Report submission service, which also owns the staff directory.
    pub report_service: ReportService,
}

impl AppState {
    /// Create application state.
    #[must_use]
    pub const fn new(report_service: ReportService) -> Self {
        Self { report_service }
    }
}
