//! Core business logic for the staff portal.
//!
//! - [`report`]: the report draft shared by form and handler, and its validation
//! - [`notion`]: Notion page payloads and the HTTP client that creates them
//! - [`services`]: the submission service used by the API layer

pub mod notion;
pub mod report;
pub mod services;

pub use notion::{CreatedPage, NotionClient, NotionDate, ReportPage};
pub use report::{
    Attachment, DateMode, Editor, Field, FieldError, ReportDraft, ReportReceipt, ValidationReport,
};
pub use services::*;
