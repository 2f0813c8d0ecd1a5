//! Report submission service.
//!
//! Turns a [`ReportDraft`] into a Notion page: staff ids are mapped through
//! the directory, the page body is built, and the created page is reduced to
//! a [`ReportReceipt`] for the form.

use std::sync::Arc;

use portal_common::config::{NotionConfig, NotionProperties};
use portal_common::{AppError, AppResult, Config, StaffDirectory};
use serde_json::Value;

use crate::notion::{NotionClient, NotionDate, ReportPage};
use crate::report::{Editor, ReportDraft, ReportReceipt};

/// Service for submitting reports.
#[derive(Clone)]
pub struct ReportService {
    notion: NotionClient,
    directory: StaffDirectory,
    database_id: Arc<str>,
    properties: Arc<NotionProperties>,
    editor_name: Arc<str>,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub fn new(notion: NotionClient, directory: StaffDirectory, config: &NotionConfig) -> Self {
        Self {
            notion,
            directory,
            database_id: Arc::from(config.database_id.as_str()),
            properties: Arc::new(config.properties.clone()),
            editor_name: Arc::from(config.editor_name.as_str()),
        }
    }

    /// Create a report service and its Notion client from configuration.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let notion = NotionClient::new(&config.notion)?;
        Ok(Self::new(notion, config.staff_directory(), &config.notion))
    }

    /// The staff directory used for mapping.
    #[must_use]
    pub const fn directory(&self) -> &StaffDirectory {
        &self.directory
    }

    /// Build the Notion `create page` body for a draft.
    #[must_use]
    pub fn build_request_body(&self, draft: &ReportDraft) -> Value {
        let page = ReportPage {
            title: draft.title.trim(),
            description: draft.description_text(),
            date: NotionDate {
                start: draft.start_date,
                end: draft.effective_end_date(),
            },
            senders: self.directory.external_ids(&draft.senders),
            recipients: self.directory.external_ids(&draft.recipients),
        };

        tracing::debug!(
            database_id = %self.database_id,
            senders = page.senders.len(),
            recipients = page.recipients.len(),
            "Prepared report page"
        );

        page.to_request_body(&self.database_id, &self.properties)
    }

    /// Validate a draft and create its page in Notion.
    #[tracing::instrument(skip_all, fields(report_id = draft.id.as_deref().unwrap_or("new")))]
    pub async fn submit(&self, draft: ReportDraft) -> AppResult<ReportReceipt> {
        let report = draft.check();
        if !report.is_valid() {
            return Err(AppError::Validation(report.to_string()));
        }

        let body = self.build_request_body(&draft);
        let page = self.notion.create_page(&body).await?;

        tracing::info!(page_id = %page.id, "Report page created");

        Ok(ReportReceipt {
            id: page.id,
            last_edited_by: Editor {
                name: self.editor_name.to_string(),
            },
            last_edited_time: page.last_edited_time,
            url: page.url,
        })
    }
}
