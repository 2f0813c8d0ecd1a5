//! Report form state.
//!
//! [`ReportForm`] owns the draft being edited, the last validation result,
//! the submission status and the notification slot. Submitting drives an
//! explicit state machine:
//!
//! ```text
//! idle -> loading -> success
//!                 \-> error
//! ```
//!
//! `success` and `error` go back through `loading` on the next submission.

use std::sync::Arc;

use chrono::NaiveDate;
use portal_common::{StaffDirectory, StaffMember};
use portal_core::{Attachment, DateMode, ReportDraft, ReportReceipt, ValidationReport};
use thiserror::Error;

use crate::api::{ClientError, ReportApi};
use crate::notification::{Notification, Notifier};

/// Message shown after a report is saved.
pub const SUCCESS_MESSAGE: &str = "Report saved to Notion.";

/// Submission status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormStatus {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// A submission is in flight.
    Loading,
    /// The last submission succeeded.
    Success,
    /// The last submission failed.
    Error,
}

impl FormStatus {
    /// Whether a new submission may start.
    #[must_use]
    pub const fn can_submit(self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// A single-field edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    /// Set the title.
    Title(String),
    /// Set or clear the description.
    Description(Option<String>),
    /// Switch between a single date and a range.
    DateMode(DateMode),
    /// Set the start (or only) date.
    StartDate(NaiveDate),
    /// Set or clear the end date.
    EndDate(Option<NaiveDate>),
    /// Replace the sender selection.
    Senders(Vec<String>),
    /// Replace the recipient selection.
    Recipients(Vec<String>),
    /// Replace the attachment list.
    Attachments(Vec<Attachment>),
}

/// Why a submission did not produce a receipt.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The draft failed validation; nothing was sent.
    #[error("Report is invalid: {0}")]
    Invalid(ValidationReport),

    /// Another submission is still in flight.
    #[error("A submission is already in progress")]
    InProgress,

    /// The backend call failed; the draft was kept.
    #[error(transparent)]
    Api(#[from] ClientError),
}

/// Form state manager for a single report form.
pub struct ReportForm {
    api: Arc<dyn ReportApi>,
    directory: StaffDirectory,
    draft: ReportDraft,
    errors: ValidationReport,
    status: FormStatus,
    notifier: Notifier,
}

impl ReportForm {
    /// Create a form with an empty draft dated today.
    pub fn new(api: Arc<dyn ReportApi>, directory: StaffDirectory) -> Self {
        Self::with_draft(api, directory, ReportDraft::today())
    }

    /// Create a form editing `draft`.
    pub fn with_draft(api: Arc<dyn ReportApi>, directory: StaffDirectory, draft: ReportDraft) -> Self {
        Self {
            api,
            directory,
            draft,
            errors: ValidationReport::default(),
            status: FormStatus::Idle,
            notifier: Notifier::default(),
        }
    }

    /// Create a form whose staff directory is fetched from the backend.
    pub async fn connect(api: Arc<dyn ReportApi>) -> Result<Self, ClientError> {
        let directory = StaffDirectory::from(api.list_staff().await?);
        Ok(Self::new(api, directory))
    }

    /// Replace the notifier, e.g. to use a different timeout.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// The draft being edited.
    #[must_use]
    pub const fn draft(&self) -> &ReportDraft {
        &self.draft
    }

    /// Errors from the last [`validate`](Self::validate) call.
    #[must_use]
    pub const fn errors(&self) -> &ValidationReport {
        &self.errors
    }

    /// Current submission status.
    #[must_use]
    pub const fn status(&self) -> FormStatus {
        self.status
    }

    /// The staff directory used for the pickers.
    #[must_use]
    pub const fn directory(&self) -> &StaffDirectory {
        &self.directory
    }

    /// The visible notification, if any.
    pub async fn notification(&self) -> Option<Notification> {
        self.notifier.current().await
    }

    /// Close the visible notification.
    pub async fn dismiss_notification(&mut self) {
        self.notifier.dismiss().await;
    }

    /// Change one field. Does not validate.
    pub fn update_field(&mut self, update: FieldUpdate) {
        let draft = &mut self.draft;
        match update {
            FieldUpdate::Title(title) => draft.title = title,
            FieldUpdate::Description(description) => draft.description = description,
            FieldUpdate::DateMode(mode) => draft.date_mode = mode,
            FieldUpdate::StartDate(date) => draft.start_date = date,
            FieldUpdate::EndDate(date) => draft.end_date = date,
            FieldUpdate::Senders(ids) => draft.senders = dedup(ids),
            FieldUpdate::Recipients(ids) => draft.recipients = dedup(ids),
            FieldUpdate::Attachments(files) => draft.attachments = files,
        }
    }

    /// Add a sender. Already selected ids are ignored.
    pub fn add_sender(&mut self, local_id: impl Into<String>) {
        push_unique(&mut self.draft.senders, local_id.into());
    }

    /// Remove a sender.
    pub fn remove_sender(&mut self, local_id: &str) {
        self.draft.senders.retain(|id| id != local_id);
    }

    /// Add a recipient. Already selected ids are ignored.
    pub fn add_recipient(&mut self, local_id: impl Into<String>) {
        push_unique(&mut self.draft.recipients, local_id.into());
    }

    /// Remove a recipient.
    pub fn remove_recipient(&mut self, local_id: &str) {
        self.draft.recipients.retain(|id| id != local_id);
    }

    /// Staff members not yet selected as senders.
    #[must_use]
    pub fn available_senders(&self) -> Vec<&StaffMember> {
        self.unselected(&self.draft.senders)
    }

    /// Staff members not yet selected as recipients.
    #[must_use]
    pub fn available_recipients(&self) -> Vec<&StaffMember> {
        self.unselected(&self.draft.recipients)
    }

    fn unselected(&self, selected: &[String]) -> Vec<&StaffMember> {
        self.directory
            .iter()
            .filter(|member| !selected.contains(&member.local_id))
            .collect()
    }

    /// Append picked files.
    pub fn add_attachments(&mut self, files: impl IntoIterator<Item = Attachment>) {
        self.draft.attachments.extend(files);
    }

    /// Remove the attachment at `index`, if present.
    pub fn remove_attachment(&mut self, index: usize) -> Option<Attachment> {
        (index < self.draft.attachments.len()).then(|| self.draft.attachments.remove(index))
    }

    /// Validate the current draft and remember the result.
    pub fn validate(&mut self) -> &ValidationReport {
        self.errors = self.draft.check();
        &self.errors
    }

    /// Validate and submit the draft.
    ///
    /// On success the draft is replaced by a fresh one that carries the
    /// last-edited metadata from the receipt. On failure the draft is kept
    /// so the user can retry. If the returned future is dropped before the
    /// backend answers, the status goes back to what it was before the call.
    pub async fn submit(&mut self) -> Result<ReportReceipt, SubmitError> {
        if !self.status.can_submit() {
            return Err(SubmitError::InProgress);
        }

        if !self.validate().is_valid() {
            return Err(SubmitError::Invalid(self.errors.clone()));
        }

        let loading = LoadingGuard::enter(&mut self.status);
        self.notifier.dismiss().await;
        let result = self.api.submit_report(&self.draft).await;

        match result {
            Ok(receipt) => {
                loading.finish(FormStatus::Success);
                tracing::info!(page_id = %receipt.id, "Report submitted");
                self.draft = ReportDraft {
                    last_edited_by: Some(receipt.last_edited_by.name.clone()),
                    last_edited_time: Some(receipt.last_edited_time.clone()),
                    ..ReportDraft::today()
                };
                self.errors = ValidationReport::default();
                self.notifier.show(Notification::success(SUCCESS_MESSAGE)).await;
                Ok(receipt)
            }
            Err(err) => {
                loading.finish(FormStatus::Error);
                tracing::warn!(error = %err, "Report submission failed");
                self.notifier
                    .show(Notification::error(format!(
                        "Connection error: {err}. Make sure the backend is running."
                    )))
                    .await;
                Err(SubmitError::Api(err))
            }
        }
    }
}

/// Holds the status at `Loading` for the duration of a submission.
///
/// Dropping it without calling [`finish`](Self::finish) restores the status
/// seen on entry.
struct LoadingGuard<'a> {
    status: &'a mut FormStatus,
    previous: FormStatus,
}

impl<'a> LoadingGuard<'a> {
    fn enter(status: &'a mut FormStatus) -> Self {
        let previous = std::mem::replace(status, FormStatus::Loading);
        Self { status, previous }
    }

    fn finish(mut self, outcome: FormStatus) {
        self.previous = outcome;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.status = self.previous;
    }
}

fn push_unique(ids: &mut Vec<String>, id: String) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        push_unique(&mut unique, id);
    }
    unique
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use portal_common::StaffListing;
    use portal_core::{Editor, FieldError};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::notification::{NOTIFICATION_TTL, NotificationKind};

    struct MockApi {
        calls: AtomicUsize,
        fail_with: Mutex<Option<String>>,
        last_draft: Mutex<Option<ReportDraft>>,
        stall: AtomicBool,
    }

    impl MockApi {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_with: Mutex::new(None),
                last_draft: Mutex::new(None),
                stall: AtomicBool::new(false),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            let api = Self::ok();
            *api.fail_with.lock().unwrap() = Some(message.to_string());
            api
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReportApi for MockApi {
        async fn submit_report(&self, draft: &ReportDraft) -> Result<ReportReceipt, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_draft.lock().unwrap() = Some(draft.clone());

            if self.stall.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }

            if let Some(message) = self.fail_with.lock().unwrap().clone() {
                return Err(ClientError::Server {
                    status: 500,
                    message,
                });
            }

            Ok(ReportReceipt {
                id: "p1".to_string(),
                last_edited_by: Editor {
                    name: "API".to_string(),
                },
                last_edited_time: "2024-01-01T00:00:00Z".to_string(),
                url: "https://x".to_string(),
            })
        }

        async fn list_staff(&self) -> Result<Vec<StaffListing>, ClientError> {
            Ok(vec![
                StaffListing {
                    local_id: "u-5".to_string(),
                    display_name: "Mtro. José Antonio Ruiz de la Cruz".to_string(),
                    provisioned: true,
                },
                StaffListing {
                    local_id: "u-6".to_string(),
                    display_name: "Lic. Sandra Luz Miguel Carrasco".to_string(),
                    provisioned: false,
                },
            ])
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn filled_form(api: Arc<MockApi>) -> ReportForm {
        let mut form = ReportForm::connect(api).await.unwrap();
        form.update_field(FieldUpdate::Title("Notificación civil".to_string()));
        form.update_field(FieldUpdate::StartDate(date(2024, 1, 1)));
        form.add_sender("u-5");
        form.add_recipient("u-6");
        form
    }

    #[tokio::test]
    async fn test_update_field_does_not_validate() {
        let mut form = ReportForm::connect(MockApi::ok()).await.unwrap();
        form.update_field(FieldUpdate::Title(String::new()));

        assert!(form.errors().is_valid());
        assert!(!form.validate().is_valid());
        assert_eq!(form.errors().errors()[0], FieldError::TitleRequired);
    }

    #[tokio::test]
    async fn test_invalid_draft_makes_no_call() {
        let api = MockApi::ok();
        let mut form = filled_form(api.clone()).await;
        form.update_field(FieldUpdate::Title("   ".to_string()));

        let err = form.submit().await.unwrap_err();

        assert!(matches!(err, SubmitError::Invalid(ref r) if r.contains(FieldError::TitleRequired)));
        assert_eq!(api.calls(), 0);
        assert_eq!(form.status(), FormStatus::Idle);
    }

    #[tokio::test]
    async fn test_date_range_revalidated_on_each_call() {
        let mut form = filled_form(MockApi::ok()).await;
        form.update_field(FieldUpdate::DateMode(DateMode::Range));
        form.update_field(FieldUpdate::EndDate(Some(date(2023, 12, 31))));
        assert!(form.validate().contains(FieldError::EndDateBeforeStart));

        form.update_field(FieldUpdate::StartDate(date(2023, 12, 1)));
        assert!(form.validate().is_valid());
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_submit_resets_draft() {
        let api = MockApi::ok();
        let mut form = filled_form(api.clone()).await;
        form.add_attachments([Attachment::new("acta.pdf", "/tmp/acta.pdf", 2048)]);

        let receipt = form.submit().await.unwrap();

        assert_eq!(receipt.id, "p1");
        assert_eq!(api.calls(), 1);
        assert_eq!(form.status(), FormStatus::Success);
        assert!(form.draft().title.is_empty());
        assert!(form.draft().senders.is_empty());
        assert!(form.draft().attachments.is_empty());
        assert_eq!(form.draft().last_edited_by.as_deref(), Some("API"));
        assert_eq!(
            form.draft().last_edited_time.as_deref(),
            Some("2024-01-01T00:00:00Z")
        );

        let notification = form.notification().await.unwrap();
        assert_eq!(notification.kind, NotificationKind::Success);
        assert_eq!(notification.message, SUCCESS_MESSAGE);

        tokio::time::sleep(NOTIFICATION_TTL + Duration::from_millis(1)).await;
        assert!(form.notification().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_submit_keeps_draft() {
        let api = MockApi::failing("Server error: bad request");
        let mut form = filled_form(api.clone()).await;
        let before = form.draft().clone();

        let err = form.submit().await.unwrap_err();

        assert!(matches!(err, SubmitError::Api(_)));
        assert_eq!(form.status(), FormStatus::Error);
        assert_eq!(form.draft(), &before);

        let notification = form.notification().await.unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert!(notification.message.contains("bad request"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_error_replaces_notification() {
        let api = MockApi::failing("Server error: timeout");
        let mut form = filled_form(api.clone()).await;
        form.submit().await.unwrap_err();

        tokio::time::sleep(Duration::from_secs(3)).await;
        *api.fail_with.lock().unwrap() = None;
        form.submit().await.unwrap();

        let notification = form.notification().await.unwrap();
        assert_eq!(notification.kind, NotificationKind::Success);

        // Past the first message's deadline, the second is still shown.
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(form.notification().await.is_some());
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn test_submit_rejected_while_loading() {
        let api = MockApi::ok();
        let mut form = filled_form(api.clone()).await;
        form.status = FormStatus::Loading;

        assert!(matches!(form.submit().await, Err(SubmitError::InProgress)));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_submit_restores_status() {
        let api = MockApi::ok();
        api.stall.store(true, Ordering::SeqCst);
        let mut form = filled_form(api.clone()).await;

        let abandoned = tokio::time::timeout(Duration::from_secs(1), form.submit()).await;
        assert!(abandoned.is_err());
        assert_eq!(form.status(), FormStatus::Idle);

        api.stall.store(false, Ordering::SeqCst);
        form.submit().await.unwrap();
        assert_eq!(form.status(), FormStatus::Success);
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_retry_keeps_error_status() {
        let api = MockApi::failing("Server error: timeout");
        let mut form = filled_form(api.clone()).await;
        form.submit().await.unwrap_err();

        api.stall.store(true, Ordering::SeqCst);
        let abandoned = tokio::time::timeout(Duration::from_secs(1), form.submit()).await;

        assert!(abandoned.is_err());
        assert_eq!(form.status(), FormStatus::Error);
    }

    #[tokio::test]
    async fn test_attachments_not_sent() {
        let api = MockApi::ok();
        let mut form = filled_form(api.clone()).await;
        form.add_attachments([Attachment::new("foto.png", "/tmp/foto.png", 10)]);
        form.submit().await.unwrap();

        let sent = serde_json::to_value(api.last_draft.lock().unwrap().clone().unwrap()).unwrap();
        assert!(sent.get("attachments").is_none());
    }

    #[tokio::test]
    async fn test_selection_helpers() {
        let mut form = ReportForm::connect(MockApi::ok()).await.unwrap();
        form.add_sender("u-5");
        form.add_sender("u-5");
        assert_eq!(form.draft().senders, vec!["u-5".to_string()]);

        let available: Vec<&str> = form
            .available_senders()
            .iter()
            .map(|m| m.local_id.as_str())
            .collect();
        assert_eq!(available, vec!["u-6"]);
        assert_eq!(form.available_recipients().len(), 2);

        form.remove_sender("u-5");
        assert!(form.draft().senders.is_empty());

        form.update_field(FieldUpdate::Recipients(vec![
            "u-6".to_string(),
            "u-6".to_string(),
        ]));
        assert_eq!(form.draft().recipients, vec!["u-6".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_attachment_by_index() {
        let mut form = ReportForm::connect(MockApi::ok()).await.unwrap();
        form.add_attachments([
            Attachment::new("a.pdf", "/tmp/a.pdf", 1),
            Attachment::new("b.pdf", "/tmp/b.pdf", 2),
        ]);

        assert_eq!(form.remove_attachment(0).unwrap().name, "a.pdf");
        assert!(form.remove_attachment(5).is_none());
        assert_eq!(form.draft().attachments.len(), 1);
    }
}
