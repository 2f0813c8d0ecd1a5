//! Report draft model and validation.
//!
//! The same [`ReportDraft`] type is edited by the form on the client and
//! received by the `create-report` handler on the server, so both sides check
//! the same invariants through [`ReportDraft::check`].

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

/// Whether a report covers a single day or a date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    /// A single day.
    #[default]
    Single,
    /// A start and end date.
    Range,
}

/// A file picked in the form. Never sent to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown in the form.
    pub name: String,
    /// Local path of the file.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
}

impl Attachment {
    /// Create an attachment handle.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            size,
        }
    }
}

/// An in-progress report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_date_range", skip_on_field_errors = false))]
pub struct ReportDraft {
    /// Id of an already persisted report, `None` for a new one.
    #[serde(default)]
    pub id: Option<String>,
    /// Report title. Must not be blank.
    #[serde(default)]
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Single day or range.
    #[serde(default)]
    pub date_mode: DateMode,
    /// First (or only) day of the report.
    pub start_date: NaiveDate,
    /// Only meaningful in [`DateMode::Range`].
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Local staff ids.
    #[serde(default)]
    #[validate(length(min = 1, code = "senders_required"))]
    pub senders: Vec<String>,
    /// Local staff ids.
    #[serde(default)]
    #[validate(length(min = 1, code = "recipients_required"))]
    pub recipients: Vec<String>,
    /// Files picked in the form. Kept on the client.
    #[serde(skip)]
    pub attachments: Vec<Attachment>,
    /// Editor of the last saved report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_by: Option<String>,
    /// Notion timestamp of the last saved report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_time: Option<String>,
}

impl Default for ReportDraft {
    fn default() -> Self {
        Self::today()
    }
}

impl ReportDraft {
    /// An empty draft starting on `start_date`.
    #[must_use]
    pub const fn new(start_date: NaiveDate) -> Self {
        Self {
            id: None,
            title: String::new(),
            description: None,
            date_mode: DateMode::Single,
            start_date,
            end_date: None,
            senders: Vec::new(),
            recipients: Vec::new(),
            attachments: Vec::new(),
            last_edited_by: None,
            last_edited_time: None,
        }
    }

    /// An empty draft starting on the current local date.
    #[must_use]
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    /// Re-derive the validation outcome from the current field values.
    #[must_use]
    pub fn check(&self) -> ValidationReport {
        match Validate::validate(self) {
            Ok(()) => ValidationReport::default(),
            Err(errors) => ValidationReport::from(&errors),
        }
    }

    /// The end date to send, if the draft is a range with an end date.
    #[must_use]
    pub fn effective_end_date(&self) -> Option<NaiveDate> {
        match self.date_mode {
            DateMode::Range => self.end_date,
            DateMode::Single => None,
        }
    }

    /// Description, or `None` when blank.
    #[must_use]
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::new(FieldError::TitleRequired.code()));
    }
    Ok(())
}

// Dates are calendar dates; no timezone is involved in the comparison.
fn validate_date_range(draft: &ReportDraft) -> Result<(), ValidationError> {
    if draft.date_mode != DateMode::Range {
        return Ok(());
    }
    match draft.end_date {
        None => Err(ValidationError::new(FieldError::EndDateRequired.code())),
        Some(end) if end < draft.start_date => {
            Err(ValidationError::new(FieldError::EndDateBeforeStart.code()))
        }
        Some(_) => Ok(()),
    }
}

/// Form field a validation error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Report title.
    Title,
    /// Sender selection.
    Senders,
    /// Recipient selection.
    Recipients,
    /// End of the date range.
    EndDate,
}

impl Field {
    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Senders => "senders",
            Self::Recipients => "recipients",
            Self::EndDate => "endDate",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single invariant violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Error)]
pub enum FieldError {
    /// Title is empty or whitespace.
    #[error("A report title is required.")]
    TitleRequired,
    /// No sender selected.
    #[error("Select at least one sender.")]
    SendersRequired,
    /// No recipient selected.
    #[error("Select at least one recipient.")]
    RecipientsRequired,
    /// Range mode without an end date.
    #[error("An end date is required for a date range.")]
    EndDateRequired,
    /// Range ends before it starts.
    #[error("The end date cannot be before the start date.")]
    EndDateBeforeStart,
}

impl FieldError {
    /// The field this error is shown next to.
    #[must_use]
    pub const fn field(self) -> Field {
        match self {
            Self::TitleRequired => Field::Title,
            Self::SendersRequired => Field::Senders,
            Self::RecipientsRequired => Field::Recipients,
            Self::EndDateRequired | Self::EndDateBeforeStart => Field::EndDate,
        }
    }

    /// Validation code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::TitleRequired => "title_required",
            Self::SendersRequired => "senders_required",
            Self::RecipientsRequired => "recipients_required",
            Self::EndDateRequired => "end_date_required",
            Self::EndDateBeforeStart => "end_date_before_start",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        [
            Self::TitleRequired,
            Self::SendersRequired,
            Self::RecipientsRequired,
            Self::EndDateRequired,
            Self::EndDateBeforeStart,
        ]
        .into_iter()
        .find(|e| e.code() == code)
    }
}

/// Outcome of validating a draft. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<FieldError>,
}

impl ValidationReport {
    /// Whether the draft satisfied every invariant.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All errors, ordered by field.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// The error shown next to `field`, if any.
    #[must_use]
    pub fn for_field(&self, field: Field) -> Option<FieldError> {
        self.errors.iter().copied().find(|e| e.field() == field)
    }

    /// Whether `error` is present.
    #[must_use]
    pub fn contains(&self, error: FieldError) -> bool {
        self.errors.contains(&error)
    }
}

impl From<&ValidationErrors> for ValidationReport {
    fn from(errors: &ValidationErrors) -> Self {
        let mut collected: Vec<FieldError> = errors
            .field_errors()
            .into_values()
            .flatten()
            .filter_map(|e| {
                let mapped = FieldError::from_code(e.code.as_ref());
                if mapped.is_none() {
                    tracing::warn!(code = %e.code, "Unmapped validation code");
                }
                mapped
            })
            .collect();
        collected.sort_unstable();
        collected.dedup();
        Self { errors: collected }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {error}", error.field())?;
        }
        Ok(())
    }
}

/// Person attribution returned with a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Editor {
    /// Display name.
    pub name: String,
}

/// Normalized result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportReceipt {
    /// Notion page id.
    pub id: String,
    /// Who edited the page.
    pub last_edited_by: Editor,
    /// Timestamp as reported by Notion.
    pub last_edited_time: String,
    /// Page URL.
    pub url: String,
}
