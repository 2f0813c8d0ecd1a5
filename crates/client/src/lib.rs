//! Client side of the staff portal.
//!
//! [`ReportForm`] keeps the state of the report entry form: the draft, its
//! validation errors, the submission status and a self-clearing
//! notification. It talks to the backend through [`ReportApi`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use portal_client::{FieldUpdate, HttpReportApi, ReportForm};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(HttpReportApi::new("http://localhost:3000/".parse()?));
//! let mut form = ReportForm::connect(api).await?;
//! form.update_field(FieldUpdate::Title("Notificación civil".into()));
//! form.add_sender("u-5");
//! form.add_recipient("u-7");
//! let receipt = form.submit().await?;
//! println!("saved {}", receipt.url);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod form;
pub mod notification;

pub use api::{ClientError, HttpReportApi, ReportApi};
pub use form::{FieldUpdate, FormStatus, ReportForm, SUCCESS_MESSAGE, SubmitError};
pub use notification::{NOTIFICATION_TTL, Notification, NotificationKind, Notifier};
