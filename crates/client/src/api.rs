//! Client for the portal's own HTTP API.
//!
//! The form never talks to Notion directly; it posts drafts to the
//! `create-report` handler, which holds the credential.

use async_trait::async_trait;
use portal_common::StaffListing;
use portal_core::{ReportDraft, ReportReceipt};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Fallback when the server fails without a readable message.
const GENERIC_SERVER_ERROR: &str = "Server error.";

/// Errors from calling the portal API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// `message` field of the error body.
        message: String,
    },

    /// The success body could not be decoded.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The base URL could not be joined with an endpoint path.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Operations the form needs from the backend.
#[async_trait]
pub trait ReportApi: Send + Sync {
    /// Submit a draft and return the created page's receipt.
    async fn submit_report(&self, draft: &ReportDraft) -> Result<ReportReceipt, ClientError>;

    /// Fetch the staff members that can be selected.
    async fn list_staff(&self) -> Result<Vec<StaffListing>, ClientError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// [`ReportApi`] over HTTP.
#[derive(Clone)]
pub struct HttpReportApi {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpReportApi {
    /// Create a client for a portal served at `base_url`.
    ///
    /// Endpoint paths are joined onto `base_url`, so it should end with `/`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest` client.
    #[must_use]
    pub const fn with_client(http_client: reqwest::Client, base_url: Url) -> Self {
        Self {
            http_client,
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    async fn read<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string());
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ReportApi for HttpReportApi {
    async fn submit_report(&self, draft: &ReportDraft) -> Result<ReportReceipt, ClientError> {
        let response = self
            .http_client
            .post(self.endpoint("api/create-report")?)
            .json(draft)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Self::read(response).await
    }

    async fn list_staff(&self) -> Result<Vec<StaffListing>, ClientError> {
        let response = self
            .http_client
            .get(self.endpoint("api/staff")?)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Self::read(response).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use httpmock::prelude::*;
    use serde_json::json;

    fn api(server: &MockServer) -> HttpReportApi {
        HttpReportApi::new(Url::parse(&server.url("/")).unwrap())
    }

    fn draft() -> ReportDraft {
        ReportDraft {
            title: "Audiencia".to_string(),
            senders: vec!["u-5".to_string()],
            recipients: vec!["u-7".to_string()],
            ..ReportDraft::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        }
    }

    #[tokio::test]
    async fn test_submit_report_posts_draft() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(Method::POST)
                .path("/api/create-report")
                .header("content-type", "application/json");
            then.status(200).json_body(json!({
                "id": "p1",
                "last_edited_by": { "name": "API" },
                "last_edited_time": "2024-01-01T00:00:00Z",
                "url": "https://x"
            }));
        });

        let receipt = api(&server).submit_report(&draft()).await.unwrap();

        mock.assert();
        assert_eq!(receipt.id, "p1");
        assert_eq!(receipt.last_edited_by.name, "API");
    }

    #[tokio::test]
    async fn test_server_message_surfaced() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::POST).path("/api/create-report");
            then.status(500)
                .json_body(json!({ "message": "Server error: bad request" }));
        });

        let err = api(&server).submit_report(&draft()).await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Server { status: 500, ref message } if message == "Server error: bad request"
        ));
    }

    #[tokio::test]
    async fn test_unreadable_error_body_uses_fallback() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::POST).path("/api/create-report");
            then.status(502).body("Bad Gateway");
        });

        let err = api(&server).submit_report(&draft()).await.unwrap_err();

        assert_eq!(err.to_string(), GENERIC_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_list_staff() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::GET).path("/api/staff");
            then.status(200).json_body(json!([
                { "localId": "u-5", "displayName": "Mtro. José Antonio Ruiz de la Cruz", "provisioned": true }
            ]));
        });

        let staff = api(&server).list_staff().await.unwrap();

        assert_eq!(staff.len(), 1);
        assert_eq!(staff[0].local_id, "u-5");
    }
}
