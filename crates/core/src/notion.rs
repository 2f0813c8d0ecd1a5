//! Notion API client for creating report pages.

use std::time::Duration;

use chrono::NaiveDate;
use portal_common::config::{NotionConfig, NotionProperties};
use portal_common::{AppError, AppResult, Secret};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use url::Url;

/// Notion rejects rich text objects longer than this many characters.
pub const MAX_TEXT_CONTENT_CHARS: usize = 2000;

/// Fallback message when Notion fails without a `message` field.
const GENERIC_UPSTREAM_ERROR: &str = "Error sending to Notion.";

/// Date property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotionDate {
    /// First (or only) day.
    pub start: NaiveDate,
    /// Last day, omitted for single-day reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

/// Values of a report page, before property names are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPage<'a> {
    /// Page title.
    pub title: &'a str,
    /// Optional description.
    pub description: Option<&'a str>,
    /// Report date or range.
    pub date: NotionDate,
    /// Notion person ids of the senders.
    pub senders: Vec<&'a str>,
    /// Notion person ids of the recipients.
    pub recipients: Vec<&'a str>,
}

impl ReportPage<'_> {
    /// Build the `POST /pages` body for `database_id`.
    #[must_use]
    pub fn to_request_body(&self, database_id: &str, names: &NotionProperties) -> Value {
        let mut properties = Map::new();
        properties.insert(
            names.title.clone(),
            json!({ "title": rich_text(self.title) }),
        );
        properties.insert(
            names.description.clone(),
            json!({ "rich_text": self.description.map(rich_text).unwrap_or_default() }),
        );
        properties.insert(names.date.clone(), json!({ "date": self.date }));
        properties.insert(names.senders.clone(), json!({ "people": people(&self.senders) }));
        properties.insert(
            names.recipients.clone(),
            json!({ "people": people(&self.recipients) }),
        );

        json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        })
    }
}

/// Split text into Notion rich text objects of at most
/// [`MAX_TEXT_CONTENT_CHARS`] characters each.
fn rich_text(text: &str) -> Vec<Value> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![json!({ "text": { "content": "" } })];
    }
    chars
        .chunks(MAX_TEXT_CONTENT_CHARS)
        .map(|chunk| {
            let content: String = chunk.iter().collect();
            json!({ "text": { "content": content } })
        })
        .collect()
}

fn people(ids: &[&str]) -> Vec<Value> {
    ids.iter().map(|id| json!({ "id": id })).collect()
}

/// The subset of a created page the portal uses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedPage {
    /// Page id.
    pub id: String,
    /// Last edit timestamp, kept verbatim.
    pub last_edited_time: String,
    /// Page URL.
    pub url: String,
}

/// Client for the Notion REST API.
#[derive(Clone)]
pub struct NotionClient {
    http_client: reqwest::Client,
    base_url: Url,
    api_key: Secret,
    api_version: String,
}

impl NotionClient {
    /// Create a client from configuration.
    pub fn new(config: &NotionConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    /// Create a page from a prepared request body.
    pub async fn create_page(&self, body: &Value) -> AppResult<CreatedPage> {
        let response = self
            .http_client
            .post(self.endpoint("pages"))
            .bearer_auth(self.api_key.expose())
            .header("Notion-Version", &self.api_version)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Notion request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to read Notion response: {e}")))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %text, "Notion rejected page creation");
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| GENERIC_UPSTREAM_ERROR.to_string());
            return Err(AppError::Upstream(message));
        }

        serde_json::from_str(&text)
            .map_err(|e| AppError::Internal(format!("Invalid Notion response: {e}")))
    }
}
