//! Application configuration.

use serde::Deserialize;
use url::Url;

use crate::error::{AppError, AppResult};
use crate::secret::Secret;
use crate::staff::{StaffDirectory, StaffMember};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Notion configuration.
    pub notion: NotionConfig,
    /// Staff directory entries.
    #[serde(default)]
    pub staff: Vec<StaffMember>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Notion API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NotionConfig {
    /// Integration token.
    pub api_key: Secret,
    /// Database that receives report pages.
    pub database_id: String,
    /// API base URL.
    #[serde(default = "default_notion_base_url")]
    pub base_url: Url,
    /// Value of the `Notion-Version` header.
    #[serde(default = "default_notion_version")]
    pub api_version: String,
    /// Outbound request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Editor name reported back to the form after a page is created.
    #[serde(default = "default_editor_name")]
    pub editor_name: String,
    /// Database property names.
    #[serde(default)]
    pub properties: NotionProperties,
}

/// Names of the database properties a report is written to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotionProperties {
    /// Title property.
    #[serde(default = "default_title_property")]
    pub title: String,
    /// Rich text property holding the description.
    #[serde(default = "default_description_property")]
    pub description: String,
    /// Date property.
    #[serde(default = "default_date_property")]
    pub date: String,
    /// People property for senders.
    #[serde(default = "default_senders_property")]
    pub senders: String,
    /// People property for recipients.
    #[serde(default = "default_recipients_property")]
    pub recipients: String,
}

impl Default for NotionProperties {
    fn default() -> Self {
        Self {
            title: default_title_property(),
            description: default_description_property(),
            date: default_date_property(),
            senders: default_senders_property(),
            recipients: default_recipients_property(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

#[allow(clippy::expect_used)] // Constant URL
fn default_notion_base_url() -> Url {
    Url::parse("https://api.notion.com/v1").expect("valid default Notion URL")
}

fn default_notion_version() -> String {
    "2022-06-28".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_editor_name() -> String {
    "API".to_string()
}

fn default_title_property() -> String {
    "Titulo".to_string()
}

fn default_description_property() -> String {
    "Descripción".to_string()
}

fn default_date_property() -> String {
    "Fecha de Registro".to_string()
}

fn default_senders_property() -> String {
    "Remitente".to_string()
}

fn default_recipients_property() -> String {
    "Destinatario".to_string()
}

/// Unprefixed variables that take precedence over every other source.
#[derive(Debug, Default)]
struct LegacyEnv {
    api_key: Option<String>,
    database_id: Option<String>,
}

impl LegacyEnv {
    fn from_env() -> Self {
        Self {
            api_key: std::env::var("NOTION_API_KEY").ok(),
            database_id: std::env::var("NOTION_DATABASE_ID").ok(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `PORTAL_ENV`)
    /// 4. Environment variables with `PORTAL_` prefix
    /// 5. `NOTION_API_KEY` and `NOTION_DATABASE_ID`
    pub fn load() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        let env = std::env::var("PORTAL_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false));

        Self::build(builder, LegacyEnv::from_env())
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        legacy: LegacyEnv,
    ) -> AppResult<Self> {
        let config: Self = builder
            .add_source(
                config::Environment::with_prefix("PORTAL")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("notion.api_key", legacy.api_key)?
            .set_override_option("notion.database_id", legacy.database_id)?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check the required Notion settings.
    pub fn validate(&self) -> AppResult<()> {
        if self.notion.api_key.is_blank() {
            return Err(AppError::Config("notion.api_key must be set".to_string()));
        }
        if self.notion.database_id.trim().is_empty() {
            return Err(AppError::Config("notion.database_id must be set".to_string()));
        }
        Ok(())
    }

    /// Build the staff directory from the configured entries.
    #[must_use]
    pub fn staff_directory(&self) -> StaffDirectory {
        StaffDirectory::new(self.staff.clone())
    }
}
