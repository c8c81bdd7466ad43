use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub pubmed: PubMedConfig,
    pub llm: LlmConfig,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PubMedConfig {
    /// Base URL of the NCBI E-utilities endpoints.
    pub base_url: String,
    /// E-utilities database name.
    pub db: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// Chat-completions endpoint URL.
    pub api_url: String,
    /// API key; the sentinel value "mock" selects the mock model.
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// SMTP settings for newsletter delivery. An empty `host` disables the
/// mailer; the send endpoint then reports email as not configured.
#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

impl AppConfig {
    pub fn build() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.rust_log", "info,paperbrief=debug")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.connect_timeout", 30)?
            .set_default("pubmed.base_url", "https://eutils.ncbi.nlm.nih.gov/entrez/eutils")?
            .set_default("pubmed.db", "pubmed")?
            .set_default("pubmed.timeout_secs", 30)?
            .set_default("llm.api_url", "https://api.openai.com/v1/chat/completions")?
            .set_default("llm.api_key", "mock")?
            .set_default("llm.model", "gpt-4o")?
            .set_default("llm.timeout_secs", 60)?
            .set_default("smtp.host", "")?
            .set_default("smtp.port", 587)?
            .set_default("smtp.username", "")?
            .set_default("smtp.password", "")?
            .set_default("smtp.from_address", "newsletter@paperbrief.local")?
            // Environment variables override defaults, e.g.
            // `APP_DATABASE__URL=postgres://...` sets `DatabaseConfig.url`.
            .add_source(Environment::default().separator("__").prefix("APP"));

        builder.build()?.try_deserialize()
    }
}

impl SmtpConfig {
    /// Email delivery is opt-in; without a host there is nothing to build.
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty()
    }
}
