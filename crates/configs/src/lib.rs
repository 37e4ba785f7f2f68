//! Layered application configuration.
//!
//! Sources, later wins: `config/default.toml`, `config/{APP_ENV}.toml`,
//! then `SELLBUY__`-prefixed environment variables
//! (e.g. `SELLBUY__SERVER__PORT=9000`). A `.env` file is loaded first via
//! dotenvy so local overrides stay out of the shell profile.

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub quota: QuotaSettings,
    pub cache: CacheSettings,
    pub media: MediaSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Origins allowed by the CORS layer; the SPA's origin in production.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: SecretString,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    /// Password-login tokens expire after this many hours.
    #[serde(default = "default_password_token_hours")]
    pub password_token_hours: i64,
    /// Google-login tokens are longer-lived.
    #[serde(default = "default_google_token_hours")]
    pub google_token_hours: i64,
    /// The single moderator address; see `AdminPolicy`.
    pub admin_email: String,
    /// Signup allowlist: only `@{allowed_email_domain}` addresses register.
    pub allowed_email_domain: String,
    /// Expected `aud` of incoming Google id tokens.
    #[serde(default)]
    pub google_client_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuotaSettings {
    #[serde(default = "default_quota_limit")]
    pub listings_per_window: u32,
    #[serde(default = "default_quota_window_hours")]
    pub window_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Blocked-seller snapshot TTL, seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub blocked_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    /// Directory uploads land in.
    pub upload_dir: String,
    /// Public URL prefix the stored references are served under.
    pub public_base: String,
}

fn default_max_connections() -> u32 {
    5
}
fn default_password_token_hours() -> i64 {
    24
}
fn default_google_token_hours() -> i64 {
    24 * 7
}
fn default_quota_limit() -> u32 {
    5
}
fn default_quota_window_hours() -> i64 {
    24
}
fn default_cache_ttl_secs() -> u64 {
    60
}

impl Settings {
    /// Loads the layered configuration for the current `APP_ENV`
    /// (default "local").
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".into());
        tracing::debug!(%env, "loading configuration");

        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SELLBUY")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
