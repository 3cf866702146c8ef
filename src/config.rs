use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use validator::{Validate, ValidationError};

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const DEV_DEFAULT_JWT_SECRET: &str =
    "this_is_a_development_secret_key_that_is_long_enough_for_local_testing_only";

/// Application configuration with validation.
///
/// Layered from built-in defaults, `config/{default,<env>}.toml`, and
/// `APP__*` environment variables. Secrets have no production defaults:
/// outside development, startup fails fast when the Stripe keys or the
/// JWT secret are missing.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// JWT secret used to verify bearer tokens from the identity provider
    #[validate(length(min = 32), custom = "validate_jwt_secret")]
    pub jwt_secret: String,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment ("development", "production", ...)
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// CORS: comma-separated list of allowed origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Stripe secret API key (required outside development)
    #[serde(default)]
    pub stripe_secret_key: Option<String>,

    /// Stripe API base URL (overridable for tests)
    #[serde(default = "default_stripe_api_base")]
    pub stripe_api_base: String,

    /// Webhook secret for verifying payment gateway callbacks
    #[serde(default)]
    pub stripe_webhook_secret: Option<String>,

    /// Webhook signature timestamp tolerance (seconds)
    #[serde(default = "default_webhook_tolerance_secs")]
    pub stripe_webhook_tolerance_secs: u64,

    /// Default currency code for checkout sessions
    #[serde(default = "default_currency")]
    pub default_currency: String,

    /// Comma-separated admin email allow-list (in addition to the
    /// `admin` token claim)
    #[serde(default)]
    pub admin_emails: Option<String>,

    /// User-Agent sent to the public metadata services
    #[serde(default = "default_metadata_user_agent")]
    pub metadata_user_agent: String,

    /// MusicBrainz API base URL (overridable for tests)
    #[serde(default = "default_musicbrainz_api_base")]
    pub musicbrainz_api_base: String,

    /// Cover Art Archive base URL (overridable for tests)
    #[serde(default = "default_coverart_api_base")]
    pub coverart_api_base: String,

    /// Event channel capacity for async event processing
    #[serde(default = "default_event_channel_capacity")]
    #[validate(custom = "validate_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

fn default_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}
fn default_stripe_api_base() -> String {
    "https://api.stripe.com".to_string()
}
fn default_webhook_tolerance_secs() -> u64 {
    300
}
fn default_currency() -> String {
    "usd".to_string()
}
fn default_metadata_user_agent() -> String {
    format!("deadwax-api/{} (dev@deadwax.example)", env!("CARGO_PKG_VERSION"))
}
fn default_musicbrainz_api_base() -> String {
    "https://musicbrainz.org/ws/2".to_string()
}
fn default_coverart_api_base() -> String {
    "https://coverartarchive.org".to_string()
}
fn default_event_channel_capacity() -> usize {
    1024
}

fn validate_jwt_secret(secret: &str) -> Result<(), ValidationError> {
    let unique: std::collections::HashSet<char> = secret.chars().collect();
    if unique.len() < 10 {
        let mut err = ValidationError::new("jwt_secret");
        err.message =
            Some("JWT secret must have at least 10 unique characters for adequate entropy".into());
        return Err(err);
    }
    Ok(())
}

fn validate_event_channel_capacity(capacity: usize) -> Result<(), ValidationError> {
    if capacity == 0 {
        let mut err = ValidationError::new("event_channel_capacity");
        err.message = Some("event_channel_capacity must be greater than 0".into());
        return Err(err);
    }
    Ok(())
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
            || self.environment.eq_ignore_ascii_case("test")
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Admin email allow-list, lower-cased and trimmed.
    pub fn admin_allow_list(&self) -> Vec<String> {
        self.admin_emails
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(|e| e.trim().to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }

    /// Minimal constructor for tests and embedded harnesses.
    pub fn for_tests(database_url: String) -> Self {
        Self {
            database_url,
            jwt_secret: DEV_DEFAULT_JWT_SECRET.to_string(),
            host: "127.0.0.1".to_string(),
            port: default_port(),
            environment: "test".to_string(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: true,
            cors_allowed_origins: None,
            db_max_connections: 1,
            db_min_connections: 1,
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            stripe_secret_key: Some("sk_test_dummy".to_string()),
            stripe_api_base: default_stripe_api_base(),
            stripe_webhook_secret: Some("whsec_test_dummy".to_string()),
            stripe_webhook_tolerance_secs: default_webhook_tolerance_secs(),
            default_currency: default_currency(),
            admin_emails: None,
            metadata_user_agent: default_metadata_user_agent(),
            musicbrainz_api_base: default_musicbrainz_api_base(),
            coverart_api_base: default_coverart_api_base(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("missing required configuration: {0}")]
    MissingRequired(String),
}

/// Loads application configuration.
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. `config/default.toml`
/// 3. `config/{env}.toml` (selected via `RUN_ENV` / `APP_ENV`)
/// 4. Environment variables (`APP__*`)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let builder = Config::builder()
        .set_default("database_url", "sqlite://deadwax.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", i64::from(default_port()))?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"));

    let config = builder.build()?;

    // jwt_secret has no production default; inject a development-only
    // fallback so local runs work out of the box.
    let config = if config.get_string("jwt_secret").is_err() {
        if run_env == DEFAULT_ENV || run_env == "test" {
            Config::builder()
                .add_source(config)
                .set_default("jwt_secret", DEV_DEFAULT_JWT_SECRET)?
                .build()?
        } else {
            return Err(AppConfigError::MissingRequired(
                "jwt_secret must be set via APP__JWT_SECRET or a config file".to_string(),
            ));
        }
    } else {
        config
    };

    let app_config: AppConfig = config.try_deserialize()?;
    app_config.validate()?;

    if !app_config.is_development() {
        if app_config.stripe_secret_key.is_none() {
            return Err(AppConfigError::MissingRequired(
                "stripe_secret_key is required outside development".to_string(),
            ));
        }
        if app_config.stripe_webhook_secret.is_none() {
            return Err(AppConfigError::MissingRequired(
                "stripe_webhook_secret is required outside development".to_string(),
            ));
        }
    }

    Ok(app_config)
}

/// Initializes tracing using the provided log level as the default filter.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("deadwax_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_allow_list_parses_and_normalizes() {
        let mut cfg = AppConfig::for_tests("sqlite::memory:".to_string());
        cfg.admin_emails = Some(" Boss@Label.example ,, crew@label.example ".to_string());
        assert_eq!(
            cfg.admin_allow_list(),
            vec!["boss@label.example".to_string(), "crew@label.example".to_string()]
        );

        cfg.admin_emails = None;
        assert!(cfg.admin_allow_list().is_empty());
    }

    #[test]
    fn jwt_secret_entropy_is_enforced() {
        assert!(validate_jwt_secret("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").is_err());
        assert!(validate_jwt_secret(DEV_DEFAULT_JWT_SECRET).is_ok());
    }

    #[test]
    fn test_config_is_valid() {
        let cfg = AppConfig::for_tests("sqlite::memory:".to_string());
        assert!(cfg.validate().is_ok());
        assert!(cfg.is_development());
    }
}
