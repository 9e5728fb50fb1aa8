//! Configuration management for the SOILY platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with SOILY__ prefix
//!
//! Secrets (database URL, JWT secret, admin password hash) have no defaults.
//! Startup fails when any of them is missing.

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub jwt: JwtConfig,

    /// Admin console credentials
    pub admin: AdminConfig,

    /// Satellite imagery; absent means `/analyze-field` is disabled
    #[serde(default)]
    pub earth_engine: Option<EarthEngineConfig>,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,

    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    pub max_connections: u32,

    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing access tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiration in seconds
    pub refresh_token_expiry: i64,

    /// Refresh token expiration when the farmer ticks "remember me"
    pub remember_token_expiry: i64,

    /// Admin access token expiration in seconds
    pub admin_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub username: String,

    /// bcrypt hash of the admin password
    pub password_hash: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EarthEngineConfig {
    /// Cloud project hosting the Earth Engine API, e.g. `my-project`
    pub project: String,

    /// Path to the service account JSON key
    pub key_path: String,

    /// Sentinel-2 acquisition window, `YYYY-MM-DD`
    pub date_from: String,
    pub date_to: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReportConfig {
    /// PNG or JPEG drawn in report headers; reports fall back to a
    /// placeholder box when unset or unreadable
    pub logo_path: Option<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("SOILY_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.access_token_expiry", 3600)?
            .set_default("jwt.refresh_token_expiry", 86_400)?
            .set_default("jwt.remember_token_expiry", 2_592_000)?
            .set_default("jwt.admin_token_expiry", 28_800)?
            .set_default("admin.username", "admin")?
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(
                Environment::with_prefix("SOILY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.check_secrets()?;
        Ok(config)
    }

    /// Reject blank secrets that deserialized from empty variables
    fn check_secrets(&self) -> Result<(), ConfigError> {
        let required = [
            ("database.url", self.database.url.as_str()),
            ("jwt.secret", self.jwt.secret.as_str()),
            ("admin.password_hash", self.admin.password_hash.as_str()),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((key, _)) => Err(ConfigError::NotFound(key.to_string())),
            None => Ok(()),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
