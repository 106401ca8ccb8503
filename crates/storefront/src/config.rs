//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Database
//! - `DATABASE_URL` - `PostgreSQL` connection string; takes precedence over the parts below
//! - `DB_HOST` - Database host (default: localhost)
//! - `DB_PORT` - Database port (default: 5432)
//! - `DB_USER` - Database user (default: postgres)
//! - `DB_PASSWORD` - Database password (optional)
//! - `DB_NAME` - Database name (default: `coffee_box`)
//!
//! ## Server
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 3000)
//! - `STATIC_DIR` - Directory served under `/static` (default: crates/storefront/static)
//!
//! ## Error tracking
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Database connection settings
    pub database: DatabaseConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory holding `data/catalog.json` and other static assets
    pub static_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// `PostgreSQL` connection settings.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Full connection URL; when present the discrete fields are ignored
    pub url: Option<SecretString>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<SecretString>,
    pub name: String,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted = |s: &Option<SecretString>| s.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("DatabaseConfig")
            .field("url", &redacted(&self.url))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &redacted(&self.password))
            .field("name", &self.name)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let host = parse_var("HOST", &get_or("HOST", "127.0.0.1"))?;
        let port = parse_var("PORT", &get_or("PORT", "3000"))?;
        let static_dir = PathBuf::from(get_or("STATIC_DIR", "crates/storefront/static"));

        let database = DatabaseConfig {
            url: lookup("DATABASE_URL").map(SecretString::from),
            host: get_or("DB_HOST", "localhost"),
            port: parse_var("DB_PORT", &get_or("DB_PORT", "5432"))?,
            user: get_or("DB_USER", "postgres"),
            password: lookup("DB_PASSWORD").map(SecretString::from),
            name: get_or("DB_NAME", "coffee_box"),
        };

        Ok(Self {
            database,
            host,
            port,
            static_dir,
            sentry_dsn: lookup("SENTRY_DSN"),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Path of the catalog document inside the static directory.
    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.static_dir.join("data").join("catalog.json")
    }
}

impl DatabaseConfig {
    /// Connection options for sqlx.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error::Configuration` if `url` is set but malformed.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url.expose_secret());
        }

        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name);

        Ok(match &self.password {
            Some(password) => options.password(password.expose_secret()),
            None => options,
        })
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.name, "coffee_box");
        assert!(config.database.url.is_none());
        assert!(config.sentry_dsn.is_none());
        assert!(config.catalog_path().ends_with("data/catalog.json"));
    }

    #[test]
    fn test_discrete_database_settings() {
        let config = config_from(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_USER", "coffee"),
            ("DB_PASSWORD", "s3cr3t"),
            ("DB_NAME", "shop"),
            ("PORT", "8080"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        let options = config.database.connect_options().unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "coffee");
        assert_eq!(options.get_database(), Some("shop"));
    }

    #[test]
    fn test_database_url_takes_precedence() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://u:p@urlhost:5433/urldb"),
            ("DB_HOST", "ignored"),
        ])
        .unwrap();

        let options = config.database.connect_options().unwrap();
        assert_eq!(options.get_host(), "urlhost");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_database(), Some("urldb"));
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "PORT"));
    }

    #[test]
    fn test_invalid_host() {
        assert!(config_from(&[("HOST", "localhost:80")]).is_err());
    }

    #[test]
    fn test_database_debug_redacts_secrets() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://u:super_secret_url@h/db"),
            ("DB_PASSWORD", "super_secret_password"),
        ])
        .unwrap();

        let debug_output = format!("{:?}", config.database);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_url"));
        assert!(!debug_output.contains("super_secret_password"));
    }
}
