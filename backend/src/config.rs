//! Service configuration.
//!
//! Settings are read from environment variables (optionally seeded from a
//! `.env` file by the binaries) or from a TOML file named by `TODO_CONFIG`.
//! Every key has a default so a bare `cargo run` works against a local
//! Postgres with stock credentials.
//!
//! # Environment Variables
//!
//! - `HOST` / `PORT`: bind address (default: 0.0.0.0:8000)
//! - `ENVIRONMENT`: deployment name (default: development)
//! - `POSTGRES_USERNAME`, `POSTGRES_PASSWORD`, `POSTGRES_HOSTNAME`, `POSTGRES_PORT`
//! - `DATABASE_NAME`: target database (default: tododb)
//! - `DATABASE_URL`: full connection string, overrides the computed one
//! - `SESSION_SECRET`: reserved, not consumed by any handler
//! - `CORS_ALLOW_ORIGINS`: comma-separated origins, or `*` for any origin
//! - `REPOSITORY_TYPE`: `postgres` or `local`
//! - `PG_POOL_MAX`, `PG_POOL_MIN`, `PG_CONN_TIMEOUT_SEC`, `PG_IDLE_TIMEOUT_SEC`,
//!   `PG_MAX_RETRIES`, `PG_RETRY_DELAY_MS`: pool tuning

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Origins allowed when `CORS_ALLOW_ORIGINS` is not set.
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost:5173",
];

/// Errors produced while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Cross-origin policy applied by the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Any origin, no credentials. An operator decision, not a default.
    AllowAny,
    /// Only the listed origins, credentials allowed.
    AllowList(Vec<String>),
}

impl CorsPolicy {
    /// Build a policy from configured origins. A `*` entry selects `AllowAny`.
    pub fn from_origins<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Vec::new();
        for origin in origins {
            let origin = origin.as_ref().trim();
            if origin == "*" {
                return CorsPolicy::AllowAny;
            }
            if origin.is_empty() {
                continue;
            }
            // Browsers never send a trailing slash in the Origin header
            list.push(origin.trim_end_matches('/').to_string());
        }
        CorsPolicy::AllowList(list)
    }
}

/// Connection pool tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_sec: u64,
    pub idle_timeout_sec: u64,
    /// Retries for transient failures. Zero disables retrying.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            connect_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 0,
            retry_delay_ms: 100,
        }
    }
}

/// Immutable process settings, resolved once at startup.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub postgres_username: String,
    pub postgres_password: String,
    pub postgres_hostname: String,
    pub postgres_port: u16,
    pub database_name: String,
    /// Full connection string; when unset one is computed from the fields above.
    pub database_url: Option<String>,
    /// Reserved for a future auth layer.
    pub session_secret: String,
    pub cors_allow_origins: Vec<String>,
    pub repository_type: Option<String>,
    pub pool: PoolSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            environment: "development".to_string(),
            postgres_username: "postgres".to_string(),
            postgres_password: "postgres".to_string(),
            postgres_hostname: "localhost".to_string(),
            postgres_port: 5432,
            database_name: "tododb".to_string(),
            database_url: None,
            session_secret: "secret".to_string(),
            cors_allow_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            repository_type: None,
            pool: PoolSettings::default(),
        }
    }
}

// Credentials stay out of logs
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("postgres_username", &self.postgres_username)
            .field("postgres_password", &"<redacted>")
            .field("postgres_hostname", &self.postgres_hostname)
            .field("postgres_port", &self.postgres_port)
            .field("database_name", &self.database_name)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "<redacted>"),
            )
            .field("session_secret", &"<redacted>")
            .field("cors_allow_origins", &self.cors_allow_origins)
            .field("repository_type", &self.repository_type)
            .field("pool", &self.pool)
            .finish()
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

impl Settings {
    /// Load settings from the TOML file named by `TODO_CONFIG`, or from the
    /// environment when it is not set.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var("TODO_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path),
            _ => Self::from_env(),
        }
    }

    /// Create settings from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let pool_defaults = PoolSettings::default();

        let cors_allow_origins = match std::env::var("CORS_ALLOW_ORIGINS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.cors_allow_origins.clone(),
        };

        Ok(Self {
            host: env_string("HOST", &defaults.host),
            port: env_parse("PORT", defaults.port)?,
            environment: env_string("ENVIRONMENT", &defaults.environment),
            postgres_username: env_string("POSTGRES_USERNAME", &defaults.postgres_username),
            postgres_password: env_string("POSTGRES_PASSWORD", &defaults.postgres_password),
            postgres_hostname: env_string("POSTGRES_HOSTNAME", &defaults.postgres_hostname),
            postgres_port: env_parse("POSTGRES_PORT", defaults.postgres_port)?,
            database_name: env_string("DATABASE_NAME", &defaults.database_name),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            session_secret: env_string("SESSION_SECRET", &defaults.session_secret),
            cors_allow_origins,
            repository_type: std::env::var("REPOSITORY_TYPE").ok(),
            pool: PoolSettings {
                max_connections: env_parse("PG_POOL_MAX", pool_defaults.max_connections)?,
                min_connections: env_parse("PG_POOL_MIN", pool_defaults.min_connections)?,
                connect_timeout_sec: env_parse(
                    "PG_CONN_TIMEOUT_SEC",
                    pool_defaults.connect_timeout_sec,
                )?,
                idle_timeout_sec: env_parse("PG_IDLE_TIMEOUT_SEC", pool_defaults.idle_timeout_sec)?,
                max_retries: env_parse("PG_MAX_RETRIES", pool_defaults.max_retries)?,
                retry_delay_ms: env_parse("PG_RETRY_DELAY_MS", pool_defaults.retry_delay_ms)?,
            },
        })
    }

    /// Load settings from a TOML file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Connection string for the application database.
    pub fn database_url(&self) -> String {
        match &self.database_url {
            Some(url) => url.clone(),
            None => self.url_for_database(&self.database_name),
        }
    }

    /// Connection string for the `postgres` maintenance database, used to
    /// create the application database when it is missing.
    pub fn maintenance_url(&self) -> String {
        match &self.database_url {
            Some(url) => replace_database(url, "postgres"),
            None => self.url_for_database("postgres"),
        }
    }

    fn url_for_database(&self, database: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.postgres_username,
            self.postgres_password,
            self.postgres_hostname,
            self.postgres_port,
            database
        )
    }

    /// Name of the database the bootstrap step should create.
    pub fn target_database(&self) -> String {
        match &self.database_url {
            Some(url) => database_from_url(url).unwrap_or_else(|| self.database_name.clone()),
            None => self.database_name.clone(),
        }
    }

    pub fn cors_policy(&self) -> CorsPolicy {
        CorsPolicy::from_origins(&self.cors_allow_origins)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// Split `scheme://authority/db?query` into (`scheme://authority`, `db`, `?query`).
fn split_url(url: &str) -> Option<(&str, &str, &str)> {
    let after_scheme = url.find("://")? + 3;
    let slash = after_scheme + url[after_scheme..].find('/')?;
    let rest = &url[slash + 1..];
    let (db, query) = match rest.find('?') {
        Some(q) => (&rest[..q], &rest[q..]),
        None => (rest, ""),
    };
    Some((&url[..slash], db, query))
}

fn database_from_url(url: &str) -> Option<String> {
    split_url(url)
        .map(|(_, db, _)| db.to_string())
        .filter(|db| !db.is_empty())
}

fn replace_database(url: &str, database: &str) -> String {
    match split_url(url) {
        Some((base, _, query)) => format!("{}/{}{}", base, database, query),
        None => format!("{}/{}", url.trim_end_matches('/'), database),
    }
}
