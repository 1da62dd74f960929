//! Centralized configuration (environment variables + defaults).

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ES_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_FILTER: &str = "car_catalog=info,tower_http=info";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Postgres connection string (required, no default).
    pub database_url: String,
    /// Elasticsearch base URL. Search is disabled when unset.
    pub es_url: Option<String>,
    pub port: u16,
    pub db_max_connections: u32,
    pub es_timeout: Duration,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any `name -> value` source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let es_url = get("ES_URL").map(|u| u.trim_end_matches('/').to_string());

        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT, "a valid port")?;
        let db_max_connections = parse_or(
            "DB_MAX_CONNECTIONS",
            get("DB_MAX_CONNECTIONS"),
            DEFAULT_DB_MAX_CONNECTIONS,
            "a positive integer",
        )?
        .max(1);
        let es_timeout_secs = parse_or(
            "ES_TIMEOUT_SECS",
            get("ES_TIMEOUT_SECS"),
            DEFAULT_ES_TIMEOUT_SECS,
            "a number of seconds",
        )?;

        Ok(Self {
            database_url,
            es_url,
            port,
            db_max_connections,
            es_timeout: Duration::from_secs(es_timeout_secs.max(1)),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
    }
}
