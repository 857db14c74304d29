//! Environment configuration.

use std::env;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Default: 0.0.0.0
    pub host: String,
    /// Default: 3000
    pub port: u16,
    /// Default: 10
    pub max_connections: u32,
    /// Maximum words loaded into a review session. Default: 1000
    pub session_item_limit: i64,
    /// Hour (0-23) at which a new study day begins. Default: 0
    pub daily_reset_hour: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 3000)?;
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;
        let session_item_limit: i64 = parse_or(&lookup, "SESSION_ITEM_LIMIT", 1000)?;
        let daily_reset_hour: u32 = parse_or(&lookup, "DAILY_RESET_HOUR", 0)?;

        if session_item_limit <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "SESSION_ITEM_LIMIT",
                value: session_item_limit.to_string(),
            });
        }
        if daily_reset_hour > 23 {
            return Err(ConfigError::InvalidValue {
                name: "DAILY_RESET_HOUR",
                value: daily_reset_hour.to_string(),
            });
        }

        Ok(Self {
            database_url,
            host,
            port,
            max_connections,
            session_item_limit,
            daily_reset_hour,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}
