//! Process configuration, read from environment variables.

use std::net::SocketAddr;

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),
}

/// Which store backend the process wires up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    InMemory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            var: "BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let persistent_raw = lookup("USE_PERSISTENT_STORES").unwrap_or_else(|| "false".to_string());
        let persistent = persistent_raw
            .parse::<bool>()
            .map_err(|e| ConfigError::Invalid {
                var: "USE_PERSISTENT_STORES",
                value: persistent_raw.clone(),
                reason: e.to_string(),
            })?;

        let storage = if persistent {
            let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
                None => DEFAULT_MAX_CONNECTIONS,
                Some(raw) => raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                    var: "DATABASE_MAX_CONNECTIONS",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
            };
            StorageConfig::Postgres {
                database_url,
                max_connections,
            }
        } else {
            StorageConfig::InMemory
        };

        Ok(Self { bind_addr, storage })
    }
}
