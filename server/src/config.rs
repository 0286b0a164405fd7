//! Configuration management for the server.

use std::env;
use std::str::FromStr;

/// Which store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::InvalidStore(value.to_string())),
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Store backend
    pub store: StoreBackend,
    /// PostgreSQL connection URL, required for the postgres backend
    pub database_url: Option<String>,
    /// Maximum pooled database connections
    pub max_connections: u32,
    /// Run replace-all inside one transaction. When off, a failure midway
    /// leaves the old trips deleted and the new ones partially inserted.
    pub atomic_replace: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let store = match lookup("TRIPS_STORE") {
            Some(value) => value.parse()?,
            None => StoreBackend::Postgres,
        };

        let database_url = lookup("DATABASE_URL");
        if store == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidNumber("DATABASE_MAX_CONNECTIONS"))?;

        let atomic_replace = match lookup("TRIPS_ATOMIC_REPLACE") {
            Some(value) => parse_flag(&value)
                .ok_or(ConfigError::InvalidFlag("TRIPS_ATOMIC_REPLACE"))?,
            None => false,
        };

        Ok(Self {
            host,
            port,
            store,
            database_url,
            max_connections,
            atomic_replace,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable is required")]
    MissingDatabaseUrl,

    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid TRIPS_STORE value '{0}', expected 'postgres' or 'memory'")]
    InvalidStore(String),

    #[error("Invalid {0} value, expected a number")]
    InvalidNumber(&'static str),

    #[error("Invalid {0} value, expected true or false")]
    InvalidFlag(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_with_database_url() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/trips")]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.store, StoreBackend::Postgres);
        assert_eq!(config.max_connections, 10);
        assert!(!config.atomic_replace);
    }

    #[test]
    fn postgres_requires_database_url() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingDatabaseUrl)));
    }

    #[test]
    fn memory_store_needs_no_database() {
        let config = load(&[("TRIPS_STORE", "Memory"), ("PORT", "8080")]).unwrap();

        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.port, 8080);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn invalid_values() {
        assert!(matches!(
            load(&[("TRIPS_STORE", "memory"), ("PORT", "http")]),
            Err(ConfigError::InvalidPort)
        ));
        assert!(matches!(
            load(&[("TRIPS_STORE", "redis")]),
            Err(ConfigError::InvalidStore(_))
        ));
        assert!(matches!(
            load(&[("TRIPS_STORE", "memory"), ("TRIPS_ATOMIC_REPLACE", "maybe")]),
            Err(ConfigError::InvalidFlag("TRIPS_ATOMIC_REPLACE"))
        ));
    }

    #[test]
    fn atomic_replace_flag() {
        let config = load(&[("TRIPS_STORE", "memory"), ("TRIPS_ATOMIC_REPLACE", "true")]).unwrap();
        assert!(config.atomic_replace);
    }
}
