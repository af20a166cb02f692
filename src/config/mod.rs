//! Configuration loading and management
//!
//! Values come from three layers, later ones winning: built-in defaults, an
//! optional YAML file named by `BIZTIME_CONFIG`, and environment variables
//! (a `.env` file is loaded first if present).

use crate::core::error::ConfigError;
use crate::core::payment::PaidDatePolicy;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::ToSocketAddrs;
use std::str::FromStr;

/// Environment variable naming the YAML configuration file
pub const CONFIG_PATH_VAR: &str = "BIZTIME_CONFIG";

/// Which store implementation backs the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(format!("expected 'postgres' or 'memory', got '{}'", other)),
        }
    }
}

/// Database connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL (`DATABASE_URL`)
    pub url: String,

    /// Upper bound on pooled connections
    pub max_connections: u32,

    /// Seconds to wait for a free connection
    pub acquire_timeout_secs: u64,

    /// Apply migrations on startup
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/biztime".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 5,
            run_migrations: true,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind: String,

    pub storage: StorageBackend,

    pub database: DatabaseConfig,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// What re-marking a paid invoice as paid does to `paid_date`
    pub paid_date_policy: PaidDatePolicy,

    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            storage: StorageBackend::default(),
            database: DatabaseConfig::default(),
            request_timeout_secs: 30,
            paid_date_policy: PaidDatePolicy::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string(),
            },
            _ => ConfigError::IoError {
                message: format!("{}: {}", path, e),
            },
        })?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError {
                file: Some(path.to_string()),
                message: e.to_string(),
            })?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load from `.env`, the optional YAML file and the process environment
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }

        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override values from environment-style key lookups
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(bind) = lookup("BIZTIME_BIND") {
            self.bind = bind;
        }
        if let Some(value) = lookup("BIZTIME_STORAGE") {
            self.storage = parse_value("BIZTIME_STORAGE", &value)?;
        }
        if let Some(value) = lookup("BIZTIME_MAX_CONNECTIONS") {
            self.database.max_connections = parse_value("BIZTIME_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = lookup("BIZTIME_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs =
                parse_value("BIZTIME_ACQUIRE_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("BIZTIME_RUN_MIGRATIONS") {
            self.database.run_migrations = parse_value("BIZTIME_RUN_MIGRATIONS", &value)?;
        }
        if let Some(value) = lookup("BIZTIME_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_value("BIZTIME_REQUEST_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("BIZTIME_PAID_DATE_POLICY") {
            self.paid_date_policy = parse_value("BIZTIME_PAID_DATE_POLICY", &value)?;
        }
        if let Some(level) = lookup("BIZTIME_LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }

    /// Reject values the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Resolves host names the same way the listener will
        if let Err(e) = self.bind.as_str().to_socket_addrs() {
            return Err(ConfigError::InvalidValue {
                field: "bind".to_string(),
                value: self.bind.clone(),
                message: format!("expected host:port ({})", e),
            });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.max_connections".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.storage == StorageBackend::Postgres && self.database.url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.url".to_string(),
                value: String::new(),
                message: "required when storage is postgres".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_value<T>(field: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            message: e.to_string(),
        })
}
