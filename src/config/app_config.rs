use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::storage::{PostgresConfig, StorageType};

/// Application configuration
///
/// Every section except `users` falls back to defaults; `users.min_age` must be
/// provided by a config file or `APP__USERS__MIN_AGE`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub metrics: MetricsConfig,
    pub users: UsersConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Persistence backend settings
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// `memory` or `postgres`
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Falls back to `DATABASE_URL` when unset
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// User registration rules
#[derive(Debug, Clone, Deserialize)]
pub struct UsersConfig {
    /// Minimum age in whole years required to register
    pub min_age: u32,
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_max_connections() -> u32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            database_url: None,
            max_connections: default_max_connections(),
        }
    }
}

impl StorageSettings {
    /// Resolve the configured backend name
    pub fn storage_type(&self) -> Result<StorageType, DomainError> {
        StorageType::from_str(&self.backend).ok_or_else(|| {
            DomainError::configuration(format!("Unknown storage backend: {}", self.backend))
        })
    }

    /// PostgreSQL pool settings for the configured database
    pub fn postgres_config(&self) -> Result<PostgresConfig, DomainError> {
        let url = match &self.database_url {
            Some(url) => url.clone(),
            None => std::env::var("DATABASE_URL").map_err(|_| {
                DomainError::configuration(
                    "storage.database_url or DATABASE_URL is required for the postgres backend",
                )
            })?,
        };

        Ok(PostgresConfig::new(url).with_max_connections(self.max_connections))
    }
}

impl AppConfig {
    /// Load from `config/default`, `config/local` and `APP__*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::build(builder)
    }

    /// Parse a TOML document on its own, without files or environment
    #[cfg(test)]
    pub(crate) fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml));

        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    /// Defaults for every section with the given age threshold
    #[cfg(test)]
    pub(crate) fn with_min_age(min_age: u32) -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            storage: StorageSettings::default(),
            metrics: MetricsConfig::default(),
            users: UsersConfig { min_age },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_full() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [logging]
            level = "debug"
            format = "json"

            [storage]
            backend = "postgres"
            database_url = "postgres://db/users"
            max_connections = 4

            [metrics]
            enabled = false

            [users]
            min_age = 21
            "#,
        )
        .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.storage.storage_type().unwrap(), StorageType::Postgres);
        assert!(!config.metrics.enabled);
        assert_eq!(config.metrics.path, "/metrics");
        assert_eq!(config.users.min_age, 21);

        let pg = config.storage.postgres_config().unwrap();
        assert_eq!(pg.url, "postgres://db/users");
        assert_eq!(pg.max_connections, 4);
    }

    #[test]
    fn test_from_toml_defaults_everything_but_min_age() {
        let config = AppConfig::from_toml("[users]\nmin_age = 18\n").unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.storage.backend, "memory");
        assert!(config.metrics.enabled);
        assert_eq!(config.users.min_age, 18);
    }

    #[test]
    fn test_missing_min_age_is_an_error() {
        let err = AppConfig::from_toml("[server]\nhost = \"0.0.0.0\"\nport = 8080\n").unwrap_err();
        assert!(err.to_string().contains("users"));
    }

    #[test]
    fn test_negative_min_age_is_an_error() {
        assert!(AppConfig::from_toml("[users]\nmin_age = -1\n").is_err());
    }

    #[test]
    fn test_unknown_backend() {
        let settings = StorageSettings {
            backend: "cassandra".to_string(),
            ..Default::default()
        };

        let err = settings.storage_type().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Unknown storage backend: cassandra");
    }

    #[test]
    fn test_with_min_age() {
        let config = AppConfig::with_min_age(18);

        assert_eq!(config.users.min_age, 18);
        assert_eq!(config.storage.storage_type().unwrap(), StorageType::InMemory);
    }
}
