use config::{
    builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File, Map, Source,
};
use serde::Deserialize;

use crate::domain::ledger::LedgerOptions;

pub mod domain;
pub mod infrastructure;

#[derive(Clone, Debug, Deserialize)]
pub struct GabineteConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logger: Logger,
    #[serde(default)]
    pub ledger: LedgerOptions,
}

impl GabineteConfig {
    /// Defaults, then `gabinete.toml`, then `GABINETE__*` variables, then `DATABASE_URL`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::layered(
            File::with_name("gabinete").required(false),
            Self::environment(),
            std::env::var("DATABASE_URL").ok(),
        )
    }

    /// Builds the configuration from an inline TOML document layered over the defaults.
    /// The process environment is not consulted.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Self::layered(
            File::from_str(source, config::FileFormat::Toml),
            Self::environment().source(Some(Map::new())),
            None,
        )
    }

    fn layered<S>(
        file: S,
        environment: Environment,
        database_url: Option<String>,
    ) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        Self::defaults()?
            .add_source(file)
            .add_source(environment)
            .set_override_option("database.url", database_url)?
            .build()?
            .try_deserialize::<GabineteConfig>()
    }

    fn environment() -> Environment {
        Environment::with_prefix("GABINETE").separator("__")
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("database.url", "sqlite://agendamentos.db")?
            .set_default("database.max_connections", 5)?
            .set_default("server.address", "0.0.0.0:8080")?
            .set_default("logger.level", "INFO")
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub address: String,
    pub tls: Option<TlsConfig>,
}

/// PEM files handed to rustls when the server should speak HTTPS.
#[derive(Clone, Debug, Deserialize)]
pub struct TlsConfig {
    pub cert: String,
    pub key: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Logger {
    pub level: Level,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub enum Level {
    TRACE,
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

impl From<&Level> for tracing::Level {
    fn from(value: &Level) -> Self {
        match value {
            Level::TRACE => tracing::Level::TRACE,
            Level::DEBUG => tracing::Level::DEBUG,
            Level::INFO => tracing::Level::INFO,
            Level::WARN => tracing::Level::WARN,
            Level::ERROR => tracing::Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GabineteConfig::from_toml("").unwrap();
        assert_eq!(config.database.url, "sqlite://agendamentos.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.server.address, "0.0.0.0:8080");
        assert!(config.server.tls.is_none());
        assert_eq!(config.logger.level, Level::INFO);
        assert!(!config.ledger.reject_past_dates_on_update);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = GabineteConfig::from_toml(
            r#"
            [database]
            url = "sqlite::memory:"

            [server]
            address = "127.0.0.1:3000"
            tls = { cert = "localhost.pem", key = "localhost.key" }

            [logger]
            level = "DEBUG"

            [ledger]
            reject_past_dates_on_update = true
            "#,
        )
        .unwrap();
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.server.address, "127.0.0.1:3000");
        assert_eq!(config.server.tls.unwrap().key, "localhost.key");
        assert_eq!(tracing::Level::from(&config.logger.level), tracing::Level::DEBUG);
        assert!(config.ledger.reject_past_dates_on_update);
    }

    fn variables(pairs: &[(&str, &str)]) -> Environment {
        GabineteConfig::environment().source(Some(
            pairs
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect::<Map<String, String>>(),
        ))
    }

    const FILE: &str = r#"
        [database]
        url = "sqlite://from-file.db"

        [server]
        address = "127.0.0.1:3000"
        "#;

    #[test]
    fn test_prefixed_variables_override_file() {
        let config = GabineteConfig::layered(
            File::from_str(FILE, config::FileFormat::Toml),
            variables(&[
                ("GABINETE__SERVER__ADDRESS", "127.0.0.1:4000"),
                ("GABINETE__DATABASE__MAX_CONNECTIONS", "12"),
                ("GABINETE__LEDGER__REJECT_PAST_DATES_ON_UPDATE", "true"),
                ("OTHER__SERVER__ADDRESS", "10.0.0.1:1"),
            ]),
            None,
        )
        .unwrap();
        assert_eq!(config.server.address, "127.0.0.1:4000");
        assert_eq!(config.database.url, "sqlite://from-file.db");
        assert_eq!(config.database.max_connections, 12);
        assert!(config.ledger.reject_past_dates_on_update);
    }

    #[test]
    fn test_database_url_wins_over_every_layer() {
        let config = GabineteConfig::layered(
            File::from_str(FILE, config::FileFormat::Toml),
            variables(&[("GABINETE__DATABASE__URL", "sqlite://from-env.db")]),
            Some("sqlite://override.db".to_owned()),
        )
        .unwrap();
        assert_eq!(config.database.url, "sqlite://override.db");
        assert_eq!(config.server.address, "127.0.0.1:3000");
    }

    #[test]
    fn test_prefixed_database_url_without_override() {
        let config = GabineteConfig::layered(
            File::from_str("", config::FileFormat::Toml),
            variables(&[("GABINETE__DATABASE__URL", "sqlite://from-env.db")]),
            None,
        )
        .unwrap();
        assert_eq!(config.database.url, "sqlite://from-env.db");
        assert_eq!(config.server.address, "0.0.0.0:8080");
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let result = GabineteConfig::from_toml("[logger]\nlevel = \"LOUD\"");
        assert!(result.is_err());
    }
}
