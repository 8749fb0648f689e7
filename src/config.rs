use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use serde::Deserialize;

/// Top-level application configuration loaded from file + environment.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingSection,
}

impl AppConfig {
    /// Load configuration from disk and environment.
    ///
    /// Environment keys nest with a double underscore, e.g.
    /// `RECIPEBOX_DATABASE__PASSWORD`. Values stay strings until a numeric
    /// field asks for a number, so `007` remains a valid password.
    pub fn load() -> Result<Self> {
        let config_path =
            env::var("RECIPEBOX_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

        let mut builder = config::Config::builder();

        if Path::new(&config_path).exists() {
            builder = builder.add_source(config::File::from(PathBuf::from(&config_path)));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("RECIPEBOX")
                .prefix_separator("_")
                .separator("__"),
        );

        let settings = builder.build()?;
        let mut config: Self = settings.try_deserialize()?;

        if config.logging.level.trim().is_empty() {
            config.logging.level = "info".to_string();
        }

        Ok(config)
    }

    /// Reject settings the server cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.server.request_timeout_secs == 0 {
            bail!("server.request_timeout_secs must be greater than zero");
        }
        self.database.validate()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    #[default]
    Mysql,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub driver: DatabaseDriver,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    /// SQLite file, or `:memory:` for a throwaway database.
    pub sqlite_path: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// In-memory SQLite database with default pool settings.
    pub fn sqlite_memory() -> Self {
        Self {
            driver: DatabaseDriver::Sqlite,
            sqlite_path: ":memory:".to_string(),
            ..Self::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.driver == DatabaseDriver::Sqlite && self.sqlite_path == ":memory:"
    }

    /// URL of the database server itself, without selecting a schema.
    ///
    /// For SQLite this is the same as [`DatabaseConfig::database_url`].
    pub fn server_url(&self) -> String {
        match self.driver {
            DatabaseDriver::Mysql => format!(
                "mysql://{}:{}@{}:{}",
                urlencoding::encode(&self.user),
                urlencoding::encode(&self.password),
                self.host,
                self.port
            ),
            DatabaseDriver::Sqlite => self.database_url(),
        }
    }

    pub fn database_url(&self) -> String {
        match self.driver {
            DatabaseDriver::Mysql => format!("{}/{}", self.server_url(), self.name),
            DatabaseDriver::Sqlite if self.is_in_memory() => "sqlite::memory:".to_string(),
            DatabaseDriver::Sqlite => format!("sqlite://{}?mode=rwc", self.sqlite_path),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            bail!("database.max_connections must be greater than zero");
        }

        match self.driver {
            DatabaseDriver::Mysql => {
                if self.user.trim().is_empty() {
                    bail!("database.user must be specified for mysql");
                }
                if self.host.trim().is_empty() {
                    bail!("database.host must be specified for mysql");
                }
                if !is_valid_identifier(&self.name) {
                    bail!(
                        "database.name '{}' must be non-empty and contain only ASCII letters, digits or '_'",
                        self.name
                    );
                }
            }
            DatabaseDriver::Sqlite => {
                if self.sqlite_path.trim().is_empty() {
                    bail!("database.sqlite_path must be specified for sqlite");
                }
            }
        }

        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::Mysql,
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            name: "rest_api".to_string(),
            sqlite_path: "recipes.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Schema names are spliced into DDL, so only plain identifiers are allowed.
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}
