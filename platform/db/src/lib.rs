//! Connection wiring for the talent catalog database.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing: set {0}")]
    MissingUrl(String),
    #[error("failed to connect to database: {0}")]
    Connect(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

/// Environment-driven connection settings.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_url_key")]
    env_key: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub log_statements: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self::new(default_url_key())
    }
}

fn default_url_key() -> String {
    "DATABASE_URL".to_string()
}

fn default_max_connections() -> u32 {
    10
}

impl DatabaseSettings {
    pub fn new(env_key: impl Into<String>) -> Self {
        Self {
            env_key: env_key.into(),
            max_connections: default_max_connections(),
            log_statements: false,
        }
    }

    pub fn env_key(&self) -> &str {
        &self.env_key
    }

    pub fn database_url(&self) -> DbResult<String> {
        std::env::var(&self.env_key)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| DbError::MissingUrl(self.env_key.clone()))
    }

    fn connect_options(&self, url: String) -> ConnectOptions {
        let mut options = ConnectOptions::new(url);
        options
            .max_connections(self.max_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(self.log_statements);
        options
    }
}

/// Open a pooled connection using the configured URL.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<DatabaseConnection> {
    let url = settings.database_url()?;
    connect_url(settings, url).await
}

/// Open a pooled connection to an explicit URL, e.g. one passed on the command line.
pub async fn connect_url(settings: &DatabaseSettings, url: String) -> DbResult<DatabaseConnection> {
    let conn = Database::connect(settings.connect_options(url)).await?;
    tracing::info!(
        max_connections = settings.max_connections,
        "database connection established"
    );
    Ok(conn)
}
