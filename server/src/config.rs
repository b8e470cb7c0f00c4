//! Server configuration from the environment.
//!
//! - `HOST`: bind address (default `127.0.0.1`)
//! - `PORT`: bind port (default `3000`)
//! - `TODO_LOCALES_DIR`: directory holding `en.json` / `fa.json`; the
//!   bundles compiled into the binary are used when unset
//! - `DATABASE_URL`: SQLite URL such as `sqlite://todos.db`; todos are kept
//!   in memory and lost on restart when unset
//! - `RUST_LOG`: log filter, read by the subscriber in `main`

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use todo_core::{InMemoryStore, SqliteStore, StoreError, TodoStore};
use tracing::info;

use crate::i18n::Translations;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub locales_dir: Option<PathBuf>,
    pub database_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            locales_dir: None,
            database_url: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup. Blank values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = match var("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port,
            locales_dir: var("TODO_LOCALES_DIR").map(PathBuf::from),
            database_url: var("DATABASE_URL"),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn translations(&self) -> Translations {
        match &self.locales_dir {
            Some(dir) => Translations::from_dir(dir),
            None => Translations::embedded(),
        }
    }

    /// Opens the SQLite store when `database_url` is set, otherwise an
    /// empty in-memory store.
    pub async fn open_store(&self) -> Result<Arc<dyn TodoStore>, StoreError> {
        match &self.database_url {
            Some(url) => {
                info!(backend = "sqlite", "opening todo store");
                Ok(Arc::new(SqliteStore::connect(url).await?))
            }
            None => {
                info!(backend = "memory", "opening todo store");
                Ok(Arc::new(InMemoryStore::new()))
            }
        }
    }
}
