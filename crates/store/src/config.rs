use std::env;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::debug;

type Result<T> = anyhow::Result<T>;

/// Environment variable naming the config file.
pub const CONFIG_PATH_VAR: &str = "EXAMHALL_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "examhall.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_sqlx_logging")]
    pub sqlx_logging: bool,
    /// Load the seed dataset after migrating.
    #[serde(default = "default_seed")]
    pub seed: bool,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: default_max_connections(),
            sqlx_logging: default_sqlx_logging(),
            seed: default_seed(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("failed to deserialize store config")
    }

    /// Reads the file named by `EXAMHALL_CONFIG` (or `examhall.toml` when it
    /// exists), falling back to `DATABASE_URL` with default settings.
    pub fn load() -> Result<Self> {
        if let Ok(path) = env::var(CONFIG_PATH_VAR) {
            return Self::from_file(path);
        }
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            return Self::from_file(DEFAULT_CONFIG_PATH);
        }

        debug!("no config file found, reading DATABASE_URL");
        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL is not set"))?;
        Ok(Self::new(database_url))
    }

    pub fn is_sqlite_memory(&self) -> bool {
        self.database_url.starts_with("sqlite::memory:")
            || self.database_url.contains("mode=memory")
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_sqlx_logging() -> bool {
    false
}

fn default_seed() -> bool {
    true
}
