//! Runtime configuration for the binary: database location and log filter.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_DB_URL: &str = "sqlite://learn.sqlite3";
pub const DEFAULT_LOG_FILTER: &str = "learn=info,services=info,storage=info";

const MEMORY_URL: &str = "sqlite::memory:";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid --db value: {raw}")]
    InvalidDbUrl { raw: String },
    #[error("invalid --log filter: {0}")]
    InvalidLogFilter(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Settings resolved from flags, then env vars, then defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_url: String,
    pub log_filter: Option<String>,
}

impl Config {
    /// Resolve the database URL and log filter.
    ///
    /// `db` and `log` already carry env fallbacks (`LEARN_DB_URL`, `LEARN_LOG`) via clap.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDbUrl` for a blank database URL.
    pub fn resolve(db: Option<String>, log: Option<String>) -> Result<Self, ConfigError> {
        let db_url = match db {
            Some(raw) if raw.trim().is_empty() => return Err(ConfigError::InvalidDbUrl { raw }),
            Some(raw) => normalize_sqlite_url(raw),
            None => normalize_sqlite_url(DEFAULT_DB_URL.to_owned()),
        };
        let log_filter = log.filter(|filter| !filter.trim().is_empty());
        Ok(Self { db_url, log_filter })
    }

    /// Explicit filter first, then `RUST_LOG`, then the default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidLogFilter` if an explicit filter does not parse.
    pub fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        match &self.log_filter {
            Some(filter) => EnvFilter::try_new(filter)
                .map_err(|err| ConfigError::InvalidLogFilter(err.to_string())),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))),
        }
    }
}

/// Turns relative sqlite paths into absolute `sqlite://` URLs.
#[must_use]
pub fn normalize_sqlite_url(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed == MEMORY_URL || trimmed.starts_with("sqlite:file:") {
        return trimmed.to_owned();
    }

    let path_str = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Creates the database file and its parent directories if missing.
///
/// # Errors
///
/// Returns `ConfigError` if the URL has no file path or the file cannot be created.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), ConfigError> {
    if db_url == MEMORY_URL || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let invalid = || ConfigError::InvalidDbUrl {
        raw: db_url.to_owned(),
    };
    let path = db_url.strip_prefix("sqlite://").ok_or_else(invalid)?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(invalid());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}
