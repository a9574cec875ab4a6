//! Runtime configuration for hosts embedding the core.
//!
//! # Responsibility
//! - Collect database and logging settings from the environment.
//! - Fail fast on malformed values instead of silently defaulting.
//!
//! # Invariants
//! - `log_level` is always a normalized level name.
//! - `log_dir`, when present, is absolute.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "PORTFOLIO_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "PORTFOLIO_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PORTFOLIO_LOG_DIR";

pub const DEFAULT_DB_FILE_NAME: &str = "portfolio.sqlite3";

/// Configuration error naming the offending variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    NotUnicode(&'static str),
    Empty(&'static str),
    InvalidValue { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotUnicode(key) => write!(f, "{key} is not valid unicode"),
            Self::Empty(key) => write!(f, "{key} must not be empty"),
            Self::InvalidValue { key, message } => write!(f, "{key}: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Settings shared by every entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// File logging is disabled when absent.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads `PORTFOLIO_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Builds config from an arbitrary variable source.
    pub fn from_lookup(
        lookup: impl Fn(&'static str) -> Option<OsString>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = read_var(&lookup, ENV_DB_PATH)? {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read_var(&lookup, ENV_LOG_LEVEL)? {
            config.log_level = normalize_level(&level).map_err(|err| ConfigError::InvalidValue {
                key: ENV_LOG_LEVEL,
                message: err.to_string(),
            })?;
        }
        if let Some(dir) = read_var(&lookup, ENV_LOG_DIR)? {
            let dir = PathBuf::from(dir);
            if !dir.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    key: ENV_LOG_DIR,
                    message: format!("`{}` is not absolute", dir.display()),
                });
            }
            config.log_dir = Some(dir);
        }

        Ok(config)
    }
}

fn read_var(
    lookup: &impl Fn(&'static str) -> Option<OsString>,
    key: &'static str,
) -> Result<Option<String>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let value = raw.into_string().map_err(|_| ConfigError::NotUnicode(key))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty(key));
    }
    Ok(Some(trimmed.to_string()))
}
