//! Process configuration sourced from the environment.
//!
//! # Responsibility
//! - Build one explicit `AppConfig` at startup.
//! - Hand the store section (`StoreConfig`) to gateway constructors by
//!   reference, so request handling never reads the environment.
//!
//! # Invariants
//! - Unset variables fall back to documented defaults.
//! - Set-but-invalid variables are errors, never silently defaulted.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "MARKSHEET_DB_PATH";
pub const ENV_DB_BUSY_TIMEOUT_MS: &str = "MARKSHEET_DB_BUSY_TIMEOUT_MS";
pub const ENV_HOST: &str = "MARKSHEET_HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_LOG_LEVEL: &str = "MARKSHEET_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "MARKSHEET_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "marksheet.sqlite3";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration error for one environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but empty after trimming.
    Empty { key: &'static str },
    /// Variable is set but cannot be parsed.
    InvalidValue {
        key: &'static str,
        value: String,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty { key } => write!(f, "environment variable `{key}` is set but empty"),
            Self::InvalidValue {
                key,
                value,
                message,
            } => write!(f, "invalid value `{value}` for `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Connection parameters for the relational store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// How long a connection waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl StoreConfig {
    /// Creates a store config with the default busy timeout.
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }
}

/// Full process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` logs to stderr.
    pub log_dir: Option<String>,
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    /// - Returns `ConfigError` when a set variable is empty or unparsable.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    ///
    /// # Errors
    /// - Returns `ConfigError` when a present value is empty or unparsable.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path =
            read_text(&lookup, ENV_DB_PATH)?.unwrap_or_else(|| DEFAULT_DB_FILE_NAME.to_string());
        let busy_timeout_ms = match read_text(&lookup, ENV_DB_BUSY_TIMEOUT_MS)? {
            Some(value) => parse_number::<u64>(ENV_DB_BUSY_TIMEOUT_MS, value)?,
            None => DEFAULT_BUSY_TIMEOUT_MS,
        };
        let host = read_text(&lookup, ENV_HOST)?.unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match read_text(&lookup, ENV_PORT)? {
            Some(value) => parse_number::<u16>(ENV_PORT, value)?,
            None => DEFAULT_PORT,
        };
        let log_level =
            read_text(&lookup, ENV_LOG_LEVEL)?.unwrap_or_else(|| default_log_level().to_string());
        let log_dir = read_text(&lookup, ENV_LOG_DIR)?;

        Ok(Self {
            store: StoreConfig {
                database_path: PathBuf::from(database_path),
                busy_timeout: Duration::from_millis(busy_timeout_ms),
            },
            host,
            port,
            log_level,
            log_dir,
        })
    }

    /// Returns the `host:port` pair the HTTP listener binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn read_text<F>(lookup: &F, key: &'static str) -> ConfigResult<Option<String>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::Empty { key });
            }
            Ok(Some(trimmed.to_string()))
        }
    }
}

fn parse_number<T>(key: &'static str, value: String) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: Display,
{
    value
        .parse::<T>()
        .map_err(|err| ConfigError::InvalidValue {
            key,
            message: err.to_string(),
            value,
        })
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, ENV_DB_PATH, ENV_LOG_DIR, ENV_PORT};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.store.database_path, PathBuf::from("marksheet.sqlite3"));
        assert_eq!(config.store.busy_timeout, Duration::from_millis(5_000));
        assert_eq!(config.listen_addr(), "0.0.0.0:5000");
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_are_trimmed_and_parsed() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, " /var/lib/marksheet/data.db "),
            (ENV_PORT, "8080"),
            (ENV_LOG_DIR, "/var/log/marksheet"),
        ]))
        .unwrap();
        assert_eq!(
            config.store.database_path,
            PathBuf::from("/var/lib/marksheet/data.db")
        );
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/marksheet"));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_PORT, "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));
    }

    #[test]
    fn empty_value_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Empty { key: ENV_DB_PATH });
    }
}
