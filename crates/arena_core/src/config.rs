//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve data/log locations, log level and remote persona credentials.
//!
//! # Invariants
//! - A blank `GEMINI_API_KEY` is treated as absent.

use crate::jinnai::persona_client::GEMINI_API_URL;
use crate::logging::{default_log_level, LogLevel, LoggingError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DATA_DIR: &str = "ARENA_DATA_DIR";
pub const ENV_LOG_LEVEL: &str = "ARENA_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ARENA_LOG_DIR";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_API_URL: &str = "GEMINI_API_URL";

const DEFAULT_DATA_DIR: &str = ".arena";
const DB_FILE_NAME: &str = "arena.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaConfig {
    pub data_dir: PathBuf,
    pub log_level: LogLevel,
    pub log_dir: PathBuf,
    pub gemini_api_key: Option<String>,
    pub gemini_api_url: String,
}

impl ArenaConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, but a given `level` replaces `ARENA_LOG_LEVEL`
    /// before it is parsed.
    pub fn from_env_with_level(level: Option<&str>) -> Result<Self, ConfigError> {
        Self::from_lookup_with_level(|key| std::env::var(key).ok(), level)
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Self::from_lookup_with_level(lookup, None)
    }

    /// Resolves through `lookup`; `level_override` shadows `ARENA_LOG_LEVEL`.
    pub fn from_lookup_with_level(
        lookup: impl Fn(&str) -> Option<String>,
        level_override: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let data_dir = non_blank(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let level_text = match level_override {
            Some(level) => Some(level.to_string()),
            None => non_blank(ENV_LOG_LEVEL),
        };
        let log_level = match level_text {
            Some(level) => parse_level(&level)?,
            None => default_log_level(),
        };
        let log_dir = non_blank(ENV_LOG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("logs"));

        Ok(Self {
            data_dir,
            log_level,
            log_dir,
            gemini_api_key: non_blank(ENV_GEMINI_API_KEY).map(|key| key.trim().to_string()),
            gemini_api_url: non_blank(ENV_GEMINI_API_URL)
                .unwrap_or_else(|| GEMINI_API_URL.to_string()),
        })
    }

    /// Overrides the data directory; a default log dir follows it.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        let previous_default_logs = self.data_dir.join("logs");
        self.data_dir = data_dir.into();
        if self.log_dir == previous_default_logs {
            self.log_dir = self.data_dir.join("logs");
        }
        self
    }

    /// SQLite file backing the key-value store.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}

fn parse_level(value: &str) -> Result<LogLevel, ConfigError> {
    value
        .parse()
        .map_err(|err: LoggingError| ConfigError::InvalidLogLevel(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{ArenaConfig, ConfigError};
    use crate::logging::LogLevel;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = ArenaConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(".arena"));
        assert_eq!(config.log_dir, PathBuf::from(".arena").join("logs"));
        assert_eq!(config.gemini_api_key, None);
        assert!(config.gemini_api_url.contains("generateContent"));
        assert!(config.db_path().ends_with("arena.sqlite3"));
    }

    #[test]
    fn blank_api_key_counts_as_absent() {
        let config = ArenaConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "   ")])).unwrap();
        assert_eq!(config.gemini_api_key, None);
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let err = ArenaConfig::from_lookup(lookup(&[("ARENA_LOG_LEVEL", "loud")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));
    }

    #[test]
    fn data_dir_override_moves_default_log_dir() {
        let config = ArenaConfig::from_lookup(lookup(&[("ARENA_LOG_LEVEL", "WARNING")]))
            .unwrap()
            .with_data_dir("/tmp/arena");
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/arena/logs"));
    }

    #[test]
    fn level_override_shadows_invalid_environment_level() {
        let env = lookup(&[("ARENA_LOG_LEVEL", "loud")]);
        let config = ArenaConfig::from_lookup_with_level(&env, Some("info")).unwrap();
        assert_eq!(config.log_level, LogLevel::Info);

        let err = ArenaConfig::from_lookup_with_level(&env, Some("shouty")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));
        assert!(ArenaConfig::from_lookup_with_level(&env, None).is_err());
    }
}
