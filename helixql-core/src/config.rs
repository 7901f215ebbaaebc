use std::env;
use std::path::PathBuf;

use crate::errors::{ConfigError, HelixError};

/// Configuration shared by the HelixQL tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub log_level: String,
    /// Artifact to load instead of the embedded grammar.
    pub grammar_path: Option<PathBuf>,
    pub max_artifact_bytes: Option<u64>,
}

impl CoreConfig {
    /// Loads configuration from the process environment (and `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_prefix("HELIXQL_")
    }

    /// Loads configuration from env vars prefixed with the provided value (e.g. `HELIXQL_`).
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(prefix, |key| env::var(key).ok())
    }

    fn from_lookup(
        prefix: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let key = |suffix: &str| format!("{}{}", prefix, suffix);

        let log_level = lookup(&key("LOG"))
            .filter(|level| !level.trim().is_empty())
            .unwrap_or_else(|| "info".to_string());

        let grammar_path = lookup(&key("GRAMMAR_PATH"))
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let limit_key = key("MAX_ARTIFACT_BYTES");
        let max_artifact_bytes = match lookup(&limit_key) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(limit) if limit > 0 => Some(limit),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: limit_key,
                        value: raw,
                    })
                }
            },
            None => None,
        };

        Ok(Self {
            log_level,
            grammar_path,
            max_artifact_bytes,
        })
    }

    pub fn grammar_path(&self) -> Option<&std::path::Path> {
        self.grammar_path.as_deref()
    }
}

/// Loads config and converts failures to the shared error type.
pub fn load_core_config() -> Result<CoreConfig, HelixError> {
    Ok(CoreConfig::from_env()?)
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            grammar_path: None,
            max_artifact_bytes: None,
        }
    }
}
