use thiserror::Error;

/// Result type used across the HelixQL core crate.
pub type Result<T> = std::result::Result<T, HelixError>;

/// Canonical error representation shared by the workspace crates.
#[derive(Debug, Error)]
pub enum HelixError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("logging error: {0}")]
    LoggingError(String),
}

/// Dedicated configuration error used by the configuration module.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl From<ConfigError> for HelixError {
    fn from(value: ConfigError) -> Self {
        HelixError::ConfigError(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_fold_into_core_errors() {
        let err: HelixError = ConfigError::InvalidValue {
            key: "HELIXQL_MAX_ARTIFACT_BYTES".into(),
            value: "lots".into(),
        }
        .into();

        assert_eq!(
            err.to_string(),
            "configuration error: invalid value for environment variable HELIXQL_MAX_ARTIFACT_BYTES: lots"
        );
    }
}
