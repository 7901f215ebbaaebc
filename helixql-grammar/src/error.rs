use std::path::PathBuf;

use thiserror::Error;

use crate::validate::ValidationReport;

/// Errors returned while loading a grammar artifact.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("grammar artifact is empty")]
    EmptyArtifact,
    #[error("grammar artifact is {size} bytes, limit is {limit}")]
    ArtifactTooLarge { size: u64, limit: u64 },
    #[error("grammar artifact is malformed: {message}")]
    Malformed { message: String },
    #[error("duplicate rule definition: {name}")]
    DuplicateRule { name: String },
    #[error("grammar failed validation: {0}")]
    Invalid(ValidationReport),
    #[error("grammar declares {count} node kinds, a parser can number at most {limit}")]
    TooManyNodeKinds { count: usize, limit: u16 },
    #[error("grammar declares {count} field names, a parser can number at most {limit}")]
    TooManyFields { count: usize, limit: u16 },
    #[error("grammar path does not exist: {0}")]
    MissingPath(String),
    #[error("no grammar artifact found under {0}")]
    ArtifactNotFound(String),
    #[error("failed to read grammar from {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("checksum mismatch: expected {expected}, found {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

impl GrammarError {
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GrammarError::Io {
            path: path.into().display().to_string(),
            source,
        }
    }

    /// Validation report, when the artifact parsed but was rejected.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            GrammarError::Invalid(report) => Some(report),
            _ => None,
        }
    }
}
