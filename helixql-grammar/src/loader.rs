use std::fs;
use std::path::{Path, PathBuf};

use helixql_core::CoreConfig;
use tracing::{debug, info};

use crate::error::GrammarError;
use crate::grammar::{Grammar, MAX_ARTIFACT_BYTES};

/// Locations searched, in order, when a grammar directory is given.
pub const ARTIFACT_CANDIDATES: [&str; 2] = ["src/grammar.json", "grammar.json"];

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub max_artifact_bytes: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_artifact_bytes: MAX_ARTIFACT_BYTES,
        }
    }
}

impl From<&CoreConfig> for LoaderConfig {
    fn from(config: &CoreConfig) -> Self {
        Self {
            max_artifact_bytes: config.max_artifact_bytes.unwrap_or(MAX_ARTIFACT_BYTES),
        }
    }
}

/// Loads a grammar from an artifact file or a grammar directory.
pub fn load_grammar(path: impl AsRef<Path>) -> Result<Grammar, GrammarError> {
    load_grammar_with_config(path, &LoaderConfig::default())
}

pub fn load_grammar_with_config(
    path: impl AsRef<Path>,
    config: &LoaderConfig,
) -> Result<Grammar, GrammarError> {
    let artifact = resolve_artifact(path.as_ref())?;
    debug!(path = %artifact.display(), "loading grammar artifact");

    let metadata = fs::metadata(&artifact).map_err(|err| GrammarError::from_io(&artifact, err))?;
    if metadata.len() > config.max_artifact_bytes {
        return Err(GrammarError::ArtifactTooLarge {
            size: metadata.len(),
            limit: config.max_artifact_bytes,
        });
    }

    let raw = fs::read_to_string(&artifact).map_err(|err| GrammarError::from_io(&artifact, err))?;
    let grammar = Grammar::from_source_with_limit(&raw, config.max_artifact_bytes)?;

    info!(
        path = %artifact.display(),
        name = %grammar.name(),
        "grammar artifact loaded"
    );
    Ok(grammar)
}

/// Resolves `path` to the artifact file it designates.
pub fn resolve_artifact(path: &Path) -> Result<PathBuf, GrammarError> {
    if !path.exists() {
        return Err(GrammarError::MissingPath(path.display().to_string()));
    }

    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }

    ARTIFACT_CANDIDATES
        .iter()
        .map(|candidate| path.join(candidate))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| GrammarError::ArtifactNotFound(path.display().to_string()))
}
