use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use colored::*;
use helixql_core::{CoreConfig, HelixError};
use helixql_grammar::{load_grammar_with_config, Grammar, GrammarError, LoaderConfig};
use tracing::debug;
use tree_sitter::{Language, Parser};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Error loading Helixql grammar: {0}")]
    Load(#[from] GrammarError),
    #[error("Error loading Helixql grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error(transparent)]
    Core(#[from] HelixError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{0} contains syntax errors")]
    Syntax(String),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Where a grammar artifact is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarSource {
    Embedded,
    Path(PathBuf),
}

impl GrammarSource {
    /// An explicit `--grammar` wins over `HELIXQL_GRAMMAR_PATH`.
    pub fn resolve(explicit: Option<&Path>, config: &CoreConfig) -> Self {
        explicit
            .or_else(|| config.grammar_path())
            .map(|path| GrammarSource::Path(path.to_path_buf()))
            .unwrap_or(GrammarSource::Embedded)
    }

    pub fn describe(&self) -> String {
        match self {
            GrammarSource::Embedded => format!("embedded {} grammar", tree_sitter_helixql::NAME),
            GrammarSource::Path(path) => path.display().to_string(),
        }
    }

    pub fn load(&self, config: &CoreConfig) -> Result<Grammar, GrammarError> {
        let loader = LoaderConfig::from(config);
        debug!(source = %self.describe(), limit = loader.max_artifact_bytes, "loading grammar");
        match self {
            GrammarSource::Embedded => Grammar::from_source_with_limit(
                tree_sitter_helixql::GRAMMAR_JSON,
                loader.max_artifact_bytes,
            ),
            GrammarSource::Path(path) => load_grammar_with_config(path, &loader),
        }
    }
}

fn parser() -> Result<Parser, CliError> {
    let mut parser = Parser::new();
    parser.set_language(&Language::new(tree_sitter_helixql::LANGUAGE))?;
    Ok(parser)
}

pub fn check(
    out: &mut impl Write,
    source: &GrammarSource,
    config: &CoreConfig,
    expected_sha256: Option<&str>,
) -> Result<(), CliError> {
    let grammar = source.load(config)?;
    if let Some(expected) = expected_sha256 {
        grammar.verify_checksum(expected)?;
    }

    writeln!(
        out,
        "{} {} ({})",
        "✔ Grammar loaded:".green().bold(),
        grammar.name().bold(),
        source.describe()
    )?;
    writeln!(out, "  Node kinds: {}", grammar.node_kind_count())?;
    writeln!(out, "  Fields: {}", grammar.field_count())?;
    writeln!(out, "  SHA-256: {}", grammar.checksum())?;
    if *source == GrammarSource::Embedded {
        let language = Language::new(tree_sitter_helixql::LANGUAGE);
        Parser::new().set_language(&language)?;
        writeln!(
            out,
            "  Parser: ABI {}, {} states",
            language.abi_version(),
            language.parse_state_count()
        )?;
    }
    for warning in grammar.warnings() {
        writeln!(out, "  {} {}", "warning:".yellow(), warning)?;
    }
    Ok(())
}

pub fn info(
    out: &mut impl Write,
    source: &GrammarSource,
    config: &CoreConfig,
    json: bool,
) -> Result<(), CliError> {
    let summary = source.load(config)?.summary();

    if json {
        serde_json::to_writer_pretty(&mut *out, &summary)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "{}", summary.name.bold())?;
    writeln!(out, "  Start rule: {}", summary.start_rule)?;
    writeln!(out, "  Rules: {}", summary.rule_count)?;
    writeln!(
        out,
        "  Node kinds: {} ({} named, {} anonymous)",
        summary.node_kind_count, summary.named_node_kind_count, summary.anonymous_node_kind_count
    )?;
    writeln!(out, "  Fields: {}", summary.field_count)?;
    writeln!(out, "  Keywords: {}", summary.keyword_count)?;
    writeln!(out, "  Conflicts: {}", summary.conflict_count)?;
    writeln!(out, "  Warnings: {}", summary.warning_count)?;
    writeln!(out, "  SHA-256: {}", summary.checksum)?;
    Ok(())
}

/// Lists the node kinds of the compiled parser with their ids.
pub fn kinds(out: &mut impl Write, named_only: bool) -> Result<(), CliError> {
    let language = Language::new(tree_sitter_helixql::LANGUAGE);
    let count = u16::try_from(language.node_kind_count()).unwrap_or(u16::MAX);

    for id in 0..count {
        let named = language.node_kind_is_named(id);
        if named_only && !named {
            continue;
        }
        let Some(kind) = language.node_kind_for_id(id) else {
            continue;
        };
        let category = if named {
            "named"
        } else if language.node_kind_is_visible(id) {
            "anonymous"
        } else if language.node_kind_is_supertype(id) {
            "supertype"
        } else {
            "hidden"
        };
        writeln!(out, "{id:>4}  {kind:<24} {category}")?;
    }
    Ok(())
}

/// Parses a HelixQL file and prints its syntax tree.
pub fn parse(out: &mut impl Write, path: &Path) -> Result<(), CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let mut parser = parser()?;
    let tree = parser
        .parse(&text, None)
        .ok_or_else(|| CliError::Syntax(path.display().to_string()))?;
    let root = tree.root_node();
    debug!(path = %path.display(), bytes = text.len(), "parsed source");

    writeln!(out, "{}", root.to_sexp())?;
    if root.has_error() {
        return Err(CliError::Syntax(path.display().to_string()));
    }
    Ok(())
}
