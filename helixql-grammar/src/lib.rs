//! Tooling for generated HelixQL grammar artifacts.
//!
//! `grammar.json` is the input the parser generator consumes. This crate
//! decodes and validates it, then derives the node-kind and field tables a
//! parser generated from it exposes, so an artifact can be checked before it
//! is compiled or shipped.

mod document;
mod error;
mod grammar;
mod loader;
mod rule;
mod validate;

pub use document::{GrammarDocument, RuleSet};
pub use error::GrammarError;
pub use grammar::{
    Grammar, GrammarSummary, NodeKind, MAX_ARTIFACT_BYTES, MAX_FIELDS, MAX_NODE_KINDS,
};
pub use loader::{
    load_grammar, load_grammar_with_config, resolve_artifact, LoaderConfig, ARTIFACT_CANDIDATES,
};
pub use rule::{Precedence, Rule};
pub use validate::{
    compile_pattern, validate_grammar, ValidationIssue, ValidationReport, ValidationSeverity,
};
