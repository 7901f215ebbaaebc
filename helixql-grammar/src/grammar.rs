use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::document::GrammarDocument;
use crate::error::GrammarError;
use crate::rule::Rule;
use crate::validate::{validate_grammar, ValidationIssue};

/// Upper bound on the size of an artifact accepted by [`Grammar::from_source`].
pub const MAX_ARTIFACT_BYTES: u64 = 16 * 1024 * 1024;

/// Largest node-kind table a generated parser can number.
///
/// Kind ids are `u16` and the two highest values belong to error nodes.
pub const MAX_NODE_KINDS: u16 = u16::MAX - 1;

/// Largest field table a generated parser can number. Field ids start at 1.
pub const MAX_FIELDS: u16 = u16::MAX;

const END_KIND: &str = "end";

/// One entry of a grammar's node-kind table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeKind {
    pub name: String,
    pub named: bool,
    pub visible: bool,
    /// Lexed as a single token rather than built from children.
    pub lexical: bool,
    pub extra: bool,
    pub supertype: bool,
    /// Field names that may appear on nodes of this kind, sorted.
    pub fields: Vec<String>,
}

impl NodeKind {
    fn token(name: impl Into<String>, named: bool, visible: bool) -> Self {
        Self {
            name: name.into(),
            named,
            visible,
            lexical: true,
            extra: false,
            supertype: false,
            fields: Vec::new(),
        }
    }
}

struct GrammarInner {
    name: String,
    start_rule: String,
    checksum: String,
    node_kinds: Vec<NodeKind>,
    field_names: Vec<String>,
    keywords: Vec<String>,
    conflicts: Vec<Vec<String>>,
    warnings: Vec<ValidationIssue>,
    document: GrammarDocument,
}

/// Loaded, validated grammar artifact.
///
/// Holds the node kinds and fields a parser generated from the artifact will
/// expose, in declaration order. Cloning is cheap; clones share the tables.
#[derive(Clone)]
pub struct Grammar(Arc<GrammarInner>);

/// Counts describing a loaded grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrammarSummary {
    pub name: String,
    pub start_rule: String,
    pub checksum: String,
    pub rule_count: usize,
    pub node_kind_count: usize,
    pub named_node_kind_count: usize,
    pub anonymous_node_kind_count: usize,
    pub field_count: usize,
    pub keyword_count: usize,
    pub conflict_count: usize,
    pub warning_count: usize,
}

impl Grammar {
    pub fn from_source(raw: &str) -> Result<Self, GrammarError> {
        Self::from_source_with_limit(raw, MAX_ARTIFACT_BYTES)
    }

    /// Loads an artifact no larger than `limit` bytes.
    ///
    /// Checks run in a fixed order: blank input, size, JSON decoding,
    /// validation, then table construction.
    pub fn from_source_with_limit(raw: &str, limit: u64) -> Result<Self, GrammarError> {
        if raw.trim().is_empty() {
            return Err(GrammarError::EmptyArtifact);
        }
        let size = u64::try_from(raw.len()).unwrap_or(u64::MAX);
        if size > limit {
            return Err(GrammarError::ArtifactTooLarge { size, limit });
        }

        let document = GrammarDocument::from_json(raw)?;
        let report = validate_grammar(&document);
        if !report.is_valid() {
            return Err(GrammarError::Invalid(report));
        }

        for issue in report.warnings() {
            debug!(location = %issue.location, "grammar warning: {}", issue.message);
        }

        let checksum = hex::encode(Sha256::digest(raw.as_bytes()));
        let warnings = report.warnings().cloned().collect();
        let grammar = TableBuilder::new(&document).build(checksum, warnings)?;

        debug!(
            name = %grammar.name(),
            node_kinds = grammar.node_kind_count(),
            fields = grammar.field_count(),
            "grammar loaded"
        );
        Ok(grammar)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn start_rule(&self) -> &str {
        &self.0.start_rule
    }

    /// SHA-256 of the artifact text, hex encoded.
    pub fn checksum(&self) -> &str {
        &self.0.checksum
    }

    /// Fails with [`GrammarError::ChecksumMismatch`] unless the artifact hash
    /// equals `expected` (case-insensitive hex).
    pub fn verify_checksum(&self, expected: &str) -> Result<(), GrammarError> {
        if self.0.checksum.eq_ignore_ascii_case(expected.trim()) {
            Ok(())
        } else {
            Err(GrammarError::ChecksumMismatch {
                expected: expected.trim().to_ascii_lowercase(),
                actual: self.0.checksum.clone(),
            })
        }
    }

    pub fn document(&self) -> &GrammarDocument {
        &self.0.document
    }

    pub fn warnings(&self) -> &[ValidationIssue] {
        &self.0.warnings
    }

    /// Every node kind, starting with the `end` marker.
    pub fn node_kinds(&self) -> &[NodeKind] {
        &self.0.node_kinds
    }

    pub fn node_kind_count(&self) -> usize {
        self.0.node_kinds.len()
    }

    /// The visible node kind called `name`. Hidden rules are never returned.
    pub fn node_kind(&self, name: &str, named: bool) -> Option<&NodeKind> {
        self.0
            .node_kinds
            .iter()
            .find(|kind| kind.visible && kind.named == named && kind.name == name)
    }

    /// Field names, sorted. A parser numbers them from 1 in this order.
    pub fn field_names(&self) -> &[String] {
        &self.0.field_names
    }

    pub fn field_count(&self) -> usize {
        self.0.field_names.len()
    }

    /// Word-like anonymous tokens, sorted.
    pub fn keywords(&self) -> &[String] {
        &self.0.keywords
    }

    /// Declared conflict sets, by rule name.
    pub fn conflicts(&self) -> &[Vec<String>] {
        &self.0.conflicts
    }

    pub fn summary(&self) -> GrammarSummary {
        let visible = self.0.node_kinds.iter().filter(|kind| kind.visible);
        let (named, anonymous): (Vec<_>, Vec<_>) = visible.partition(|kind| kind.named);

        GrammarSummary {
            name: self.0.name.clone(),
            start_rule: self.0.start_rule.clone(),
            checksum: self.0.checksum.clone(),
            rule_count: self.0.document.rules.len(),
            node_kind_count: self.node_kind_count(),
            named_node_kind_count: named.len(),
            anonymous_node_kind_count: anonymous.len(),
            field_count: self.field_count(),
            keyword_count: self.0.keywords.len(),
            conflict_count: self.0.conflicts.len(),
            warning_count: self.0.warnings.len(),
        }
    }
}

impl PartialEq for Grammar {
    fn eq(&self, other: &Self) -> bool {
        self.0.name == other.0.name && self.0.checksum == other.0.checksum
    }
}

impl Eq for Grammar {}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("name", &self.0.name)
            .field("checksum", &self.0.checksum)
            .field("node_kinds", &self.0.node_kinds.len())
            .field("fields", &self.0.field_names.len())
            .finish()
    }
}

/// Builds the node-kind and field tables of a validated document.
struct TableBuilder<'g> {
    document: &'g GrammarDocument,
    /// How often each literal is spelled outside a token.
    literal_uses: HashMap<&'g str, usize>,
    node_kinds: Vec<NodeKind>,
}

impl<'g> TableBuilder<'g> {
    fn new(document: &'g GrammarDocument) -> Self {
        let mut literal_uses = HashMap::new();
        let rules = document
            .rules
            .iter()
            .map(|(_, rule)| rule)
            .chain(document.extras.iter());
        for rule in rules {
            count_literals(rule, &mut literal_uses);
        }

        Self {
            document,
            literal_uses,
            node_kinds: vec![NodeKind::token(END_KIND, false, false)],
        }
    }

    fn build(
        mut self,
        checksum: String,
        warnings: Vec<ValidationIssue>,
    ) -> Result<Grammar, GrammarError> {
        let document = self.document;
        let (literals, named_aliases) = self.collect_literals();
        for literal in &literals {
            self.node_kinds.push(NodeKind::token(literal.clone(), false, true));
        }

        let extras: HashSet<&str> = document
            .extras
            .iter()
            .filter_map(|rule| match rule {
                Rule::Symbol { name } => Some(name.as_str()),
                _ => None,
            })
            .collect();

        for (name, rule) in document.rules.iter() {
            let fields = self.fields_of(rule).into_iter().map(str::to_string).collect();
            let lexical = self.is_token_rule(rule);
            self.node_kinds.push(NodeKind {
                name: name.to_string(),
                named: true,
                visible: !document.is_hidden(name),
                lexical,
                extra: extras.contains(name),
                supertype: document.supertypes.iter().any(|s| s == name),
                fields,
            });
        }

        for external in document.external_names() {
            if !document.rules.contains(external) {
                let visible = !external.starts_with('_');
                self.node_kinds.push(NodeKind::token(external, true, visible));
            }
        }

        for alias in named_aliases {
            if !document.rules.contains(&alias) {
                let mut kind = NodeKind::token(alias, true, true);
                kind.lexical = false;
                self.node_kinds.push(kind);
            }
        }

        let kind_count = self.node_kinds.len();
        match u16::try_from(kind_count) {
            Ok(count) if count <= MAX_NODE_KINDS => {}
            _ => {
                return Err(GrammarError::TooManyNodeKinds {
                    count: kind_count,
                    limit: MAX_NODE_KINDS,
                })
            }
        }

        let field_names = self.collect_field_names();
        u16::try_from(field_names.len()).map_err(|_| GrammarError::TooManyFields {
            count: field_names.len(),
            limit: MAX_FIELDS,
        })?;

        let keywords: BTreeSet<String> = literals
            .into_iter()
            .filter(|literal| is_word(literal))
            .collect();

        let conflicts = document
            .conflicts
            .iter()
            .map(|set| {
                set.iter()
                    .filter(|name| document.rules.contains(name))
                    .cloned()
                    .collect()
            })
            .collect();

        Ok(Grammar(Arc::new(GrammarInner {
            name: document.name.clone(),
            start_rule: document.start_rule().unwrap_or_default().to_string(),
            checksum,
            node_kinds: self.node_kinds,
            field_names,
            keywords: keywords.into_iter().collect(),
            conflicts,
            warnings,
            document: document.clone(),
        })))
    }

    /// Whether `rule` is lexed as one named token.
    ///
    /// A bare string only qualifies when no other rule spells the same
    /// literal; a shared literal stays an anonymous token under its rule.
    fn is_token_rule(&self, rule: &Rule) -> bool {
        match rule.unwrap_precedence() {
            Rule::Pattern { .. } | Rule::Token { .. } | Rule::ImmediateToken { .. } => true,
            Rule::String { value } => {
                self.literal_uses.get(value.as_str()).copied().unwrap_or(0) <= 1
            }
            _ => false,
        }
    }

    /// Anonymous literals and named aliases, deduplicated in first-seen order.
    ///
    /// Strings inside tokens and the bodies of token rules are part of a
    /// larger token and do not become node kinds of their own.
    fn collect_literals(&self) -> (Vec<String>, Vec<String>) {
        let mut literals = Vec::new();
        let mut named_aliases = Vec::new();

        let rules = self
            .document
            .rules
            .iter()
            .filter(|(_, rule)| !self.is_token_rule(rule))
            .map(|(_, rule)| rule)
            .chain(self.document.extras.iter());
        for rule in rules {
            collect_rule_literals(rule, &mut literals, &mut named_aliases);
        }

        (literals, named_aliases)
    }

    fn collect_field_names(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        let rules = self
            .document
            .rules
            .iter()
            .map(|(_, rule)| rule)
            .chain(self.document.extras.iter());
        for rule in rules {
            rule.walk(&mut |node| {
                if let Rule::Field { name, .. } = node {
                    names.insert(name.clone());
                }
            });
        }
        names.into_iter().collect()
    }

    /// Field names declared by `rule`, looking through hidden rules.
    fn fields_of(&self, rule: &'g Rule) -> BTreeSet<&'g str> {
        let document = self.document;
        let mut fields = BTreeSet::new();
        let mut visited = HashSet::new();
        let mut pending = vec![rule];

        while let Some(current) = pending.pop() {
            current.walk(&mut |node| match node {
                Rule::Field { name, .. } => {
                    fields.insert(name.as_str());
                }
                Rule::Symbol { name } if document.is_hidden(name) => {
                    if visited.insert(name.as_str()) {
                        if let Some(hidden) = document.rule(name) {
                            pending.push(hidden);
                        }
                    }
                }
                _ => {}
            });
        }

        fields
    }
}

fn count_literals<'g>(rule: &'g Rule, uses: &mut HashMap<&'g str, usize>) {
    match rule {
        Rule::String { value } => *uses.entry(value.as_str()).or_default() += 1,
        Rule::Token { .. } | Rule::ImmediateToken { .. } => {}
        other => {
            for child in other.children() {
                count_literals(child, uses);
            }
        }
    }
}

fn collect_rule_literals(rule: &Rule, literals: &mut Vec<String>, named_aliases: &mut Vec<String>) {
    match rule {
        Rule::String { value } => push_unique(literals, value),
        Rule::Token { .. } | Rule::ImmediateToken { .. } => {}
        Rule::Alias { value, named, content } => {
            if *named {
                push_unique(named_aliases, value);
            } else {
                push_unique(literals, value);
            }
            collect_rule_literals(content, literals, named_aliases);
        }
        other => {
            for child in other.children() {
                collect_rule_literals(child, literals, named_aliases);
            }
        }
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|existing| existing == value) {
        values.push(value.to_string());
    }
}

fn is_word(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
