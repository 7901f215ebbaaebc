//! Structural checks run on a grammar artifact before it is compiled.
//!
//! Errors block the load. Warnings are reported but the tables are still
//! built, mirroring how the grammar generator treats unused rules.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::document::GrammarDocument;
use crate::rule::Rule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,   // blocks loading
    Warning, // loads, but worth a look
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    /// Path inside the artifact, e.g. `rules.query_def` or `conflicts[1]`.
    pub location: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Outcome of [`validate_grammar`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(ValidationSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(ValidationSeverity::Warning)
    }

    fn with_severity(&self, severity: ValidationSeverity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(move |issue| issue.severity == severity)
    }

    fn push(&mut self, severity: ValidationSeverity, location: impl Into<String>, message: String) {
        self.issues.push(ValidationIssue {
            severity,
            location: location.into(),
            message,
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors: Vec<String> = self.errors().map(ToString::to_string).collect();
        if errors.is_empty() {
            write!(f, "no errors")
        } else {
            write!(f, "{}", errors.join("; "))
        }
    }
}

/// Runs every structural check over `grammar`.
pub fn validate_grammar(grammar: &GrammarDocument) -> ValidationReport {
    let mut validator = GrammarValidator {
        grammar,
        report: ValidationReport::default(),
    };
    validator.run();
    validator.report
}

/// Compiles a generated pattern, translating its flags to inline regex flags.
pub fn compile_pattern(value: &str, flags: Option<&str>) -> Result<Regex, String> {
    let mut inline = String::new();
    for flag in flags.unwrap_or_default().chars() {
        match flag {
            'i' | 's' | 'm' => inline.push(flag),
            // unicode and global/sticky have no effect on a token pattern
            'u' | 'v' | 'g' | 'y' => {}
            other => return Err(format!("unsupported pattern flag `{other}`")),
        }
    }

    let source = if inline.is_empty() {
        value.to_string()
    } else {
        format!("(?{inline}){value}")
    };
    Regex::new(&source).map_err(|err| err.to_string())
}

struct GrammarValidator<'g> {
    grammar: &'g GrammarDocument,
    report: ValidationReport,
}

impl<'g> GrammarValidator<'g> {
    fn run(&mut self) {
        let grammar = self.grammar;
        self.validate_name();

        if grammar.rules.is_empty() {
            self.error("rules", "grammar defines no rules".to_string());
            return;
        }

        if let Some(start) = grammar.start_rule() {
            if grammar.is_hidden(start) {
                self.warning(
                    format!("rules.{start}"),
                    format!("start rule `{start}` is hidden and will not produce a root node"),
                );
            }
        }

        for name in grammar.rules.duplicates() {
            self.error(
                format!("rules.{name}"),
                format!("rule `{name}` is defined more than once"),
            );
        }
        for (name, rule) in grammar.rules.iter() {
            self.validate_rule(rule, &format!("rules.{name}"), false);
        }
        for (index, rule) in grammar.extras.iter().enumerate() {
            self.validate_rule(rule, &format!("extras[{index}]"), false);
        }

        self.validate_references();
        self.validate_conflicts();
        self.validate_reachability();
    }

    fn validate_name(&mut self) {
        let valid = {
            let mut chars = self.grammar.name.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        };
        if !valid {
            self.error(
                "name",
                format!("`{}` is not a valid grammar name", self.grammar.name),
            );
        }
    }

    fn validate_rule(&mut self, rule: &Rule, location: &str, in_token: bool) {
        match rule {
            Rule::Blank => {}
            Rule::String { value } => {
                if value.is_empty() {
                    self.error(location, "string literal is empty".to_string());
                }
            }
            Rule::Pattern { value, flags } => {
                if let Err(message) = compile_pattern(value, flags.as_deref()) {
                    self.error(location, format!("pattern /{value}/ is invalid: {message}"));
                }
            }
            Rule::Symbol { name } => {
                if !self.grammar.defines(name) {
                    self.error(location, format!("undefined symbol `{name}`"));
                } else if in_token && !self.is_lexical_rule(name) {
                    self.error(
                        location,
                        format!("symbol `{name}` cannot be used inside a token"),
                    );
                }
            }
            Rule::Seq { members } | Rule::Choice { members } => {
                if members.is_empty() {
                    let kind = if matches!(rule, Rule::Seq { .. }) { "sequence" } else { "choice" };
                    self.error(location, format!("{kind} has no members"));
                }
                for member in members {
                    self.validate_rule(member, location, in_token);
                }
            }
            Rule::Field { name, content } => {
                if name.is_empty() {
                    self.error(location, "field name is empty".to_string());
                }
                self.validate_rule(content, location, in_token);
            }
            Rule::Alias { value, content, .. } => {
                if value.is_empty() {
                    self.error(location, "alias value is empty".to_string());
                }
                self.validate_rule(content, location, in_token);
            }
            Rule::Token { content } | Rule::ImmediateToken { content } => {
                self.validate_rule(content, location, true);
            }
            Rule::Repeat { content }
            | Rule::Repeat1 { content }
            | Rule::Prec { content, .. }
            | Rule::PrecLeft { content, .. }
            | Rule::PrecRight { content, .. }
            | Rule::PrecDynamic { content, .. } => {
                self.validate_rule(content, location, in_token);
            }
        }
    }

    fn validate_references(&mut self) {
        let grammar = self.grammar;
        if let Some(word) = &grammar.word {
            if !grammar.rules.contains(word) {
                self.error("word", format!("word rule `{word}` is not defined"));
            }
        }

        for (index, name) in grammar.inline.iter().enumerate() {
            if !grammar.rules.contains(name) {
                self.error(
                    format!("inline[{index}]"),
                    format!("inlined rule `{name}` is not defined"),
                );
            }
        }

        for (index, name) in grammar.supertypes.iter().enumerate() {
            if !grammar.rules.contains(name) {
                self.error(
                    format!("supertypes[{index}]"),
                    format!("supertype `{name}` is not defined"),
                );
            }
        }
    }

    fn validate_conflicts(&mut self) {
        let grammar = self.grammar;
        for (index, conflict) in grammar.conflicts.iter().enumerate() {
            let location = format!("conflicts[{index}]");
            match conflict.len() {
                0 => self.error(&location, "conflict set is empty".to_string()),
                1 => self.warning(
                    &location,
                    format!("conflict set only names `{}`", conflict[0]),
                ),
                _ => {}
            }
            for name in conflict {
                if !grammar.rules.contains(name) {
                    self.error(&location, format!("conflicting rule `{name}` is not defined"));
                }
            }
        }
    }

    fn validate_reachability(&mut self) {
        let grammar = self.grammar;
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.extend(grammar.start_rule());
        for extra in &grammar.extras {
            queue.extend(extra.referenced_symbols());
        }

        let mut reached = HashSet::new();
        while let Some(name) = queue.pop_front() {
            if !reached.insert(name) {
                continue;
            }
            if let Some(rule) = grammar.rule(name) {
                queue.extend(rule.referenced_symbols());
            }
        }

        let unreachable: Vec<&str> = grammar
            .rules
            .names()
            .filter(|name| !reached.contains(name))
            .collect();
        for name in unreachable {
            self.warning(
                format!("rules.{name}"),
                format!("rule `{name}` is unreachable from the start rule"),
            );
        }
    }

    fn is_lexical_rule(&self, name: &str) -> bool {
        self.grammar
            .rule(name)
            .map(Rule::is_lexical)
            .unwrap_or(true)
    }

    fn error(&mut self, location: impl Into<String>, message: String) {
        self.report.push(ValidationSeverity::Error, location, message);
    }

    fn warning(&mut self, location: impl Into<String>, message: String) {
        self.report.push(ValidationSeverity::Warning, location, message);
    }
}
