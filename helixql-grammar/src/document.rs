use std::fmt;

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GrammarError;
use crate::rule::Rule;

/// Generated grammar artifact (`grammar.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    pub rules: RuleSet,
    #[serde(default)]
    pub extras: Vec<Rule>,
    #[serde(default)]
    pub conflicts: Vec<Vec<String>>,
    #[serde(default)]
    pub precedences: Vec<serde_json::Value>,
    #[serde(default)]
    pub externals: Vec<Rule>,
    #[serde(default)]
    pub inline: Vec<String>,
    #[serde(default)]
    pub supertypes: Vec<String>,
}

impl GrammarDocument {
    /// Parses an artifact, rejecting documents that repeat a rule name.
    pub fn from_json(raw: &str) -> Result<Self, GrammarError> {
        let document: Self = serde_json::from_str(raw).map_err(|err| GrammarError::Malformed {
            message: err.to_string(),
        })?;
        if let Some(name) = document.rules.duplicates().next() {
            return Err(GrammarError::DuplicateRule {
                name: name.to_string(),
            });
        }
        Ok(document)
    }

    /// The first rule of the document.
    pub fn start_rule(&self) -> Option<&str> {
        self.rules.names().next()
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Names of externally scanned tokens.
    pub fn external_names(&self) -> Vec<&str> {
        self.externals
            .iter()
            .filter_map(|rule| match rule {
                Rule::Symbol { name } => Some(name.as_str()),
                Rule::String { value } => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether `name` is a rule or an external token.
    pub fn defines(&self, name: &str) -> bool {
        self.rules.contains(name) || self.external_names().contains(&name)
    }

    /// Hidden rules are not surfaced as nodes of their own.
    pub fn is_hidden(&self, name: &str) -> bool {
        name.starts_with('_') || self.inline.iter().any(|inlined| inlined == name)
    }
}

/// Rule definitions in document order.
///
/// The first entry is the start rule, so order is significant and must
/// survive deserialization. A repeated name keeps its first definition and
/// is recorded in [`RuleSet::duplicates`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    entries: IndexMap<String, Rule>,
    duplicates: Vec<String>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule. Returns `false` and leaves the set untouched if the
    /// name is already taken.
    pub fn insert(&mut self, name: impl Into<String>, rule: Rule) -> bool {
        match self.entries.entry(name.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(rule);
                true
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.entries.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names that were defined more than once in the decoded document.
    pub fn duplicates(&self) -> impl Iterator<Item = &str> {
        self.duplicates.iter().map(String::as_str)
    }
}

impl Serialize for RuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RuleSetVisitor)
    }
}

struct RuleSetVisitor;

impl<'de> Visitor<'de> for RuleSetVisitor {
    type Value = RuleSet;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of rule names to rule definitions")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut rules = RuleSet {
            entries: IndexMap::with_capacity(access.size_hint().unwrap_or(0)),
            duplicates: Vec::new(),
        };
        while let Some((name, rule)) = access.next_entry::<String, Rule>()? {
            if rules.contains(&name) {
                rules.duplicates.push(name);
            } else {
                rules.entries.insert(name, rule);
            }
        }
        Ok(rules)
    }
}
