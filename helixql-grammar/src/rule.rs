use serde::{Deserialize, Serialize};

/// A single node of a generated grammar rule tree.
///
/// Mirrors the `type`-tagged objects emitted by the grammar generator into
/// `grammar.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rule {
    Blank,
    String {
        value: String,
    },
    Pattern {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flags: Option<String>,
    },
    Symbol {
        name: String,
    },
    Seq {
        members: Vec<Rule>,
    },
    Choice {
        members: Vec<Rule>,
    },
    Repeat {
        content: Box<Rule>,
    },
    Repeat1 {
        content: Box<Rule>,
    },
    Field {
        name: String,
        content: Box<Rule>,
    },
    Alias {
        content: Box<Rule>,
        named: bool,
        value: String,
    },
    Token {
        content: Box<Rule>,
    },
    ImmediateToken {
        content: Box<Rule>,
    },
    Prec {
        value: Precedence,
        content: Box<Rule>,
    },
    PrecLeft {
        value: Precedence,
        content: Box<Rule>,
    },
    PrecRight {
        value: Precedence,
        content: Box<Rule>,
    },
    PrecDynamic {
        value: Precedence,
        content: Box<Rule>,
    },
}

/// Precedence attached to a `PREC*` rule: either a number or a named level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Precedence {
    Integer(i64),
    Name(String),
}

impl Rule {
    /// Returns the rule with precedence wrappers peeled off.
    pub fn unwrap_precedence(&self) -> &Rule {
        let mut current = self;
        while let Rule::Prec { content, .. }
        | Rule::PrecLeft { content, .. }
        | Rule::PrecRight { content, .. }
        | Rule::PrecDynamic { content, .. } = current
        {
            current = &**content;
        }
        current
    }

    /// Whether the rule describes a single token and never a tree of children.
    pub fn is_lexical(&self) -> bool {
        matches!(
            self.unwrap_precedence(),
            Rule::String { .. }
                | Rule::Pattern { .. }
                | Rule::Token { .. }
                | Rule::ImmediateToken { .. }
        )
    }

    /// Direct children of this rule, in document order.
    pub fn children(&self) -> &[Rule] {
        match self {
            Rule::Seq { members } | Rule::Choice { members } => members,
            Rule::Repeat { content }
            | Rule::Repeat1 { content }
            | Rule::Field { content, .. }
            | Rule::Alias { content, .. }
            | Rule::Token { content }
            | Rule::ImmediateToken { content }
            | Rule::Prec { content, .. }
            | Rule::PrecLeft { content, .. }
            | Rule::PrecRight { content, .. }
            | Rule::PrecDynamic { content, .. } => std::slice::from_ref(&**content),
            Rule::Blank | Rule::String { .. } | Rule::Pattern { .. } | Rule::Symbol { .. } => &[],
        }
    }

    /// Visits this rule and every nested rule depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Rule)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Names of every symbol referenced below this rule.
    pub fn referenced_symbols(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.walk(&mut |rule| {
            if let Rule::Symbol { name } = rule {
                names.push(name.as_str());
            }
        });
        names
    }
}
