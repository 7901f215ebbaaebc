//! This crate provides HelixQL language support for the [tree-sitter][] parsing library.
//!
//! Typically, you will use the [`LANGUAGE`] constant to add this language to a
//! tree-sitter [`Parser`], and then use the parser to parse some code:
//!
//! ```
//! let code = r#"
//! QUERY getUser(id: ID) =>
//!     user <- N<User>(id)
//!     RETURN user
//! "#;
//! let mut parser = tree_sitter::Parser::new();
//! let language = tree_sitter_helixql::LANGUAGE;
//! parser
//!     .set_language(&language.into())
//!     .expect("Error loading Helixql grammar");
//! let tree = parser.parse(code, None).unwrap();
//! assert!(!tree.root_node().has_error());
//! ```
//!
//! [`Parser`]: https://docs.rs/tree-sitter/*/tree_sitter/struct.Parser.html
//! [tree-sitter]: https://tree-sitter.github.io/

use tree_sitter_language::LanguageFn;

extern "C" {
    fn tree_sitter_helixql() -> *const ();
}

/// The tree-sitter [`LanguageFn`] for this grammar.
pub const LANGUAGE: LanguageFn = unsafe { LanguageFn::from_raw(tree_sitter_helixql) };

/// Returns the tree-sitter [`LanguageFn`] for this grammar.
pub fn language() -> LanguageFn {
    LANGUAGE
}

/// The name the grammar is registered under.
pub const NAME: &str = "helixql";

/// The grammar artifact the parser was generated from.
pub const GRAMMAR_JSON: &str = include_str!("../../src/grammar.json");

/// The content of the [`node-types.json`][] file for this grammar.
///
/// [`node-types.json`]: https://tree-sitter.github.io/tree-sitter/using-parsers/6-static-node-types
pub const NODE_TYPES: &str = include_str!("../../src/node-types.json");
