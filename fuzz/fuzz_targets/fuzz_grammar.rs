// Fuzz target feeding arbitrary artifacts to the grammar loader.
#![no_main]

use helixql_grammar::{validate_grammar, Grammar, GrammarDocument, MAX_NODE_KINDS};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    match Grammar::from_source(text) {
        Ok(grammar) => {
            assert!(grammar.node_kind_count() <= usize::from(MAX_NODE_KINDS));
            for kind in grammar.node_kinds() {
                if kind.visible {
                    assert!(grammar.node_kind(&kind.name, kind.named).is_some());
                }
            }
            let _ = grammar.summary();
        }
        Err(_) => {
            // exercise the validator on documents that only fail later checks
            if let Ok(document) = GrammarDocument::from_json(text) {
                let _ = validate_grammar(&document);
            }
        }
    }
});
