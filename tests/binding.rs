// Binding checks: the generated parser must hand the runtime a loadable language.
use test_case::test_case;
use tree_sitter::{Language, Parser, LANGUAGE_VERSION, MIN_COMPATIBLE_LANGUAGE_VERSION};
use tree_sitter_language::LanguageFn;

const LOAD_FAILURE: &str = "Error loading Helixql grammar";

const QUERY: &str = "QUERY getUser(id: ID) =>\n    user <- N<User>(id)\n    RETURN user\n";

#[test]
fn can_load_grammar() {
    let mut parser = Parser::new();
    parser
        .set_language(&Language::new(tree_sitter_helixql::LANGUAGE))
        .expect(LOAD_FAILURE);
    assert!(parser.language().is_some(), "{LOAD_FAILURE}");
}

#[test]
fn abi_version_is_supported_by_the_runtime() {
    let language = Language::new(tree_sitter_helixql::LANGUAGE);

    assert!(language.abi_version() <= LANGUAGE_VERSION);
    assert!(language.abi_version() >= MIN_COMPATIBLE_LANGUAGE_VERSION);
}

#[test]
fn repeated_loads_agree() {
    let first = Language::new(tree_sitter_helixql::LANGUAGE);
    let mut parser = Parser::new();
    parser.set_language(&first).expect(LOAD_FAILURE);
    let expected = parser.parse(QUERY, None).expect("parse").root_node().to_sexp();

    for _ in 0..5 {
        let again: Language = tree_sitter_helixql::language().into();
        assert_eq!(again.abi_version(), first.abi_version());
        assert_eq!(again.node_kind_count(), first.node_kind_count());
        assert_eq!(again.field_count(), first.field_count());
        assert_eq!(again.parse_state_count(), first.parse_state_count());

        parser.set_language(&again).expect(LOAD_FAILURE);
        let tree = parser.parse(QUERY, None).expect("parse");
        assert_eq!(tree.root_node().to_sexp(), expected);
    }
}

#[test]
fn independent_parsers_share_one_language() {
    let language = Language::new(tree_sitter_helixql::LANGUAGE);
    let mut parsers: Vec<Parser> = (0..3).map(|_| Parser::new()).collect();

    for parser in &mut parsers {
        parser.set_language(&language).expect(LOAD_FAILURE);
    }
    let trees: Vec<String> = parsers
        .iter_mut()
        .map(|parser| parser.parse(QUERY, None).expect("parse").root_node().to_sexp())
        .collect();
    assert!(trees.windows(2).all(|pair| pair[0] == pair[1]));
}

// Stand-ins for a damaged parser table: the runtime reads the ABI version
// from the first word and must refuse the table before touching the rest.
#[repr(C, align(8))]
struct RawTable([u32; 64]);

static ZEROED_TABLE: RawTable = RawTable([0; 64]);

static FUTURE_TABLE: RawTable = RawTable({
    let mut words = [0; 64];
    words[0] = 999;
    words
});

extern "C" fn zeroed_table() -> *const () {
    std::ptr::addr_of!(ZEROED_TABLE).cast()
}

extern "C" fn future_table() -> *const () {
    std::ptr::addr_of!(FUTURE_TABLE).cast()
}

#[test_case(zeroed_table, 0 ; "empty table")]
#[test_case(future_table, 999 ; "unknown abi version")]
fn corrupted_tables_do_not_load(table: extern "C" fn() -> *const (), abi_version: usize) {
    let language = Language::new(unsafe { LanguageFn::from_raw(table) });
    assert_eq!(language.abi_version(), abi_version);

    let mut parser = Parser::new();
    assert!(
        parser.set_language(&language).is_err(),
        "corrupted table unexpectedly loaded"
    );
    assert!(parser.language().is_none());
}

#[test]
fn parser_recovers_after_a_rejected_table() {
    let mut parser = Parser::new();
    let broken = Language::new(unsafe { LanguageFn::from_raw(zeroed_table) });
    assert!(parser.set_language(&broken).is_err());

    parser
        .set_language(&tree_sitter_helixql::LANGUAGE.into())
        .expect(LOAD_FAILURE);
    let tree = parser.parse(QUERY, None).expect("parse");
    assert!(!tree.root_node().has_error());
}
