// Parsing HelixQL source with the generated parser.
use test_case::test_case;
use tree_sitter::{Parser, Tree};

fn parse(source: &str) -> Tree {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_helixql::LANGUAGE.into())
        .expect("Error loading Helixql grammar");
    parser.parse(source, None).expect("parser returned no tree")
}

const SCHEMA_AND_QUERIES: &str = r#"// schema
N::User {
    INDEX name: String,
    age: U32 DEFAULT 0,
    created: Date DEFAULT NOW,
}

E::Follows {
    From: User,
    To: User,
    Properties: {
        since: I64,
    }
}

V::Embedding {
    vec: [F64]
}

QUERY getUser(id: ID, name: String) =>
    user <- N<User>(id)::Out<Follows>::WHERE(_::{age}::GT(18))
    users <- N<User>::RANGE(0, 10)
    FOR u IN users {
        x <- u::{name, age: _::{age}}
    }
    DROP N<User>(id)
    RETURN user, { name, ..}, "done", 1.5

QUERY add(name: String, v: [F64]) =>
    a <- AddN<User>({name: name, tags: {x: 1}})
    e <- AddE<Follows>({since: 1})::From(a)::To(b)
    vv <- AddV<Embedding>(v, {k: 1})
    s <- SearchV<Embedding>(v, 10)
    bb <- BatchAddV<Embedding>(rows)
    u <- N<User>::UPDATE({age: 3})
    ok <- EXISTS(N<User>::OutE<Follows>)
    f <- N::WHERE(AND(_::{age}::GT(1), OR(true, false)))
    p <- N::!{age, ..}::|x|{name}::ShortestPath<X>::To(b)
    c <- N::COUNT // trailing comment
    RETURN NONE
"#;

#[test_case(
    "QUERY getUser(id: ID) =>\n    user <- N<User>(id)\n    RETURN user\n",
    "(source (query_def name: (identifier) params: (query_params (param_def name: (identifier) type: (param_type (ID_TYPE)))) body: (query_body (get_stmt variable: (identifier) value: (evaluates_to_anything (traversal (start_node (type_args (identifier_upper)) (id_args (id_arg (identifier)))))))) return: (return_stmt (evaluates_to_anything (identifier)))))"
    ; "lookup by id"
)]
#[test_case(
    "QUERY addUser(name: String) =>\n    user <- AddN<User>({name: name})\n    RETURN user\n",
    "(source (query_def name: (identifier) params: (query_params (param_def name: (identifier) type: (param_type (named_type)))) body: (query_body (get_stmt variable: (identifier) value: (evaluates_to_anything (AddN (identifier_upper) (create_field (new_field key: (identifier) value: (evaluates_to_anything (identifier)))))))) return: (return_stmt (evaluates_to_anything (identifier)))))"
    ; "node insertion"
)]
#[test_case(
    "QUERY total() =>\n    n <- N<User>::COUNT\n    RETURN n\n",
    "(source (query_def name: (identifier) params: (query_params) body: (query_body (get_stmt variable: (identifier) value: (evaluates_to_anything (traversal (start_node (type_args (identifier_upper))) (step (count)))))) return: (return_stmt (evaluates_to_anything (identifier)))))"
    ; "count step"
)]
#[test_case(
    "QUERY drop(id: ID) =>\n    DROP N<User>(id)\n    RETURN NONE\n",
    "(source (query_def name: (identifier) params: (query_params (param_def name: (identifier) type: (param_type (ID_TYPE)))) body: (query_body (drop (traversal (start_node (type_args (identifier_upper)) (id_args (id_arg (identifier))))))) return: (return_stmt (evaluates_to_anything (none)))))"
    ; "drop statement"
)]
#[test_case(
    "N::User {\n    name: String,\n}\n",
    "(source (node_def name: (identifier_upper) body: (node_body (field_defs (field_def name: (identifier) type: (param_type (named_type)))))))"
    ; "node schema"
)]
#[test_case(
    "E::Follows {\n    From: User,\n    To: User,\n}\n",
    "(source (edge_def name: (identifier_upper) body: (edge_body from: (identifier_upper) to: (identifier_upper))))"
    ; "edge schema"
)]
#[test_case(
    "V::Embedding {\n    vec: [F64]\n}\n",
    "(source (vector_def name: (identifier_upper) body: (node_body (field_defs (field_def name: (identifier) type: (param_type (array (param_type (named_type)))))))))"
    ; "vector schema"
)]
#[test_case("", "(source)" ; "empty source")]
#[test_case("// only a comment\n", "(source (comment))" ; "comment only")]
fn parses_to_expected_tree(source: &str, expected: &str) {
    let tree = parse(source);
    let root = tree.root_node();

    assert!(!root.has_error(), "{}", root.to_sexp());
    assert_eq!(root.to_sexp(), expected);
}

#[test]
fn every_construct_parses_cleanly() {
    let tree = parse(SCHEMA_AND_QUERIES);
    let root = tree.root_node();

    assert!(!root.has_error(), "{}", root.to_sexp());
    let kinds: Vec<&str> = {
        let mut cursor = root.walk();
        root.named_children(&mut cursor).map(|node| node.kind()).collect()
    };
    assert_eq!(
        kinds,
        ["comment", "node_def", "edge_def", "vector_def", "query_def", "query_def"]
    );
}

#[test]
fn query_fields_point_at_their_source_text() {
    let source = "QUERY getUser(id: ID) =>\n    user <- N<User>(id)\n    RETURN user\n";
    let tree = parse(source);
    let query = tree.root_node().named_child(0).expect("query_def");
    let text = |field: &str| {
        query
            .child_by_field_name(field)
            .and_then(|node| node.utf8_text(source.as_bytes()).ok())
            .unwrap_or_default()
    };

    assert_eq!(query.kind(), "query_def");
    assert_eq!(text("name"), "getUser");
    assert_eq!(text("params"), "(id: ID)");
    assert_eq!(text("return"), "RETURN user");
    assert!(text("body").starts_with("user <- N<User>(id)"));
}

#[test]
fn incomplete_queries_are_flagged() {
    let tree = parse("QUERY q( => RETURN");
    let root = tree.root_node();

    assert!(root.has_error());
    assert!(root.to_sexp().contains("MISSING"), "{}", root.to_sexp());
}

#[test]
fn reparsing_after_an_edit_keeps_the_tree_valid() {
    let before = "QUERY total() =>\n    n <- N<User>::COUNT\n    RETURN n\n";
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_helixql::LANGUAGE.into())
        .expect("Error loading Helixql grammar");
    let mut tree = parser.parse(before, None).expect("parse");

    let after = before.replace("User", "Person");
    let start = before.find("User").expect("type name");
    tree.edit(&tree_sitter::InputEdit {
        start_byte: start,
        old_end_byte: start + 4,
        new_end_byte: start + 6,
        start_position: tree_sitter::Point::new(1, start - 17),
        old_end_position: tree_sitter::Point::new(1, start - 13),
        new_end_position: tree_sitter::Point::new(1, start - 11),
    });
    let reparsed = parser.parse(&after, Some(&tree)).expect("reparse");

    assert!(!reparsed.root_node().has_error());
    assert_eq!(reparsed.root_node().to_sexp(), tree.root_node().to_sexp());
}
