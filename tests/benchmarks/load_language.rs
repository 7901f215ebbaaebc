// Benchmarks for loading the generated language and parsing with it.
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use helixql_grammar::{validate_grammar, Grammar, GrammarDocument};
use tree_sitter::{Language, Parser};

const QUERY: &str = r#"QUERY getUser(id: ID) =>
    user <- N<User>(id)::Out<Follows>::WHERE(_::{age}::GT(18))
    FOR u IN users {
        x <- u::{name, age: _::{age}}
    }
    RETURN user, { name, ..}
"#;

fn load_language_benchmarks(c: &mut Criterion) {
    c.bench_function("language_new", |b| {
        b.iter(|| {
            let language = Language::new(black_box(tree_sitter_helixql::LANGUAGE));
            black_box(language);
        });
    });

    c.bench_function("parser_set_language", |b| {
        let language = Language::new(tree_sitter_helixql::LANGUAGE);
        let mut parser = Parser::new();
        b.iter(|| {
            parser
                .set_language(black_box(&language))
                .expect("Error loading Helixql grammar");
        });
    });

    c.bench_function("parse_query", |b| {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_helixql::LANGUAGE.into())
            .expect("Error loading Helixql grammar");
        b.iter(|| {
            let tree = parser.parse(black_box(QUERY), None).expect("parse");
            black_box(tree);
        });
    });

    c.bench_function("grammar_artifact_load", |b| {
        b.iter(|| {
            let grammar = Grammar::from_source(black_box(tree_sitter_helixql::GRAMMAR_JSON))
                .expect("load artifact");
            black_box(grammar);
        });
    });

    c.bench_function("grammar_validate", |b| {
        let document = GrammarDocument::from_json(tree_sitter_helixql::GRAMMAR_JSON)
            .expect("decode artifact");
        b.iter(|| {
            let report = validate_grammar(black_box(&document));
            black_box(report);
        });
    });
}

criterion_group!(benches, load_language_benchmarks);
criterion_main!(benches);
