//! Integration tests for the lexer

use scopedsl_foundation::QualifiedId;
use scopedsl_language::{Lexer, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::tokenize_all(source)
        .into_iter()
        .map(|t| t.kind)
        .filter(|k| !k.is_trivia())
        .collect()
}

#[test]
fn lex_definition() {
    assert_eq!(
        kinds("a:close := actor.positioning:closeness.partners"),
        vec![
            TokenKind::Qualified(QualifiedId::new("a", "close")),
            TokenKind::Assign,
            TokenKind::Ident("actor".into()),
            TokenKind::Dot,
            TokenKind::Qualified(QualifiedId::new("positioning", "closeness")),
            TokenKind::Dot,
            TokenKind::Ident("partners".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn union_operators_inside_filters_stay_in_json() {
    let tokens = kinds(r#"x[{"in": ["a|b+c", {"var": "."}]}] | y"#);
    assert_eq!(tokens.iter().filter(|k| k.is_union_operator()).count(), 1);
    assert!(tokens
        .iter()
        .any(|k| matches!(k, TokenKind::Json(text) if text.contains("a|b+c"))));
}

#[test]
fn braces_inside_json_strings_do_not_close_filter() {
    let tokens = kinds(r#"x[{"==": ["}", {"var": "."}]}]"#);
    assert!(matches!(&tokens[2], TokenKind::Json(text) if text.ends_with("]}")));
    assert_eq!(tokens[3], TokenKind::RBracket);
}

#[test]
fn spans_track_lines_and_columns() {
    let tokens = Lexer::tokenize_all("a:x :=\n  actor");
    let actor = tokens
        .iter()
        .find(|t| t.kind == TokenKind::Ident("actor".into()))
        .unwrap();
    assert_eq!(actor.span.line, 2);
    assert_eq!(actor.span.column, 3);
    assert_eq!(actor.text("a:x :=\n  actor"), "actor");
}

#[test]
fn errors_are_tokens_not_panics() {
    let tokens = kinds("a:x := \"open");
    assert!(tokens.iter().any(|k| matches!(k, TokenKind::Error(_))));
    let tokens = kinds("x[{\"has\": ");
    assert!(tokens.iter().any(|k| matches!(k, TokenKind::Error(_))));
    let tokens = kinds("@");
    assert!(matches!(tokens[0], TokenKind::Error(_)));
}
