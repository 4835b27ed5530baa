//! Integration tests for error types

use scopedsl_foundation::{Error, ErrorContext, ErrorKind, QualifiedId, Type};

#[test]
fn syntax_errors_are_compile_time() {
    let err = Error::syntax("expected `:=`", 2, 5, "invalid:syntax");
    assert!(err.is_compile_time());
    assert_eq!(err.line(), Some(2));
    assert!(err.to_string().contains("2:5"));

    let pred = Error::predicate_syntax("unknown operator `xor`", r#"{"xor": []}"#);
    assert!(pred.is_compile_time());
    assert!(pred.to_string().contains("xor"));
}

#[test]
fn runtime_errors_are_not_compile_time() {
    let unknown = Error::unknown_reference(QualifiedId::new("a", "missing"));
    assert!(!unknown.is_compile_time());
    assert!(unknown.to_string().contains("a:missing"));

    let ty = Error::predicate_type("<", Type::String, Type::Int);
    assert_eq!(ty.to_string(), "cannot apply `<` to string and int");
}

#[test]
fn cycle_error_lists_chain() {
    let err = Error::cycle(vec![
        QualifiedId::new("a", "x"),
        QualifiedId::new("b", "y"),
        QualifiedId::new("a", "x"),
    ]);
    assert!(err.to_string().contains("a:x -> b:y -> a:x"));
    match err.kind {
        ErrorKind::CycleDetected { chain } => assert_eq!(chain.len(), 3),
        other => panic!("unexpected kind: {other:?}"),
    }
}

#[test]
fn context_supplies_line_for_other_errors() {
    let err = Error::duplicate(QualifiedId::new("a", "x"))
        .with_context(ErrorContext::new().with_source("a.scope").with_position(7, 1));
    assert_eq!(err.line(), Some(7));
}

#[test]
fn context_display() {
    let context = ErrorContext::new()
        .with_source("mods/a.scope")
        .with_position(3, 4)
        .with_frame("a:outer")
        .with_frame("a:inner");
    let text = context.to_string();
    assert!(text.starts_with("at mods/a.scope:3:4"));
    assert!(text.contains("in a:outer"));
    assert!(text.contains("in a:inner"));
}

#[test]
fn errors_are_std_errors() {
    fn takes_std_error(_: &dyn std::error::Error) {}
    takes_std_error(&Error::internal("boom"));
}
