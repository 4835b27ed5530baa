//! Integration tests for the expression parser and printer

use scopedsl_foundation::{EntityId, ErrorKind, QualifiedId};
use scopedsl_language::{Expression, parse_definition, parse_expression};

fn q(s: &str) -> QualifiedId {
    QualifiedId::parse(s).unwrap()
}

// =============================================================================
// Expressions
// =============================================================================

#[test]
fn component_access_with_fields() {
    let expr = parse_expression("actor.positioning:closeness.partners").unwrap();
    assert_eq!(
        expr,
        Expression::ComponentAccess {
            base_entity_path: vec!["actor".into()],
            component: q("positioning:closeness"),
            field_path: vec!["partners".into()],
        }
    );
}

#[test]
fn explicit_components_segment_is_equivalent() {
    assert_eq!(
        parse_expression("actor.components.core:inventory.items").unwrap(),
        parse_expression("actor.core:inventory.items").unwrap()
    );
}

#[test]
fn nested_component_access_walks_bindings() {
    let expr = parse_expression("target.owner.core:stats.level").unwrap();
    assert!(matches!(
        expr,
        Expression::ComponentAccess { ref base_entity_path, .. } if base_entity_path == &["target", "owner"]
    ));
}

#[test]
fn union_flattens_both_operators() {
    let expr = parse_expression("a:x | b:y + c:z").unwrap();
    let Expression::Union { operands } = expr else {
        panic!("expected union");
    };
    assert_eq!(operands.len(), 3);
}

#[test]
fn iteration_then_filter() {
    let expr =
        parse_expression(r#"actor.core:inventory.items[][{"has": [{"var": "."}, "items:portable"]}]"#)
            .unwrap();
    let Expression::FilteredAccess { base, .. } = expr else {
        panic!("expected filter");
    };
    assert!(matches!(*base, Expression::ArrayIteration { .. }));
}

#[test]
fn sources_and_literals() {
    assert_eq!(
        parse_expression("none").unwrap(),
        Expression::Literal { values: vec![] }
    );
    assert_eq!(
        parse_expression("\"core:player\"").unwrap(),
        Expression::Literal {
            values: vec![EntityId::from("core:player")]
        }
    );
    assert_eq!(
        parse_expression("self").unwrap(),
        Expression::Variable {
            path: vec!["self".into()]
        }
    );
    assert_eq!(
        parse_expression("entities(core:actor)").unwrap(),
        Expression::Entities {
            kind: q("core:actor")
        }
    );
    assert_eq!(
        parse_expression("intimacy:close").unwrap(),
        Expression::ScopeReference {
            key: q("intimacy:close")
        }
    );
}

#[test]
fn malformed_expressions() {
    for source in [
        "",
        "actor.",
        "actor[",
        "actor[][]",
        "a:x.field",
        "actor | ",
        "entities(actor)",
        "actor.components",
        "x[{\"bogus\": []}]",
        "actor actor",
    ] {
        assert!(parse_expression(source).is_err(), "`{source}` should not parse");
    }
}

// =============================================================================
// Definitions
// =============================================================================

#[test]
fn definition_parts() {
    let def = parse_definition("intimacy:close := actor.positioning:closeness.partners").unwrap();
    assert_eq!(def.key, q("intimacy:close"));
    assert_eq!(def.namespace(), "intimacy");
    assert_eq!(def.scope_id(), "close");
    assert_eq!(def.source_line, 1);
}

#[test]
fn definition_without_assignment_reports_position() {
    let err = parse_definition("invalid:syntax without assignment").unwrap_err();
    match err.kind {
        ErrorKind::Syntax { line, message, .. } => {
            assert_eq!(line, 1);
            assert!(message.contains(":="));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unqualified_definition_name_is_rejected() {
    assert!(parse_definition("close := actor").is_err());
}

// =============================================================================
// Printer
// =============================================================================

#[test]
fn printed_expressions_reparse() {
    for source in [
        "actor.positioning:closeness.partners",
        "a:x | b:y | none",
        r#"actor.core:inventory.items[][{"and": [{"has": [{"var": "."}, "a:b"]}, {"!": [{"in": ["x", {"var": "tags"}]}]}]}]"#,
        "entities(core:actor)",
        "\"core:player\"",
        "target.owner.core:stats.level",
    ] {
        let expr = parse_expression(source).unwrap();
        let printed = expr.to_string();
        assert_eq!(parse_expression(&printed).unwrap(), expr, "{source} -> {printed}");
    }
}

#[test]
fn printed_definition() {
    let def = parse_definition("a:x := actor | none").unwrap();
    let reparsed = parse_definition(&def.to_string()).unwrap();
    assert_eq!(reparsed.key, def.key);
    assert_eq!(reparsed.expression, def.expression);
}
