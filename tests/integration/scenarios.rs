//! Scenarios from loading a mod to answering action-discovery queries

use scopedsl_engine::{BlockingSchema, EngineConfig, EvaluationContext, ScopeEngine, resolve_scope};
use scopedsl_foundation::{EntityId, EntitySet, ErrorKind, QualifiedId, Value};
use scopedsl_language::{extract_references, parse_definition};
use scopedsl_storage::World;

fn q(s: &str) -> QualifiedId {
    QualifiedId::parse(s).unwrap()
}

fn ids(items: &[&str]) -> EntitySet {
    items.iter().map(|s| EntityId::from(*s)).collect()
}

fn load(source: &str) -> ScopeEngine {
    let mut engine = ScopeEngine::new();
    let report = engine.load_source("scenario.scope", source);
    assert!(report.is_ok(), "{:?}", report.errors);
    engine
}

#[test]
fn closeness_partners_of_the_actor() {
    let world = World::from_json_str(
        r#"{"entities": {
            "A": {"positioning:closeness": {"partners": ["B", "C"]}},
            "B": {}, "C": {}
        }}"#,
    )
    .unwrap();
    let engine = load("intimacy:close_actors := actor.positioning:closeness.partners");

    let result = engine
        .evaluate(&world, &q("intimacy:close_actors"), &EvaluationContext::new("A"))
        .unwrap();
    assert_eq!(result, ids(&["B", "C"]));
}

#[test]
fn union_of_overlapping_scopes() {
    let engine = load("test:scope := a.x | b.y");
    let context = EvaluationContext::new("A")
        .with_binding("a", Value::map([("x", Value::from(vec!["1", "2"]))]))
        .with_binding("b", Value::map([("y", Value::from(vec!["2", "3"]))]));

    let result = engine
        .evaluate(&World::new(), &q("test:scope"), &context)
        .unwrap();
    assert_eq!(result, ids(&["1", "2", "3"]));
}

#[test]
fn has_filter_over_partners() {
    let world = World::from_json_str(
        r#"{"entities": {
            "A": {"positioning:closeness": {"partners": ["B", "C"]}},
            "B": {"intimacy:attraction": {"level": 2}},
            "C": {}
        }}"#,
    )
    .unwrap();
    let engine = load(
        r#"intimacy:close_actors := actor.positioning:closeness.partners
intimacy:attracted := intimacy:close_actors[{"has": [{"var": "."}, "intimacy:attraction"]}]"#,
    );

    let result = engine
        .evaluate(&world, &q("intimacy:attracted"), &EvaluationContext::new("A"))
        .unwrap();
    assert_eq!(result, ids(&["B"]));
}

#[test]
fn belt_blocks_pants_then_unequip() {
    let equipped = |with_belt: bool| {
        let belt = if with_belt {
            r#""torso_lower": {"accessories": "belt"},"#
        } else {
            ""
        };
        World::from_json_str(&format!(
            r#"{{"entities": {{
                "A": {{"clothing:equipment": {{"equipped": {{{belt} "legs": {{"base": "pants"}}}}}}}},
                "belt": {{
                    "clothing:wearable": {{"layer": "accessories", "equipmentSlots": {{"primary": "torso_lower"}}}},
                    "clothing:blocks_removal": {{"blockedSlots": [{{"slot": "legs", "layers": ["base"], "blockType": "must_remove_first"}}]}}
                }},
                "pants": {{"clothing:wearable": {{"layer": "base", "equipmentSlots": {{"primary": "legs"}}}}}}
            }}}}"#
        ))
        .unwrap()
    };
    let engine = load("clothing:wearables := entities(clothing:wearable)");
    let context = EvaluationContext::new("A");
    let schema = BlockingSchema::default();

    let blocked = resolve_scope(&engine, &equipped(true), &q("clothing:wearables"), &context, &schema)
        .unwrap();
    assert!(!blocked.contains(&EntityId::from("pants")));
    assert!(blocked.contains(&EntityId::from("belt")));

    let unblocked =
        resolve_scope(&engine, &equipped(false), &q("clothing:wearables"), &context, &schema)
            .unwrap();
    assert!(unblocked.contains(&EntityId::from("pants")));
}

#[test]
fn malformed_line_keeps_siblings_and_partial_references() {
    let source = "intimacy:close := actor.positioning:closeness.partners\n\
                  invalid:syntax without assignment but intimacy:kissing reference\n\
                  intimacy:self_only := actor\n";

    let mut engine = ScopeEngine::new();
    let report = engine.load_source("broken.scope", source);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].is_compile_time());
    assert_eq!(report.registered, vec![q("intimacy:close"), q("intimacy:self_only")]);

    let refs = extract_references(source, Some("positioning"));
    assert_eq!(refs.partial.namespaces().collect::<Vec<_>>(), vec!["intimacy"]);
    let kissing = refs.partial.get("intimacy").unwrap();
    assert_eq!(kissing.iter().collect::<Vec<_>>(), vec!["kissing"]);
}

#[test]
fn cycles_fail_instead_of_recursing() {
    let engine = load("a:x := a:y\na:y := a:x");
    let err = engine
        .evaluate(&World::new(), &q("a:x"), &EvaluationContext::new("A"))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::CycleDetected { .. }));
    assert!(err.to_string().contains("a:x -> a:y -> a:x"));
}

#[test]
fn missing_component_is_empty() {
    let world = World::new().spawn("A");
    let engine = load("intimacy:close_actors := actor.positioning:closeness.partners");
    let result = engine
        .evaluate(&world, &q("intimacy:close_actors"), &EvaluationContext::new("A"))
        .unwrap();
    assert!(result.is_empty());
}

#[test]
fn printed_definitions_reload_identically() {
    let source = r#"m:a := actor.components.core:inventory.items[][{"!": [{"has": [{"var": "."}, "m:hidden"]}]}] | "m:extra""#;
    let definition = parse_definition(source).unwrap();

    let mut engine = ScopeEngine::with_config(EngineConfig::new());
    assert!(engine.load_source("printed", &definition.to_string()).is_ok());
    let reloaded = engine.registry().get(&q("m:a")).unwrap();
    assert_eq!(reloaded.expression, definition.expression);
}
