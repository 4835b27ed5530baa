//! Expression evaluation against world snapshots

use scopedsl_engine::{EngineConfig, EvaluationContext};
use scopedsl_foundation::{ErrorKind, QualifiedId, Value};
use scopedsl_storage::World;

use crate::{engine_with, ids, world};

fn q(s: &str) -> QualifiedId {
    QualifiedId::parse(s).unwrap()
}

fn town() -> World {
    world(
        r#"{"entities": {
            "player:1": {
                "positioning:closeness": {"partners": ["npc:a", "npc:b"]},
                "core:location": {"room": "room:hall"},
                "core:inventory": {"items": ["item:cup", "item:key"], "slots": {"head": "item:hat", "hand": null}}
            },
            "room:hall": {"core:room": {"occupants": ["npc:a", "npc:c", "player:1"]}},
            "npc:a": {"core:actor": {}},
            "npc:b": {"core:actor": {}},
            "npc:c": {"core:actor": {}}
        }}"#,
    )
}

fn ctx() -> EvaluationContext {
    EvaluationContext::new("player:1")
}

#[test]
fn closeness_partners() {
    let engine = engine_with(
        EngineConfig::new(),
        "intimacy:close := actor.positioning:closeness.partners",
    );
    let result = engine.evaluate(&town(), &q("intimacy:close"), &ctx()).unwrap();
    assert_eq!(result, ids(&["npc:a", "npc:b"]));
}

#[test]
fn union_deduplicates() {
    let engine = engine_with(
        EngineConfig::new(),
        r#"test:a := "e:1" | "e:2"
test:b := "e:2" + "e:3"
test:all := test:a | test:b"#,
    );
    let result = engine.evaluate(&World::new(), &q("test:all"), &ctx()).unwrap();
    assert_eq!(result, ids(&["e:1", "e:2", "e:3"]));
}

#[test]
fn actor_self_and_none() {
    let engine = engine_with(EngineConfig::new(), "");
    let world = town();
    assert_eq!(engine.query(&world, "actor", &ctx()).unwrap(), ids(&["player:1"]));
    assert_eq!(engine.query(&world, "self", &ctx()).unwrap(), ids(&["player:1"]));
    assert!(engine.query(&world, "none", &ctx()).unwrap().is_empty());
}

#[test]
fn entities_of_kind() {
    let engine = engine_with(EngineConfig::new(), "");
    let result = engine.query(&town(), "entities(core:actor)", &ctx()).unwrap();
    assert_eq!(result, ids(&["npc:a", "npc:b", "npc:c"]));
}

#[test]
fn access_through_a_bound_entity() {
    let engine = engine_with(EngineConfig::new(), "");
    let context = ctx().with_binding("here", Value::from("room:hall"));
    let result = engine
        .query(&town(), "here.core:room.occupants", &context)
        .unwrap();
    assert_eq!(result, ids(&["npc:a", "npc:c", "player:1"]));
}

#[test]
fn iteration_spreads_lists_and_map_values() {
    let engine = engine_with(EngineConfig::new(), "");
    let world = town();
    assert_eq!(
        engine.query(&world, "actor.core:inventory.items[]", &ctx()).unwrap(),
        ids(&["item:cup", "item:key"])
    );
    // Nil slots are not candidates.
    assert_eq!(
        engine.query(&world, "actor.core:inventory.slots[]", &ctx()).unwrap(),
        ids(&["item:hat"])
    );
}

#[test]
fn missing_data_is_empty_not_an_error() {
    let engine = engine_with(EngineConfig::new(), "");
    let world = town();
    for source in [
        "actor.core:missing.field",
        "actor.positioning:closeness.nothing",
        "target.core:room.occupants",
    ] {
        assert!(engine.query(&world, source, &ctx()).unwrap().is_empty(), "{source}");
    }
}

#[test]
fn evaluating_an_unknown_root_scope_is_an_error() {
    for config in [EngineConfig::new(), EngineConfig::tooling()] {
        let engine = engine_with(config, "");
        let err = engine.evaluate(&town(), &q("mod:missing"), &ctx()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnknownScopeReference(ref key) if key == &q("mod:missing")));
    }
}

#[test]
fn unknown_nested_reference_depends_on_strictness() {
    let source = "test:outer := actor | other:missing";

    let strict = engine_with(EngineConfig::new(), source);
    let err = strict.evaluate(&town(), &q("test:outer"), &ctx()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownScopeReference(_)));
    assert_eq!(err.context.unwrap().stack, vec!["test:outer".to_string()]);

    let lenient = engine_with(EngineConfig::tooling(), source);
    assert_eq!(
        lenient.evaluate(&town(), &q("test:outer"), &ctx()).unwrap(),
        ids(&["player:1"])
    );
}

#[test]
fn cycles_are_detected_with_their_chain() {
    let engine = engine_with(
        EngineConfig::new(),
        "test:a := test:b\ntest:b := test:c | actor\ntest:c := test:a",
    );
    let err = engine.evaluate(&town(), &q("test:a"), &ctx()).unwrap_err();
    match err.kind {
        ErrorKind::CycleDetected { chain } => {
            let names: Vec<String> = chain.iter().map(ToString::to_string).collect();
            assert_eq!(names, vec!["test:a", "test:b", "test:c", "test:a"]);
        }
        other => panic!("expected cycle, got {other:?}"),
    }
}

#[test]
fn self_reference_is_a_cycle() {
    let engine = engine_with(EngineConfig::new(), "test:loop := actor | test:loop");
    let err = engine.evaluate(&town(), &q("test:loop"), &ctx()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::CycleDetected { ref chain } if chain.len() == 2));
}

#[test]
fn shared_references_are_not_cycles() {
    let engine = engine_with(
        EngineConfig::new(),
        "test:base := actor\ntest:left := test:base\ntest:both := test:left | test:base",
    );
    assert_eq!(
        engine.evaluate(&town(), &q("test:both"), &ctx()).unwrap(),
        ids(&["player:1"])
    );
}

#[test]
fn evaluation_does_not_change_the_world() {
    let engine = engine_with(
        EngineConfig::new(),
        "test:close := actor.positioning:closeness.partners",
    );
    let world = town();
    let before = world.clone();
    let first = engine.evaluate(&world, &q("test:close"), &ctx()).unwrap();
    let second = engine.evaluate(&world, &q("test:close"), &ctx()).unwrap();
    assert_eq!(first, second);
    assert_eq!(world.entity_count(), before.entity_count());
}

#[test]
fn discovery_swallows_errors() {
    let engine = engine_with(EngineConfig::new(), "test:broken := other:missing");
    assert!(engine.discover(&town(), &q("test:broken"), &ctx()).is_none());
    assert!(engine.discover(&town(), &q("test:nope"), &ctx()).is_none());
}

#[test]
fn list_index_segments() {
    let engine = engine_with(
        EngineConfig::new(),
        "inventory:first := actor.core:inventory.items.0",
    );
    let world = town();
    assert_eq!(
        engine.evaluate(&world, &q("inventory:first"), &ctx()).unwrap(),
        ids(&["item:cup"])
    );
    assert_eq!(
        engine.query(&world, "actor.components.core:inventory.items.1", &ctx()).unwrap(),
        ids(&["item:key"])
    );
    assert!(engine
        .query(&world, "actor.core:inventory.items.7", &ctx())
        .unwrap()
        .is_empty());
}

#[test]
fn comment_lines_inside_a_definition() {
    let engine = engine_with(
        EngineConfig::new(),
        "test:nearby := actor.positioning:closeness.partners
    # occupants of the current room
    | here.core:room.occupants
",
    );
    let context = ctx().with_binding("here", Value::from("room:hall"));
    let result = engine.evaluate(&town(), &q("test:nearby"), &context).unwrap();
    assert_eq!(result, ids(&["npc:a", "npc:b", "npc:c", "player:1"]));
}
