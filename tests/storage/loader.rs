//! Integration tests for JSON world loading

use scopedsl_foundation::{EntityId, ErrorKind, QualifiedId, Value};
use scopedsl_storage::World;

#[test]
fn loads_nested_component_data() {
    let world = World::from_json_str(
        r#"{"entities": {
            "player:1": {
                "clothing:equipment": {"equipped": {"legs": {"base": "item:pants"}}},
                "core:stats": {"level": 3, "ratio": 0.5, "tags": ["a", "b"], "alive": true}
            },
            "item:pants": {}
        }}"#,
    )
    .unwrap();

    assert_eq!(world.entity_count(), 2);
    let player = EntityId::from("player:1");
    let equipment = world
        .get(&player, &QualifiedId::new("clothing", "equipment"))
        .unwrap();
    assert_eq!(
        equipment.walk(&["equipped", "legs", "base"]),
        Some(&Value::from("item:pants"))
    );

    let stats = world.get(&player, &QualifiedId::new("core", "stats")).unwrap();
    assert_eq!(stats.get_field("level"), Some(&Value::Int(3)));
    assert_eq!(stats.get_field("ratio"), Some(&Value::Float(0.5)));
    assert_eq!(stats.walk(&["tags", "0"]), Some(&Value::from("a")));
    assert_eq!(stats.get_field("alive"), Some(&Value::Bool(true)));

    assert!(world.exists(&EntityId::from("item:pants")));
}

#[test]
fn null_components_are_present_but_nil() {
    let world = World::from_json_str(r#"{"entities": {"e:1": {"core:flag": null}}}"#).unwrap();
    let id = EntityId::from("e:1");
    assert!(world.has(&id, &QualifiedId::new("core", "flag")));
    assert_eq!(world.get(&id, &QualifiedId::new("core", "flag")), Some(&Value::Nil));
}

#[test]
fn malformed_documents_are_world_data_errors() {
    for text in [
        "[]",
        r#"{"entities": []}"#,
        r#"{"entities": {"e:1": 5}}"#,
        r#"{"entities": {"e:1": {"a:b:c": 1}}}"#,
        "{",
    ] {
        let err = World::from_json_str(text).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::WorldData(_)), "{text}");
    }
}
