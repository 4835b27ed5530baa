//! Integration tests for EntityId and QualifiedId

use scopedsl_foundation::{EntityId, EntitySet, QualifiedId, is_identifier, is_reserved_namespace};

#[test]
fn qualified_id_parse() {
    let q = QualifiedId::parse("intimacy:close_actors").unwrap();
    assert_eq!(&*q.namespace, "intimacy");
    assert_eq!(&*q.id, "close_actors");
    assert_eq!(q.to_string(), "intimacy:close_actors");
}

#[test]
fn qualified_id_rejects_malformed_text() {
    for text in ["", "nocolon", ":x", "x:", "a:b:c", "1a:b", "a:b c", "a-:b!"] {
        assert!(QualifiedId::parse(text).is_none(), "{text} should not parse");
    }
}

#[test]
fn qualified_ids_order_by_namespace_then_id() {
    let mut ids = vec![
        QualifiedId::new("b", "a"),
        QualifiedId::new("a", "z"),
        QualifiedId::new("a", "b"),
    ];
    ids.sort();
    let printed: Vec<String> = ids.iter().map(ToString::to_string).collect();
    assert_eq!(printed, vec!["a:b", "a:z", "b:a"]);
}

#[test]
fn reserved_namespaces() {
    assert!(is_reserved_namespace("core"));
    assert!(is_reserved_namespace("none"));
    assert!(is_reserved_namespace("self"));
    assert!(!is_reserved_namespace("intimacy"));
    assert!(QualifiedId::new("core", "actor").is_reserved());
}

#[test]
fn identifier_rules() {
    assert!(is_identifier("close_actors"));
    assert!(is_identifier("_x"));
    assert!(is_identifier("a-b2"));
    assert!(!is_identifier("2a"));
    assert!(!is_identifier(""));
}

#[test]
fn entity_ids() {
    let id = EntityId::from("npc:a");
    assert_eq!(id.namespace(), Some("npc"));
    assert_eq!(EntityId::from("plain").namespace(), None);
    assert_eq!(id.to_string(), "npc:a");
}

#[test]
fn entity_sets_are_sorted_and_deduplicated() {
    let set: EntitySet = ["c", "a", "b", "a"].into_iter().map(EntityId::from).collect();
    let ids: Vec<&str> = set.iter().map(EntityId::as_str).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}
