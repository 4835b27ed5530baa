//! Integration tests for Value types
//!
//! Tests truthiness, loose equality, path walking and JSON conversion.

use scopedsl_foundation::json::{from_json, to_json};
use scopedsl_foundation::{EntityId, Type, Value};
use serde_json::json;
use std::collections::HashSet;

// =============================================================================
// Truthiness
// =============================================================================

#[test]
fn falsy_values() {
    for v in [
        Value::Nil,
        Value::Bool(false),
        Value::Int(0),
        Value::Float(0.0),
        Value::Float(f64::NAN),
        Value::from(""),
        Value::from(Vec::<Value>::new()),
    ] {
        assert!(!v.is_truthy(), "{v:?} should be falsy");
    }
}

#[test]
fn truthy_values() {
    for v in [
        Value::Bool(true),
        Value::Int(-1),
        Value::Float(0.5),
        Value::from("x"),
        Value::from(vec![0]),
        Value::map::<&str>([]),
        Value::EntityRef(EntityId::from("a:b")),
    ] {
        assert!(v.is_truthy(), "{v:?} should be truthy");
    }
}

// =============================================================================
// Equality
// =============================================================================

#[test]
fn structural_equality_distinguishes_numbers() {
    assert_ne!(Value::Int(1), Value::Float(1.0));
    assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
}

#[test]
fn loose_equality() {
    assert!(Value::Int(1).loose_eq(&Value::Float(1.0)));
    assert!(Value::from("npc:a").loose_eq(&Value::EntityRef(EntityId::from("npc:a"))));
    assert!(!Value::from("1").loose_eq(&Value::Int(1)));
    assert!(Value::Nil.loose_eq(&Value::Nil));
    assert!(!Value::Nil.loose_eq(&Value::Bool(false)));
}

#[test]
fn values_hash_consistently() {
    let mut set = HashSet::new();
    set.insert(Value::from("a"));
    set.insert(Value::from("a"));
    set.insert(Value::Int(1));
    set.insert(Value::from(vec!["a", "b"]));
    set.insert(Value::from(vec!["a", "b"]));
    assert_eq!(set.len(), 3);
}

// =============================================================================
// Entity-like values
// =============================================================================

#[test]
fn strings_and_refs_are_entity_like() {
    assert_eq!(Value::from("npc:a").as_entity(), Some(EntityId::from("npc:a")));
    assert_eq!(
        Value::EntityRef(EntityId::from("npc:a")).as_entity(),
        Some(EntityId::from("npc:a"))
    );
    assert_eq!(Value::from("").as_entity(), None);
    assert_eq!(Value::Int(3).as_entity(), None);
}

#[test]
fn value_types() {
    assert_eq!(Value::Nil.value_type(), Type::Nil);
    assert_eq!(Value::from(2.5).value_type(), Type::Float);
    assert_eq!(Value::from(EntityId::from("x")).value_type(), Type::EntityRef);
    assert!(Type::Int.is_numeric());
    assert!(!Type::String.is_numeric());
}

// =============================================================================
// Paths
// =============================================================================

#[test]
fn walk_maps_and_lists() {
    let v = from_json(&json!({"slots": {"legs": ["item:pants", "item:belt"]}}));
    assert_eq!(v.walk(&["slots", "legs", "1"]), Some(&Value::from("item:belt")));
    assert_eq!(v.walk(&["slots", "arms"]), None);
    assert_eq!(v.walk(&["slots", "legs", "x"]), None);
    assert_eq!(v.walk::<&str>(&[]), Some(&v));
}

// =============================================================================
// JSON conversion
// =============================================================================

#[test]
fn json_numbers() {
    assert_eq!(from_json(&json!(3)), Value::Int(3));
    assert_eq!(from_json(&json!(3.5)), Value::Float(3.5));
    assert_eq!(from_json(&json!(u64::MAX)), Value::Float(u64::MAX as f64));
}

#[test]
fn json_round_trip() {
    let doc = json!({"a": [1, "two", null, true, {"b": 2.5}]});
    assert_eq!(to_json(&from_json(&doc)), doc);
}

#[test]
fn entity_refs_serialize_as_strings() {
    assert_eq!(to_json(&Value::EntityRef(EntityId::from("npc:a"))), json!("npc:a"));
    assert_eq!(to_json(&Value::Float(f64::INFINITY)), json!(null));
}

#[test]
fn display_is_json_like() {
    let v = from_json(&json!({"k": [1, "x"]}));
    assert_eq!(v.to_string(), r#"{"k": [1, "x"]}"#);
}
