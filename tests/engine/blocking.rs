//! Topmost items and removal blocking

use scopedsl_engine::{BlockingResolver, BlockingSchema, EngineConfig, EvaluationContext, resolve_scope};
use scopedsl_foundation::{EntityId, QualifiedId};
use scopedsl_storage::World;

use crate::{engine_with, ids, world};

const WARDROBE: &str = r#"{"entities": {
    "player:1": {"clothing:equipment": {"equipped": {
        "torso_lower": {"accessories": "item:belt"},
        "legs": {"base": "item:pants", "underwear": "item:briefs"},
        "torso_upper": {"outer": ["item:coat"], "base": "item:shirt"}
    }}},
    "item:belt": {
        "clothing:wearable": {"layer": "accessories", "equipmentSlots": {"primary": "torso_lower"}},
        "clothing:blocks_removal": {"blockedSlots": [{"slot": "legs", "layers": ["base"], "blockType": "must_remove_first"}]}
    },
    "item:pants": {"clothing:wearable": {"layer": "base", "equipmentSlots": {"primary": "legs"}}},
    "item:briefs": {"clothing:wearable": {"layer": "underwear", "equipmentSlots": {"primary": "legs"}}},
    "item:coat": {
        "clothing:wearable": {"layer": "outer", "equipmentSlots": {"primary": "torso_upper", "secondary": ["arms"]}},
        "clothing:blocks_removal": {"blocksRemovalOf": ["item:shirt"]}
    },
    "item:shirt": {"clothing:wearable": {"layer": "base", "equipmentSlots": {"primary": "torso_upper"}}}
}}"#;

fn q(s: &str) -> QualifiedId {
    QualifiedId::parse(s).unwrap()
}

fn actor() -> EntityId {
    EntityId::from("player:1")
}

#[test]
fn topmost_item_per_slot() {
    let world = world(WARDROBE);
    let schema = BlockingSchema::default();
    let resolver = BlockingResolver::new(&world, &schema);
    assert_eq!(
        resolver.topmost_items(&actor()),
        ids(&["item:belt", "item:pants", "item:coat"])
    );
    assert_eq!(resolver.equipped_items(&actor()).len(), 5);
}

#[test]
fn belt_blocks_pants_until_unequipped() {
    let world = world(WARDROBE);
    let schema = BlockingSchema::default();
    let resolver = BlockingResolver::new(&world, &schema);
    assert_eq!(
        resolver.removable_topmost(&actor()),
        ids(&["item:belt", "item:coat"])
    );

    // Take the belt off.
    let unbelted = world.set(
        "player:1",
        q("clothing:equipment"),
        scopedsl_foundation::json::from_json(&serde_json::json!({"equipped": {
            "legs": {"base": "item:pants", "underwear": "item:briefs"},
            "torso_upper": {"outer": "item:coat", "base": "item:shirt"}
        }})),
    );
    let resolver = BlockingResolver::new(&unbelted, &schema);
    assert_eq!(
        resolver.removable_topmost(&actor()),
        ids(&["item:pants", "item:coat"])
    );
}

#[test]
fn explicit_blocking_by_id() {
    let world = world(WARDROBE);
    let schema = BlockingSchema::default();
    let resolver = BlockingResolver::new(&world, &schema);
    let equipped = resolver.equipped_items(&actor());
    assert!(resolver.is_blocked(&EntityId::from("item:shirt"), &equipped));
    assert!(!resolver.is_blocked(&EntityId::from("item:briefs"), &equipped));
}

#[test]
fn an_item_never_blocks_itself() {
    let world = world(
        r#"{"entities": {
            "player:1": {"clothing:equipment": {"equipped": {"legs": {"base": "item:kilt"}}}},
            "item:kilt": {
                "clothing:wearable": {"layer": "base", "equipmentSlots": {"primary": "legs"}},
                "clothing:blocks_removal": {"blockedSlots": [{"slot": "legs"}], "blocksRemovalOf": ["item:kilt"]}
            }
        }}"#,
    );
    let schema = BlockingSchema::default();
    let resolver = BlockingResolver::new(&world, &schema);
    assert_eq!(resolver.removable_topmost(&actor()), ids(&["item:kilt"]));
}

#[test]
fn malformed_rules_block_nothing() {
    let world = world(
        r#"{"entities": {
            "player:1": {"clothing:equipment": {"equipped": {
                "legs": {"base": "item:pants"},
                "torso_lower": {"accessories": "item:belt"}
            }}},
            "item:belt": {"clothing:blocks_removal": {"blockedSlots": "legs"}},
            "item:pants": {"clothing:wearable": {"layer": "base", "equipmentSlots": {"primary": "legs"}}}
        }}"#,
    );
    let schema = BlockingSchema::default();
    let resolver = BlockingResolver::new(&world, &schema);
    assert_eq!(
        resolver.removable_topmost(&actor()),
        ids(&["item:belt", "item:pants"])
    );
}

#[test]
fn resolve_scope_filters_blocked_candidates() {
    let engine = engine_with(
        EngineConfig::new(),
        "clothing:wearables := entities(clothing:wearable)",
    );
    let world = world(WARDROBE);
    let context = EvaluationContext::new("player:1");

    let removable = resolve_scope(
        &engine,
        &world,
        &q("clothing:wearables"),
        &context,
        &BlockingSchema::default(),
    )
    .unwrap();
    assert_eq!(removable, ids(&["item:belt", "item:briefs", "item:coat"]));
}

#[test]
fn no_equipment_means_nothing_to_remove() {
    let world = World::new().spawn("player:1");
    let schema = BlockingSchema::default();
    let resolver = BlockingResolver::new(&world, &schema);
    assert!(resolver.removable_topmost(&actor()).is_empty());
}
