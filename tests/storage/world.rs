//! Integration tests for World snapshots and the WorldView contract

use scopedsl_foundation::{EntityId, EntitySet, QualifiedId, Value};
use scopedsl_storage::{World, WorldView};

fn q(s: &str) -> QualifiedId {
    QualifiedId::parse(s).unwrap()
}

fn e(s: &str) -> EntityId {
    EntityId::from(s)
}

// =============================================================================
// Snapshots
// =============================================================================

#[test]
fn set_returns_new_snapshot() {
    let empty = World::new();
    let one = empty.set("npc:a", q("core:actor"), Value::map::<&str>([]));

    assert_eq!(empty.entity_count(), 0);
    assert_eq!(one.entity_count(), 1);
    assert!(one.has(&e("npc:a"), &q("core:actor")));
    assert!(!empty.has(&e("npc:a"), &q("core:actor")));
}

#[test]
fn remove_and_destroy() {
    let world = World::new()
        .set("npc:a", q("core:actor"), Value::Nil)
        .set("npc:a", q("core:stats"), Value::map([("level", Value::Int(1))]))
        .set("npc:b", q("core:actor"), Value::Nil);

    let removed = world.remove(&e("npc:a"), &q("core:stats"));
    assert!(!removed.has(&e("npc:a"), &q("core:stats")));
    assert!(removed.has(&e("npc:a"), &q("core:actor")));
    assert!(world.has(&e("npc:a"), &q("core:stats")));

    let destroyed = world.destroy(&e("npc:a"));
    assert!(!destroyed.exists(&e("npc:a")));
    assert_eq!(destroyed.entity_count(), 1);
}

#[test]
fn spawn_creates_entity_without_components() {
    let world = World::new().spawn("npc:a");
    assert!(world.exists(&e("npc:a")));
    assert!(world.entity_components(&e("npc:a")).is_empty());
    assert!(world.entity_components(&e("npc:zzz")).is_empty());
}

#[test]
fn overwriting_a_component_replaces_its_value() {
    let world = World::new()
        .set("npc:a", q("core:stats"), Value::map([("level", Value::Int(1))]))
        .set("npc:a", q("core:stats"), Value::map([("level", Value::Int(2))]));
    let stats = world.get(&e("npc:a"), &q("core:stats")).unwrap();
    assert_eq!(stats.get_field("level"), Some(&Value::Int(2)));
    assert_eq!(world.entity_components(&e("npc:a")).len(), 1);
}

// =============================================================================
// WorldView
// =============================================================================

#[test]
fn view_reads_components() {
    let world = World::new().set("npc:a", q("core:stats"), Value::map([("level", Value::Int(3))]));
    let view: &dyn WorldView = &world;

    assert!(view.has_component(&e("npc:a"), &q("core:stats")));
    assert!(!view.has_component(&e("npc:a"), &q("core:other")));
    assert_eq!(
        view.get_component(&e("npc:a"), &q("core:stats"))
            .and_then(|v| v.get_field("level").cloned()),
        Some(Value::Int(3))
    );
    assert_eq!(view.get_component(&e("npc:zzz"), &q("core:stats")), None);
}

#[test]
fn entities_of_kind_lists_component_carriers() {
    let world = World::new()
        .set("npc:a", q("core:actor"), Value::Nil)
        .set("npc:b", q("core:actor"), Value::Nil)
        .set("item:x", q("items:item"), Value::Nil);

    let actors: EntitySet = world.entities_of_kind(&q("core:actor")).into_iter().collect();
    assert_eq!(actors, EntitySet::from([e("npc:a"), e("npc:b")]));
    assert!(world.entities_of_kind(&q("core:missing")).is_empty());
}

#[test]
fn references_to_views_are_views() {
    fn count<W: WorldView>(view: W, kind: &QualifiedId) -> usize {
        view.entities_of_kind(kind).len()
    }
    let world = World::new().set("npc:a", q("core:actor"), Value::Nil);
    assert_eq!(count(&world, &q("core:actor")), 1);
    assert_eq!(count(&&world, &q("core:actor")), 1);
}

#[test]
fn worlds_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<World>();

    let world = World::new().set("npc:a", q("core:actor"), Value::Nil);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let world = world.clone();
            std::thread::spawn(move || world.has(&e("npc:a"), &q("core:actor")))
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
