//! In-memory world state with immutable snapshots.
//!
//! The `World` is the reference implementation of [`WorldView`]. It uses
//! persistent data structures for O(1) cloning and structural sharing, and
//! every mutation returns a new snapshot. Hosts with their own entity
//! storage implement [`WorldView`] directly instead.

use std::sync::Arc;

use scopedsl_foundation::{EntityId, QualifiedId, Value};

use crate::component::ComponentStore;
use crate::view::WorldView;

/// Immutable snapshot of entities and components.
///
/// Clone is O(1) due to structural sharing via `Arc`.
/// All mutation methods return a new `World` instance.
#[derive(Clone, Debug, Default)]
pub struct World {
    /// Component data storage.
    components: Arc<ComponentStore>,
}

impl World {
    /// Creates a new empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.components.entity_count()
    }

    /// Iterates all entity IDs in id order.
    pub fn entities(&self) -> impl Iterator<Item = &EntityId> {
        self.components.entities()
    }

    /// Returns true if the entity exists.
    #[must_use]
    pub fn exists(&self, entity: &EntityId) -> bool {
        self.components.contains_entity(entity)
    }

    /// Adds an entity with no components.
    ///
    /// Spawning an existing id is a no-op.
    #[must_use]
    pub fn spawn(&self, entity: impl Into<EntityId>) -> World {
        self.with_store(|store| store.add_entity(entity.into()))
    }

    /// Sets a component on an entity, spawning the entity if needed.
    ///
    /// Returns a new World with the component set.
    #[must_use]
    pub fn set(&self, entity: impl Into<EntityId>, component: QualifiedId, value: Value) -> World {
        self.with_store(|store| store.set(entity.into(), component, value))
    }

    /// Removes a component from an entity.
    ///
    /// Returns a new World; removing a missing component is a no-op.
    #[must_use]
    pub fn remove(&self, entity: &EntityId, component: &QualifiedId) -> World {
        self.with_store(|store| {
            store.remove(entity, component);
        })
    }

    /// Destroys an entity and all of its components.
    #[must_use]
    pub fn destroy(&self, entity: &EntityId) -> World {
        self.with_store(|store| store.remove_entity(entity))
    }

    /// Gets a component value for an entity.
    #[must_use]
    pub fn get(&self, entity: &EntityId, component: &QualifiedId) -> Option<&Value> {
        self.components.get(entity, component)
    }

    /// Checks if an entity has a component.
    #[must_use]
    pub fn has(&self, entity: &EntityId, component: &QualifiedId) -> bool {
        self.components.has(entity, component)
    }

    /// Returns the component types an entity has.
    ///
    /// Returns an empty slice if the entity doesn't exist.
    #[must_use]
    pub fn entity_components(&self, entity: &EntityId) -> &[QualifiedId] {
        self.components
            .archetype(entity)
            .map_or(&[], |arch| arch.components())
    }

    /// Iterates entities with a specific component.
    pub fn with_component<'a>(
        &'a self,
        component: &QualifiedId,
    ) -> impl Iterator<Item = &'a EntityId> + 'a {
        self.components.with_component(component)
    }

    fn with_store(&self, f: impl FnOnce(&mut ComponentStore)) -> World {
        let mut store = (*self.components).clone();
        f(&mut store);
        World {
            components: Arc::new(store),
        }
    }
}

impl WorldView for World {
    fn has_component(&self, entity: &EntityId, component: &QualifiedId) -> bool {
        self.has(entity, component)
    }

    fn get_component(&self, entity: &EntityId, component: &QualifiedId) -> Option<Value> {
        self.get(entity, component).cloned()
    }

    /// An entity's kinds are the component types it carries.
    fn entities_of_kind(&self, kind: &QualifiedId) -> Vec<EntityId> {
        self.with_component(kind).cloned().collect()
    }
}
