//! Component storage with per-entity archetypes.
//!
//! Components are stored per type, keyed by entity. Archetypes track which
//! component types each entity has so kind lookups and listings stay cheap.

use scopedsl_foundation::{EntityId, QualifiedId, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The set of component types an entity has.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Archetype {
    /// Component types, kept sorted for consistent identity.
    components: Vec<QualifiedId>,
}

impl Archetype {
    /// Creates a new empty archetype.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the components in this archetype.
    #[must_use]
    pub fn components(&self) -> &[QualifiedId] {
        &self.components
    }

    /// Checks if this archetype contains a component.
    #[must_use]
    pub fn contains(&self, component: &QualifiedId) -> bool {
        self.components.binary_search(component).is_ok()
    }

    /// Returns a new archetype with the component added.
    #[must_use]
    pub fn with_component(&self, component: QualifiedId) -> Self {
        match self.components.binary_search(&component) {
            Ok(_) => self.clone(),
            Err(pos) => {
                let mut components = self.components.clone();
                components.insert(pos, component);
                Self { components }
            }
        }
    }

    /// Returns a new archetype with the component removed.
    #[must_use]
    pub fn without_component(&self, component: &QualifiedId) -> Self {
        let mut components = self.components.clone();
        if let Ok(pos) = components.binary_search(component) {
            components.remove(pos);
        }
        Self { components }
    }
}

/// Stores all component data for entities.
///
/// Backed by persistent ordered maps, so cloning the store to derive a new
/// world snapshot is O(1) and iteration order is deterministic.
#[derive(Clone, Debug, Default)]
pub struct ComponentStore {
    /// Component data: component -> entity -> value.
    data: im::OrdMap<QualifiedId, im::OrdMap<EntityId, Value>>,
    /// Archetype for each entity.
    archetypes: im::OrdMap<EntityId, Archetype>,
}

impl ComponentStore {
    /// Creates a new empty component store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity with no components.
    pub fn add_entity(&mut self, entity: EntityId) {
        if !self.archetypes.contains_key(&entity) {
            self.archetypes.insert(entity, Archetype::new());
        }
    }

    /// Sets a component on an entity, registering the entity if needed.
    pub fn set(&mut self, entity: EntityId, component: QualifiedId, value: Value) {
        let mut comp_data = self.data.get(&component).cloned().unwrap_or_default();
        comp_data.insert(entity.clone(), value);
        self.data.insert(component.clone(), comp_data);

        let archetype = self
            .archetypes
            .get(&entity)
            .map_or_else(Archetype::new, Clone::clone)
            .with_component(component);
        self.archetypes.insert(entity, archetype);
    }

    /// Gets a component value for an entity.
    #[must_use]
    pub fn get(&self, entity: &EntityId, component: &QualifiedId) -> Option<&Value> {
        self.data.get(component)?.get(entity)
    }

    /// Checks if an entity has a component.
    #[must_use]
    pub fn has(&self, entity: &EntityId, component: &QualifiedId) -> bool {
        self.data
            .get(component)
            .is_some_and(|m| m.contains_key(entity))
    }

    /// Removes a component from an entity.
    ///
    /// Returns the removed value if it existed.
    pub fn remove(&mut self, entity: &EntityId, component: &QualifiedId) -> Option<Value> {
        let value = self.data.get_mut(component)?.remove(entity);

        if value.is_some() {
            if let Some(archetype) = self.archetypes.get_mut(entity) {
                *archetype = archetype.without_component(component);
            }
        }

        value
    }

    /// Removes an entity and all of its components.
    pub fn remove_entity(&mut self, entity: &EntityId) {
        if let Some(archetype) = self.archetypes.remove(entity) {
            for component in archetype.components() {
                if let Some(comp_data) = self.data.get_mut(component) {
                    comp_data.remove(entity);
                }
            }
        }
    }

    /// Returns true if the entity is known to the store.
    #[must_use]
    pub fn contains_entity(&self, entity: &EntityId) -> bool {
        self.archetypes.contains_key(entity)
    }

    /// Gets the archetype for an entity.
    #[must_use]
    pub fn archetype(&self, entity: &EntityId) -> Option<&Archetype> {
        self.archetypes.get(entity)
    }

    /// Iterates all known entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &EntityId> {
        self.archetypes.keys()
    }

    /// Returns the number of known entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.archetypes.len()
    }

    /// Iterates entities with a specific component, in id order.
    pub fn with_component<'a>(
        &'a self,
        component: &QualifiedId,
    ) -> impl Iterator<Item = &'a EntityId> + 'a {
        self.data
            .get(component)
            .into_iter()
            .flat_map(|m| m.keys())
    }
}
