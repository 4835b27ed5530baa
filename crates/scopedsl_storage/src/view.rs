//! The read contract the scope evaluator depends on.

use scopedsl_foundation::{EntityId, QualifiedId, Value};

/// Read-only view of entities and their components.
///
/// The evaluator never mutates world state; it only needs these three
/// capabilities. A view is treated as an immutable snapshot for the
/// duration of one query, so implementors must not change underneath a
/// running evaluation.
pub trait WorldView {
    /// Returns true if `entity` carries `component`.
    fn has_component(&self, entity: &EntityId, component: &QualifiedId) -> bool;

    /// Returns the component record, or `None` if the entity lacks it.
    fn get_component(&self, entity: &EntityId, component: &QualifiedId) -> Option<Value>;

    /// Returns every entity of the given kind.
    fn entities_of_kind(&self, kind: &QualifiedId) -> Vec<EntityId>;
}

impl<W: WorldView + ?Sized> WorldView for &W {
    fn has_component(&self, entity: &EntityId, component: &QualifiedId) -> bool {
        (**self).has_component(entity, component)
    }

    fn get_component(&self, entity: &EntityId, component: &QualifiedId) -> Option<Value> {
        (**self).get_component(entity, component)
    }

    fn entities_of_kind(&self, kind: &QualifiedId) -> Vec<EntityId> {
        (**self).entities_of_kind(kind)
    }
}
