//! Per-query evaluation context and path resolution.

use std::collections::BTreeMap;

use scopedsl_foundation::{EntityId, QualifiedId, Value};
use scopedsl_storage::WorldView;

/// The segment that switches from an entity to one of its components.
const COMPONENTS_SEGMENT: &str = "components";

/// Names that always resolve to the acting entity.
const ACTOR_NAMES: [&str; 2] = ["actor", "self"];

/// Inputs to one query: the acting entity plus named bindings such as
/// `target` or `location`.
///
/// Contexts are built fresh for every query and never mutated by
/// evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluationContext {
    /// The entity performing the action.
    pub actor: EntityId,
    /// Extra named values visible to expressions and predicates.
    pub bindings: BTreeMap<String, Value>,
}

impl EvaluationContext {
    /// Creates a context with no bindings.
    #[must_use]
    pub fn new(actor: impl Into<EntityId>) -> Self {
        Self {
            actor: actor.into(),
            bindings: BTreeMap::new(),
        }
    }

    /// Adds a binding.
    #[must_use]
    pub fn with_binding(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bindings.insert(name.into(), value.into());
        self
    }

    /// Resolves a root name: `actor` and `self` are the actor, anything
    /// else is a binding.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if ACTOR_NAMES.contains(&name) {
            return Some(Value::EntityRef(self.actor.clone()));
        }
        self.bindings.get(name).cloned()
    }
}

/// Walks `path` from `start`.
///
/// Maps and lists are walked by key and index. On an entity-like value,
/// `components.mod:comp` fetches that component from the world and `id`
/// yields the entity itself. Returns `None` as soon as a step is missing.
pub(crate) fn walk_path<W, S>(world: &W, start: Value, path: &[S]) -> Option<Value>
where
    W: WorldView + ?Sized,
    S: AsRef<str>,
{
    let mut current = start;
    let mut segments = path.iter().map(AsRef::as_ref);

    while let Some(segment) = segments.next() {
        let is_entity = matches!(current, Value::EntityRef(_) | Value::String(_));
        current = match segment {
            COMPONENTS_SEGMENT if is_entity => {
                let entity = current.as_entity()?;
                let component = QualifiedId::parse(segments.next()?)?;
                world.get_component(&entity, &component)?
            }
            "id" if is_entity => Value::EntityRef(current.as_entity()?),
            _ => current.get_field(segment)?.clone(),
        };
    }

    Some(current)
}
