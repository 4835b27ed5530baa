//! Loading worlds from JSON documents.
//!
//! The expected shape is:
//!
//! ```json
//! {
//!   "entities": {
//!     "core:player": {
//!       "core:actor": {},
//!       "positioning:closeness": { "partners": ["core:npc_a"] }
//!     }
//!   }
//! }
//! ```

use scopedsl_foundation::json::from_json;
use scopedsl_foundation::{Error, ErrorKind, QualifiedId, Result};

use crate::world::World;

impl World {
    /// Parses a world from JSON text.
    ///
    /// # Errors
    ///
    /// Returns a `WorldData` error if the text is not valid JSON or does not
    /// have the expected shape.
    pub fn from_json_str(text: &str) -> Result<World> {
        let json: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| Error::new(ErrorKind::WorldData(e.to_string())))?;
        World::from_json(&json)
    }

    /// Builds a world from a parsed JSON document.
    ///
    /// # Errors
    ///
    /// Returns a `WorldData` error on a missing `entities` object, a
    /// non-object entity entry, or a malformed component key.
    pub fn from_json(json: &serde_json::Value) -> Result<World> {
        let entities = json
            .get("entities")
            .and_then(serde_json::Value::as_object)
            .ok_or_else(|| world_error("expected an `entities` object"))?;

        let mut world = World::new();
        for (entity, components) in entities {
            let components = components
                .as_object()
                .ok_or_else(|| world_error(format!("entity `{entity}` must map to an object")))?;

            world = world.spawn(entity.as_str());
            for (key, value) in components {
                let component = QualifiedId::parse(key).ok_or_else(|| {
                    world_error(format!(
                        "entity `{entity}`: component key `{key}` is not `mod:component`"
                    ))
                })?;
                world = world.set(entity.as_str(), component, from_json(value));
            }
        }

        Ok(world)
    }
}

fn world_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::WorldData(message.into()))
}
