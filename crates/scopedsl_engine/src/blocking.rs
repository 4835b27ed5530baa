//! Layered resolution: topmost items and removal blocking.
//!
//! Equipment is layered per slot. An equipped item can block the removal
//! of other items, either by slot and layer (a belt blocks base-layer
//! items on the legs) or by naming them explicitly. A scope that lists
//! removable clothing is narrowed by dropping every candidate that some
//! other equipped item blocks.
//!
//! Component shapes, with the default refs:
//!
//! ```text
//! clothing:wearable        { "layer": "base",
//!                            "equipmentSlots": { "primary": "legs", "secondary": ["feet"] } }
//! clothing:blocks_removal  { "blockedSlots": [ { "slot": "legs", "layers": ["base"],
//!                                                "blockType": "must_remove_first" } ],
//!                            "blocksRemovalOf": ["item:id"] }
//! clothing:equipment       { "equipped": { "<slot>": { "<layer>": "item:id" | ["item:id"] } } }
//! ```
//!
//! Malformed blocking data never raises: the offending item is treated as
//! blocking nothing and a warning is logged.

use std::collections::BTreeMap;

use scopedsl_foundation::{EntityId, EntitySet, QualifiedId, Result, Value};
use scopedsl_storage::WorldView;
use tracing::warn;

use crate::context::EvaluationContext;
use crate::engine::ScopeEngine;

/// Component refs and layer order used by blocking resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockingSchema {
    /// Component describing an item's slots and layer.
    pub wearable: QualifiedId,
    /// Component holding an item's blocking rules.
    pub blocks_removal: QualifiedId,
    /// Component on the actor listing what is equipped.
    pub equipment: QualifiedId,
    /// Layers from outermost to innermost.
    pub layer_priority: Vec<String>,
}

impl Default for BlockingSchema {
    fn default() -> Self {
        Self {
            wearable: QualifiedId::new("clothing", "wearable"),
            blocks_removal: QualifiedId::new("clothing", "blocks_removal"),
            equipment: QualifiedId::new("clothing", "equipment"),
            layer_priority: ["outer", "base", "underwear", "accessories"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl BlockingSchema {
    /// Rank of a layer; lower is further out. Unknown layers rank last.
    fn layer_rank(&self, layer: &str) -> usize {
        self.layer_priority
            .iter()
            .position(|l| l == layer)
            .unwrap_or(self.layer_priority.len())
    }
}

/// One `blockedSlots` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
struct SlotRule {
    slot: String,
    /// Empty means every layer.
    layers: Vec<String>,
}

/// The parsed rules of one blocking item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct BlockingRules {
    slots: Vec<SlotRule>,
    explicit: Vec<EntityId>,
}

impl BlockingRules {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        let mut rules = Self::default();

        match value.get_field("blockedSlots") {
            None | Some(Value::Nil) => {}
            Some(Value::Vec(entries)) => {
                for entry in entries {
                    rules.slots.push(parse_slot_rule(entry)?);
                }
            }
            Some(other) => return Err(format!("blockedSlots must be a list, found {}", other.value_type())),
        }

        match value.get_field("blocksRemovalOf") {
            None | Some(Value::Nil) => {}
            Some(Value::Vec(ids)) => {
                for id in ids {
                    let id = id
                        .as_entity()
                        .ok_or_else(|| format!("blocksRemovalOf entries must be ids, found {}", id.value_type()))?;
                    rules.explicit.push(id);
                }
            }
            Some(other) => {
                return Err(format!("blocksRemovalOf must be a list, found {}", other.value_type()));
            }
        }

        Ok(rules)
    }

    fn matches(&self, candidate: &EntityId, wearable: Option<&Wearable>) -> bool {
        if self.explicit.contains(candidate) {
            return true;
        }
        let Some(wearable) = wearable else {
            return false;
        };
        self.slots.iter().any(|rule| {
            wearable.slots.contains(&rule.slot)
                && (rule.layers.is_empty() || rule.layers.contains(&wearable.layer))
        })
    }
}

fn parse_slot_rule(entry: &Value) -> std::result::Result<SlotRule, String> {
    let slot = entry
        .get_field("slot")
        .and_then(Value::as_str)
        .ok_or("blockedSlots entry needs a string `slot`")?
        .to_string();

    let layers = match entry.get_field("layers") {
        None | Some(Value::Nil) => Vec::new(),
        Some(Value::Vec(layers)) => layers
            .iter()
            .map(|l| l.as_str().map(String::from))
            .collect::<Option<Vec<_>>>()
            .ok_or("blockedSlots layers must be strings")?,
        Some(_) => return Err("blockedSlots layers must be a list".to_string()),
    };

    Ok(SlotRule { slot, layers })
}

/// Slot and layer metadata of a wearable item.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Wearable {
    layer: String,
    slots: Vec<String>,
}

impl Wearable {
    fn from_value(value: &Value) -> Option<Self> {
        let layer = value.get_field("layer")?.as_str()?.to_string();
        let slots_value = value.get_field("equipmentSlots")?;

        let mut slots = Vec::new();
        if let Some(primary) = slots_value.get_field("primary").and_then(Value::as_str) {
            slots.push(primary.to_string());
        }
        if let Some(secondary) = slots_value.get_field("secondary").and_then(Value::as_vec) {
            slots.extend(secondary.iter().filter_map(Value::as_str).map(String::from));
        }
        Some(Self { layer, slots })
    }
}

/// Applies layering and blocking rules over a world snapshot.
pub struct BlockingResolver<'a, W: WorldView + ?Sized> {
    world: &'a W,
    schema: &'a BlockingSchema,
}

impl<'a, W: WorldView + ?Sized> BlockingResolver<'a, W> {
    /// Creates a resolver.
    #[must_use]
    pub fn new(world: &'a W, schema: &'a BlockingSchema) -> Self {
        Self { world, schema }
    }

    /// Returns `slot -> layer -> items` from the actor's equipment.
    fn equipment(&self, actor: &EntityId) -> BTreeMap<String, BTreeMap<String, Vec<EntityId>>> {
        let mut slots = BTreeMap::new();
        let Some(equipment) = self.world.get_component(actor, &self.schema.equipment) else {
            return slots;
        };
        let Some(equipped) = equipment.get_field("equipped").and_then(Value::as_map) else {
            return slots;
        };

        for (slot, layers) in equipped.iter() {
            let Some(layers) = layers.as_map() else {
                continue;
            };
            let mut by_layer = BTreeMap::new();
            for (layer, items) in layers.iter() {
                let ids: Vec<EntityId> = match items {
                    Value::Vec(items) => items.iter().filter_map(Value::as_entity).collect(),
                    other => other.as_entity().into_iter().collect(),
                };
                if !ids.is_empty() {
                    by_layer.insert(layer.to_string(), ids);
                }
            }
            slots.insert(slot.to_string(), by_layer);
        }
        slots
    }

    /// Returns every item the actor has equipped.
    #[must_use]
    pub fn equipped_items(&self, actor: &EntityId) -> EntitySet {
        self.equipment(actor)
            .into_values()
            .flat_map(BTreeMap::into_values)
            .flatten()
            .collect()
    }

    /// Returns, for every slot, the items on its outermost occupied layer.
    #[must_use]
    pub fn topmost_items(&self, actor: &EntityId) -> EntitySet {
        self.equipment(actor)
            .into_values()
            .filter_map(|layers| {
                layers
                    .into_iter()
                    .min_by_key(|(layer, _)| self.schema.layer_rank(layer))
                    .map(|(_, items)| items)
            })
            .flatten()
            .collect()
    }

    /// Returns true if an item in `equipped` other than `candidate`
    /// blocks its removal.
    #[must_use]
    pub fn is_blocked(&self, candidate: &EntityId, equipped: &EntitySet) -> bool {
        let wearable = self
            .world
            .get_component(candidate, &self.schema.wearable)
            .and_then(|value| Wearable::from_value(&value));

        equipped
            .iter()
            .filter(|blocker| *blocker != candidate)
            .any(|blocker| {
                self.rules_of(blocker)
                    .is_some_and(|rules| rules.matches(candidate, wearable.as_ref()))
            })
    }

    /// Drops every candidate blocked by another equipped item.
    #[must_use]
    pub fn exclude_blocked(&self, candidates: EntitySet, equipped: &EntitySet) -> EntitySet {
        candidates
            .into_iter()
            .filter(|candidate| !self.is_blocked(candidate, equipped))
            .collect()
    }

    /// Returns the actor's topmost items that can be removed right now.
    #[must_use]
    pub fn removable_topmost(&self, actor: &EntityId) -> EntitySet {
        let equipped = self.equipped_items(actor);
        self.exclude_blocked(self.topmost_items(actor), &equipped)
    }

    fn rules_of(&self, blocker: &EntityId) -> Option<BlockingRules> {
        let value = self.world.get_component(blocker, &self.schema.blocks_removal)?;
        match BlockingRules::from_value(&value) {
            Ok(rules) => Some(rules),
            Err(reason) => {
                warn!(item = %blocker, %reason, "ignoring malformed blocking rules");
                None
            }
        }
    }
}

/// Evaluates a scope and drops the candidates that the actor's other
/// equipped items block.
///
/// # Errors
/// Returns any error raised while evaluating the scope.
pub fn resolve_scope<W: WorldView + ?Sized>(
    engine: &ScopeEngine,
    world: &W,
    key: &QualifiedId,
    context: &EvaluationContext,
    schema: &BlockingSchema,
) -> Result<EntitySet> {
    let candidates = engine.evaluate(world, key, context)?;
    let resolver = BlockingResolver::new(world, schema);
    let equipped = resolver.equipped_items(&context.actor);
    Ok(resolver.exclude_blocked(candidates, &equipped))
}
