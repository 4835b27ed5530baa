//! Evaluation of filter predicates against one candidate.
//!
//! Predicates produce JSON-Logic values rather than plain booleans:
//! `and` yields its first falsy operand and `or` its first truthy one.
//! A filter keeps a candidate when the result is truthy.

use std::cmp::Ordering;

use scopedsl_foundation::{Error, Result, Value};
use scopedsl_language::{CompareOp, Predicate};
use scopedsl_storage::WorldView;

use crate::context::{EvaluationContext, walk_path};

/// The path root that names the current element explicitly.
const ELEMENT_ROOT: &str = "entity";

/// Evaluates predicates for one query.
pub struct PredicateEvaluator<'a, W: WorldView + ?Sized> {
    world: &'a W,
    context: &'a EvaluationContext,
}

impl<'a, W: WorldView + ?Sized> PredicateEvaluator<'a, W> {
    /// Creates an evaluator over a world snapshot and query context.
    #[must_use]
    pub fn new(world: &'a W, context: &'a EvaluationContext) -> Self {
        Self { world, context }
    }

    /// Returns true if `predicate` holds for `element`.
    ///
    /// # Errors
    /// Returns `PredicateType` if an ordering comparison meets
    /// incomparable operands.
    pub fn test(&self, predicate: &Predicate, element: &Value) -> Result<bool> {
        Ok(self.evaluate(predicate, element)?.is_truthy())
    }

    /// Evaluates `predicate` with `element` as the current element.
    ///
    /// # Errors
    /// Returns `PredicateType` if an ordering comparison meets
    /// incomparable operands.
    pub fn evaluate(&self, predicate: &Predicate, element: &Value) -> Result<Value> {
        match predicate {
            Predicate::And(operands) => {
                let mut last = Value::Bool(true);
                for operand in operands {
                    last = self.evaluate(operand, element)?;
                    if !last.is_truthy() {
                        break;
                    }
                }
                Ok(last)
            }
            Predicate::Or(operands) => {
                let mut last = Value::Bool(false);
                for operand in operands {
                    last = self.evaluate(operand, element)?;
                    if last.is_truthy() {
                        break;
                    }
                }
                Ok(last)
            }
            Predicate::Not(operand) => Ok(Value::Bool(!self.test(operand, element)?)),
            Predicate::Compare { op, left, right } => {
                let left = self.evaluate(left, element)?;
                let right = self.evaluate(right, element)?;
                compare(*op, &left, &right).map(Value::Bool)
            }
            Predicate::Has { entity, component } => {
                let has = self
                    .evaluate(entity, element)?
                    .as_entity()
                    .is_some_and(|id| self.world.has_component(&id, component));
                Ok(Value::Bool(has))
            }
            Predicate::GetComponentValue {
                entity,
                component,
                field,
            } => {
                let value = self
                    .evaluate(entity, element)?
                    .as_entity()
                    .and_then(|id| self.world.get_component(&id, component))
                    .and_then(|data| data.walk(field).cloned());
                Ok(value.unwrap_or(Value::Nil))
            }
            Predicate::Var { path, default } => {
                match self.resolve_var(path, element).filter(|v| !v.is_nil()) {
                    Some(value) => Ok(value),
                    None => match default {
                        Some(default) => self.evaluate(default, element),
                        None => Ok(Value::Nil),
                    },
                }
            }
            Predicate::In { needle, haystack } => {
                let needle = self.evaluate(needle, element)?;
                let haystack = self.evaluate(haystack, element)?;
                Ok(Value::Bool(contains(&haystack, &needle)))
            }
            Predicate::Literal(value) => Ok(value.clone()),
            Predicate::List(items) => items
                .iter()
                .map(|item| self.evaluate(item, element))
                .collect::<Result<_>>()
                .map(Value::Vec),
        }
    }

    /// Resolves a `var` path.
    ///
    /// The empty path and `entity` name the element; `actor` and `self`
    /// name the actor; any other root is a binding.
    fn resolve_var(&self, path: &[String], element: &Value) -> Option<Value> {
        let Some((root, rest)) = path.split_first() else {
            return Some(element.clone());
        };
        let start = if root == ELEMENT_ROOT {
            element.clone()
        } else {
            self.context.lookup(root)?
        };
        walk_path(self.world, start, rest)
    }
}

/// Applies a comparison operator.
///
/// Equality is loose and never fails. Orderings compare numbers
/// numerically and two strings lexicographically; an ordering against nil
/// is false, and any other pairing is a type error.
fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool> {
    let ordering = match op {
        CompareOp::Eq => return Ok(left.loose_eq(right)),
        CompareOp::Ne => return Ok(!left.loose_eq(right)),
        _ => order_values(left, right),
    };

    match ordering {
        Some(Some(ordering)) => Ok(match op {
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
            CompareOp::Eq | CompareOp::Ne => false,
        }),
        // Comparable types whose values have no order (NaN).
        Some(None) => Ok(false),
        None if left.is_nil() || right.is_nil() => Ok(false),
        None => Err(Error::predicate_type(
            op.symbol(),
            left.value_type(),
            right.value_type(),
        )),
    }
}

/// Orders two values. The outer `None` means the types are incomparable.
fn order_values(left: &Value, right: &Value) -> Option<Option<Ordering>> {
    if let (Some(_), Some(_)) = (left.as_number(), right.as_number()) {
        return Some(left.numeric_cmp(right));
    }
    match (left, right) {
        (Value::String(_) | Value::EntityRef(_), Value::String(_) | Value::EntityRef(_)) => {
            Some(left.as_str().zip(right.as_str()).map(|(l, r)| l.cmp(r)))
        }
        _ => None,
    }
}

/// List membership, or substring for strings.
fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::Vec(items) => items.iter().any(|item| item.loose_eq(needle)),
        Value::String(text) => needle.as_str().is_some_and(|n| text.contains(n)),
        _ => false,
    }
}
