//! Expression evaluation against a world snapshot.
//!
//! Evaluation works on an ordered, de-duplicated list of candidate values.
//! Component fields may hold ids, lists of ids, or nested records, so
//! candidates stay as [`Value`]s until the end of the query, where the
//! entity-like ones (ids and id strings) form the result set.
//!
//! Scope references are resolved through the registry. Each query keeps
//! a stack of the scopes it is currently inside; meeting one of them again
//! fails with `CycleDetected` instead of recursing forever.

use std::collections::HashSet;

use scopedsl_foundation::{EntitySet, Error, ErrorKind, QualifiedId, Result, Value};
use scopedsl_language::Expression;
use scopedsl_storage::WorldView;
use tracing::debug;

use crate::config::EngineConfig;
use crate::context::{EvaluationContext, walk_path};
use crate::predicate_eval::PredicateEvaluator;
use crate::registry::ScopeRegistry;

// =============================================================================
// Candidates
// =============================================================================

/// Ordered set of intermediate values.
#[derive(Clone, Debug, Default)]
pub struct Candidates {
    items: Vec<Value>,
    seen: HashSet<Value>,
}

impl Candidates {
    /// Creates an empty candidate list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value unless it is nil or already present.
    pub fn push(&mut self, value: Value) {
        if !value.is_nil() && self.seen.insert(value.clone()) {
            self.items.push(value);
        }
    }

    /// Adds a value, expanding a list into its members.
    pub fn push_spread(&mut self, value: Value) {
        match value {
            Value::Vec(items) => items.into_iter().for_each(|item| self.push(item)),
            other => self.push(other),
        }
    }

    /// Adds every value of `other`.
    pub fn extend(&mut self, other: Candidates) {
        other.items.into_iter().for_each(|item| self.push(item));
    }

    /// Returns true if `value` is present.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.seen.contains(value)
    }

    /// Returns the number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates candidates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }

    /// Keeps the entity-like candidates.
    #[must_use]
    pub fn into_entities(self) -> EntitySet {
        self.items.iter().filter_map(Value::as_entity).collect()
    }
}

impl IntoIterator for Candidates {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<Value> for Candidates {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut candidates = Self::new();
        iter.into_iter().for_each(|value| candidates.push(value));
        candidates
    }
}

// =============================================================================
// Evaluator
// =============================================================================

/// Evaluates expressions for one world snapshot.
pub struct Evaluator<'a, W: WorldView + ?Sized> {
    registry: &'a ScopeRegistry,
    world: &'a W,
    config: &'a EngineConfig,
}

impl<'a, W: WorldView + ?Sized> Evaluator<'a, W> {
    /// Creates an evaluator.
    #[must_use]
    pub fn new(registry: &'a ScopeRegistry, world: &'a W, config: &'a EngineConfig) -> Self {
        Self {
            registry,
            world,
            config,
        }
    }

    /// Evaluates a registered scope.
    ///
    /// # Errors
    /// Returns `UnknownScopeReference` if `key` is not registered, even in
    /// lenient mode, and any error raised while evaluating it.
    pub fn evaluate_scope(&self, key: &QualifiedId, context: &EvaluationContext) -> Result<EntitySet> {
        if !self.registry.has(key) {
            return Err(Error::unknown_reference(key.clone()));
        }
        let mut stack = Vec::new();
        self.resolve_reference(key, context, &mut stack)
            .map(Candidates::into_entities)
    }

    /// Evaluates an expression that is not registered.
    ///
    /// # Errors
    /// Returns an error if a referenced scope is unknown (in strict mode),
    /// references form a cycle, or a filter fails.
    pub fn evaluate(&self, expr: &Expression, context: &EvaluationContext) -> Result<EntitySet> {
        self.candidates(expr, context).map(Candidates::into_entities)
    }

    /// Evaluates an expression to its raw candidate values.
    ///
    /// # Errors
    /// As for [`Evaluator::evaluate`].
    pub fn candidates(&self, expr: &Expression, context: &EvaluationContext) -> Result<Candidates> {
        let mut stack = Vec::new();
        self.eval(expr, context, &mut stack)
    }

    fn eval(
        &self,
        expr: &Expression,
        context: &EvaluationContext,
        stack: &mut Vec<QualifiedId>,
    ) -> Result<Candidates> {
        match expr {
            Expression::ComponentAccess {
                base_entity_path,
                component,
                field_path,
            } => {
                let mut out = Candidates::new();
                for base in self.resolve_variable(base_entity_path, context) {
                    let Some(entity) = base.as_entity() else {
                        continue;
                    };
                    let value = self
                        .world
                        .get_component(&entity, component)
                        .and_then(|data| walk_path(self.world, data, field_path));
                    if let Some(value) = value {
                        out.push_spread(value);
                    }
                }
                Ok(out)
            }
            Expression::Variable { path } => Ok(self.resolve_variable(path, context)),
            Expression::Entities { kind } => Ok(self
                .world
                .entities_of_kind(kind)
                .into_iter()
                .map(Value::EntityRef)
                .collect()),
            Expression::Literal { values } => {
                Ok(values.iter().cloned().map(Value::EntityRef).collect())
            }
            Expression::FilteredAccess { base, predicate } => {
                let base = self.eval(base, context, stack)?;
                let predicates = PredicateEvaluator::new(self.world, context);
                let mut kept = Candidates::new();
                for candidate in base.iter() {
                    if predicates.test(predicate, candidate)? {
                        kept.push(candidate.clone());
                    }
                }
                if self.config.check_filter_invariant && !kept.iter().all(|v| base.contains(v)) {
                    return Err(Error::internal("filter produced a value outside its base"));
                }
                Ok(kept)
            }
            Expression::ArrayIteration { base } => {
                let mut out = Candidates::new();
                for candidate in self.eval(base, context, stack)? {
                    match candidate {
                        Value::Map(map) => map.values().cloned().for_each(|v| out.push(v)),
                        other => out.push_spread(other),
                    }
                }
                Ok(out)
            }
            Expression::Union { operands } => {
                let mut out = Candidates::new();
                for operand in operands {
                    out.extend(self.eval(operand, context, stack)?);
                }
                Ok(out)
            }
            Expression::ScopeReference { key } => self.resolve_reference(key, context, stack),
        }
    }

    /// Resolves a dotted context path; lists contribute their members.
    fn resolve_variable(&self, path: &[String], context: &EvaluationContext) -> Candidates {
        let mut out = Candidates::new();
        let value = path.split_first().and_then(|(root, rest)| {
            let start = context.lookup(root)?;
            walk_path(self.world, start, rest)
        });
        if let Some(value) = value {
            out.push_spread(value);
        }
        out
    }

    fn resolve_reference(
        &self,
        key: &QualifiedId,
        context: &EvaluationContext,
        stack: &mut Vec<QualifiedId>,
    ) -> Result<Candidates> {
        if stack.contains(key) {
            let mut chain = stack.clone();
            chain.push(key.clone());
            return Err(Error::cycle(chain));
        }

        let Some(definition) = self.registry.get(key) else {
            if self.config.strict_references {
                return Err(Error::unknown_reference(key.clone()));
            }
            debug!(scope = %key, "unknown scope reference treated as empty");
            return Ok(Candidates::new());
        };

        debug!(scope = %key, depth = stack.len(), "resolving scope reference");
        stack.push(key.clone());
        let result = self.eval(&definition.expression, context, stack);
        stack.pop();
        result.map_err(|err| with_scope_frame(err, key))
    }
}

/// Records that `err` surfaced while evaluating `key`.
///
/// Frames are prepended as the error unwinds, so the finished stack lists
/// the outermost scope first. Cycle errors already carry their chain.
fn with_scope_frame(mut err: Error, key: &QualifiedId) -> Error {
    if matches!(err.kind, ErrorKind::CycleDetected { .. }) {
        return err;
    }
    let mut context = err.context.take().unwrap_or_default();
    context.stack.insert(0, key.to_string());
    err.context = Some(context);
    err
}
