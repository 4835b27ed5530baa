//! Registry of compiled scope definitions.
//!
//! The registry maps `mod:scope` keys to parsed definitions and keeps a
//! per-mod index. Definitions are immutable once registered and shared
//! through `Arc`, so any number of evaluations may read the registry
//! concurrently. Registration and [`ScopeRegistry::clear`] need `&mut self`.
//!
//! Cycle detection is not done here: the evaluator tracks the chain of
//! references it is resolving for each query.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use scopedsl_foundation::{Error, QualifiedId, Result};
use scopedsl_language::ScopeDefinition;

/// Options for a single registration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Replace an existing definition with the same key.
    pub force_override: bool,
}

impl RegisterOptions {
    /// Options that replace an existing definition.
    #[must_use]
    pub fn overriding() -> Self {
        Self {
            force_override: true,
        }
    }
}

/// Stores scope definitions by key.
#[derive(Debug, Default)]
pub struct ScopeRegistry {
    scopes: HashMap<QualifiedId, Arc<ScopeDefinition>>,
    namespaces: HashMap<Arc<str>, BTreeSet<QualifiedId>>,
    generation: u64,
}

impl ScopeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition.
    ///
    /// # Errors
    /// Returns `DuplicateScopeRegistration` if the key is taken and
    /// `options.force_override` is not set.
    pub fn register(&mut self, definition: ScopeDefinition, options: RegisterOptions) -> Result<()> {
        let key = definition.key.clone();
        if !options.force_override && self.scopes.contains_key(&key) {
            return Err(Error::duplicate(key));
        }

        self.namespaces
            .entry(Arc::clone(&key.namespace))
            .or_default()
            .insert(key.clone());
        self.scopes.insert(key, Arc::new(definition));
        Ok(())
    }

    /// Registers every definition, continuing past failures.
    ///
    /// Returns the errors of the definitions that were rejected.
    pub fn register_batch(
        &mut self,
        definitions: impl IntoIterator<Item = ScopeDefinition>,
        options: RegisterOptions,
    ) -> Vec<Error> {
        definitions
            .into_iter()
            .filter_map(|definition| self.register(definition, options).err())
            .collect()
    }

    /// Looks up a definition by its parts.
    #[must_use]
    pub fn resolve(&self, namespace: &str, scope_id: &str) -> Option<Arc<ScopeDefinition>> {
        self.get(&QualifiedId::new(namespace, scope_id)).cloned()
    }

    /// Looks up a definition by key.
    #[must_use]
    pub fn get(&self, key: &QualifiedId) -> Option<&Arc<ScopeDefinition>> {
        self.scopes.get(key)
    }

    /// Returns true if `key` is registered.
    #[must_use]
    pub fn has(&self, key: &QualifiedId) -> bool {
        self.scopes.contains_key(key)
    }

    /// Returns every registered key, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<&QualifiedId> {
        let mut keys: Vec<_> = self.scopes.keys().collect();
        keys.sort();
        keys
    }

    /// Returns the keys registered by one mod, sorted.
    #[must_use]
    pub fn by_namespace(&self, namespace: &str) -> Vec<&QualifiedId> {
        self.namespaces
            .get(namespace)
            .map(|keys| keys.iter().collect())
            .unwrap_or_default()
    }

    /// Returns the scopes that `key` references directly, in source order.
    ///
    /// Returns `None` if `key` is not registered.
    #[must_use]
    pub fn dependencies(&self, key: &QualifiedId) -> Option<Vec<QualifiedId>> {
        self.get(key).map(|definition| {
            definition
                .expression
                .scope_references()
                .into_iter()
                .cloned()
                .collect()
        })
    }

    /// Returns `(scope, missing reference)` pairs for references that
    /// point at unregistered keys, sorted.
    #[must_use]
    pub fn unresolved(&self) -> Vec<(QualifiedId, QualifiedId)> {
        let mut missing: Vec<_> = self
            .scopes
            .iter()
            .flat_map(|(key, definition)| {
                definition
                    .expression
                    .scope_references()
                    .into_iter()
                    .filter(|reference| !self.has(reference))
                    .map(|reference| (key.clone(), reference.clone()))
            })
            .collect();
        missing.sort();
        missing
    }

    /// Removes every definition and starts a new generation.
    pub fn clear(&mut self) {
        self.scopes.clear();
        self.namespaces.clear();
        self.generation += 1;
    }

    /// Returns the number of times the registry has been cleared.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
