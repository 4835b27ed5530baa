//! Session state for the REPL.
//!
//! The session holds the scope engine, the current world snapshot, and the
//! evaluation context (actor and bindings) that every query runs with.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use scopedsl_engine::{EngineConfig, EvaluationContext, LoadReport, ScopeEngine};
use scopedsl_foundation::{EntityId, EntitySet, Error, ErrorKind, QualifiedId, Result, Value};
use scopedsl_storage::World;
use tracing::debug;

/// The actor queries run as until `:actor` changes it.
pub const DEFAULT_ACTOR: &str = "core:player";

/// Session state for an interactive REPL session.
pub struct Session {
    /// The engine holding every loaded scope.
    engine: ScopeEngine,

    /// The current world snapshot.
    world: World,

    /// The entity that `actor` and `self` resolve to.
    actor: EntityId,

    /// Extra context variables (from `:bind`).
    bindings: BTreeMap<String, Value>,

    /// Current load path for relative file resolution.
    load_path: PathBuf,

    /// Scope files loaded so far, in load order, for `:reload`.
    scope_files: Vec<PathBuf>,
}

impl Session {
    /// Creates a session with an empty world and a lenient engine.
    ///
    /// The REPL is a tooling surface, so unknown references evaluate to
    /// empty and redefinitions replace earlier ones.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::tooling())
    }

    /// Creates a session with an engine configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            engine: ScopeEngine::with_config(config),
            world: World::new(),
            actor: EntityId::from(DEFAULT_ACTOR),
            bindings: BTreeMap::new(),
            load_path: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            scope_files: Vec::new(),
        }
    }

    /// Replaces the world.
    #[must_use]
    pub fn with_world(mut self, world: World) -> Self {
        self.world = world;
        self
    }

    /// Returns the engine.
    #[must_use]
    pub const fn engine(&self) -> &ScopeEngine {
        &self.engine
    }

    /// Returns the engine for direct registration.
    pub fn engine_mut(&mut self) -> &mut ScopeEngine {
        &mut self.engine
    }

    /// Returns the current world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Replaces the current world.
    pub fn set_world(&mut self, world: World) {
        self.world = world;
    }

    /// Returns the current actor.
    #[must_use]
    pub const fn actor(&self) -> &EntityId {
        &self.actor
    }

    /// Changes the actor.
    pub fn set_actor(&mut self, actor: impl Into<EntityId>) {
        self.actor = actor.into();
    }

    /// Binds a context variable.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Removes a context variable, returning its old value.
    pub fn unbind(&mut self, name: &str) -> Option<Value> {
        self.bindings.remove(name)
    }

    /// Returns all context variables.
    #[must_use]
    pub const fn bindings(&self) -> &BTreeMap<String, Value> {
        &self.bindings
    }

    /// Builds the evaluation context for a query.
    #[must_use]
    pub fn context(&self) -> EvaluationContext {
        EvaluationContext {
            actor: self.actor.clone(),
            bindings: self.bindings.clone(),
        }
    }

    /// Returns the current load path.
    #[must_use]
    pub const fn load_path(&self) -> &PathBuf {
        &self.load_path
    }

    /// Sets the load path.
    pub fn set_load_path(&mut self, path: PathBuf) {
        self.load_path = path;
    }

    /// Resolves a path relative to the current load path.
    #[must_use]
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.load_path.join(path)
        }
    }

    /// Returns the scope files loaded so far.
    #[must_use]
    pub fn scope_files(&self) -> &[PathBuf] {
        &self.scope_files
    }

    /// Loads a scope file into the engine.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the file cannot be read. Problems inside the
    /// file are reported through the [`LoadReport`].
    pub fn load_scopes(&mut self, path: &str) -> Result<LoadReport> {
        let resolved = self.resolve_path(path);
        let report = self.engine.load_file(&resolved)?;
        if !self.scope_files.contains(&resolved) {
            self.scope_files.push(resolved);
        }
        Ok(report)
    }

    /// Loads scope definitions typed directly into the session.
    pub fn load_source(&mut self, origin: &str, source: &str) -> LoadReport {
        self.engine.load_source(origin, source)
    }

    /// Clears the engine and loads every scope file again.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if a previously loaded file can no longer be
    /// read; the registry is left cleared in that case.
    pub fn reload_scopes(&mut self) -> Result<Vec<LoadReport>> {
        let mut sources = Vec::with_capacity(self.scope_files.len());
        for path in &self.scope_files {
            sources.push((path.display().to_string(), read_file(path)?));
        }
        debug!(files = sources.len(), "reloading scope files");
        Ok(self
            .engine
            .reload(sources.iter().map(|(origin, text)| (origin.as_str(), text.as_str()))))
    }

    /// Loads a JSON world file, replacing the current world.
    ///
    /// Returns the number of entities loaded.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the file cannot be read, or a `WorldData`
    /// error if it does not describe a world.
    pub fn load_world(&mut self, path: &str) -> Result<usize> {
        let resolved = self.resolve_path(path);
        let world = World::from_json_str(&read_file(&resolved)?)?;
        let count = world.entity_count();
        debug!(path = %resolved.display(), entities = count, "world loaded");
        self.world = world;
        Ok(count)
    }

    /// Evaluates a registered scope as the current actor.
    ///
    /// # Errors
    ///
    /// Returns any evaluation error from the engine.
    pub fn evaluate(&self, key: &QualifiedId) -> Result<EntitySet> {
        self.engine.evaluate(&self.world, key, &self.context())
    }

    /// Parses and evaluates an ad-hoc expression.
    ///
    /// # Errors
    ///
    /// Returns a syntax error or any evaluation error.
    pub fn query(&self, source: &str) -> Result<EntitySet> {
        self.engine.query(&self.world, source, &self.context())
    }

    /// Returns every component of an entity as a map.
    #[must_use]
    pub fn describe_entity(&self, entity: &EntityId) -> Option<Value> {
        if !self.world.exists(entity) {
            return None;
        }
        Some(Value::map(
            self.world.entity_components(entity).iter().map(|component| {
                let value = self.world.get(entity, component).cloned().unwrap_or(Value::Nil);
                (component.to_string(), value)
            }),
        ))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads a whole file, mapping failures to an `Io` error.
pub(crate) fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        Error::new(ErrorKind::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    })
}
