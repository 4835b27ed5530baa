//! The scope engine: loading scope files and answering queries.

use std::fs;
use std::path::Path;

use scopedsl_foundation::{EntitySet, Error, ErrorContext, ErrorKind, QualifiedId, Result};
use scopedsl_language::{Expression, parse_expression, parse_file};
use scopedsl_storage::WorldView;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::context::EvaluationContext;
use crate::evaluator::Evaluator;
use crate::registry::{RegisterOptions, ScopeRegistry};

/// The outcome of loading one scope source.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Where the source came from, usually a file path.
    pub origin: String,
    /// Keys registered from this source, in file order.
    pub registered: Vec<QualifiedId>,
    /// Parse and registration failures.
    pub errors: Vec<Error>,
}

impl LoadReport {
    /// Returns true if every definition was registered.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Owns a scope registry and evaluates scopes against world snapshots.
#[derive(Debug, Default)]
pub struct ScopeEngine {
    registry: ScopeRegistry,
    config: EngineConfig,
}

impl ScopeEngine {
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with a custom configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            registry: ScopeRegistry::new(),
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &ScopeRegistry {
        &self.registry
    }

    /// Returns the registry for direct registration.
    pub fn registry_mut(&mut self) -> &mut ScopeRegistry {
        &mut self.registry
    }

    /// Parses and registers every definition in `source`.
    ///
    /// Malformed definitions and duplicate keys are reported in the
    /// returned [`LoadReport`]; the remaining definitions still register.
    pub fn load_source(&mut self, origin: &str, source: &str) -> LoadReport {
        let parsed = parse_file(source);
        let mut report = LoadReport {
            origin: origin.to_string(),
            ..LoadReport::default()
        };

        for failure in parsed.errors {
            warn!(origin, line = failure.line, error = %failure.error, "skipping malformed scope definition");
            report
                .errors
                .push(attach_origin(failure.error, origin, failure.line));
        }

        let options = RegisterOptions {
            force_override: self.config.allow_override,
        };
        for definition in parsed.definitions {
            let key = definition.key.clone();
            let line = definition.source_line;
            match self.registry.register(definition, options) {
                Ok(()) => report.registered.push(key),
                Err(error) => {
                    warn!(origin, line, scope = %key, "scope already registered");
                    report.errors.push(attach_origin(error, origin, line));
                }
            }
        }

        debug!(
            origin,
            registered = report.registered.len(),
            errors = report.errors.len(),
            "loaded scope source"
        );
        report
    }

    /// Reads and loads a scope file.
    ///
    /// # Errors
    /// Returns an `Io` error if the file cannot be read. Problems inside
    /// the file are reported through the [`LoadReport`].
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<LoadReport> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            Error::new(ErrorKind::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })?;
        Ok(self.load_source(&path.display().to_string(), &source))
    }

    /// Clears the registry and loads `sources` as `(origin, text)` pairs.
    pub fn reload<'s>(
        &mut self,
        sources: impl IntoIterator<Item = (&'s str, &'s str)>,
    ) -> Vec<LoadReport> {
        self.registry.clear();
        debug!(generation = self.registry.generation(), "registry cleared for reload");
        sources
            .into_iter()
            .map(|(origin, source)| self.load_source(origin, source))
            .collect()
    }

    /// Evaluates a registered scope.
    ///
    /// An empty set means there are no candidates; an error means the
    /// scope is misconfigured.
    ///
    /// # Errors
    /// Returns `UnknownScopeReference`, `CycleDetected` or
    /// `PredicateType` errors from evaluation.
    pub fn evaluate<W: WorldView + ?Sized>(
        &self,
        world: &W,
        key: &QualifiedId,
        context: &EvaluationContext,
    ) -> Result<EntitySet> {
        debug!(scope = %key, actor = %context.actor, "evaluating scope");
        let result = Evaluator::new(&self.registry, world, &self.config).evaluate_scope(key, context);
        if let Ok(entities) = &result {
            debug!(scope = %key, count = entities.len(), "scope evaluated");
        }
        result
    }

    /// Evaluates an ad-hoc expression against the registered scopes.
    ///
    /// # Errors
    /// As for [`ScopeEngine::evaluate`].
    pub fn evaluate_expression<W: WorldView + ?Sized>(
        &self,
        world: &W,
        expr: &Expression,
        context: &EvaluationContext,
    ) -> Result<EntitySet> {
        Evaluator::new(&self.registry, world, &self.config).evaluate(expr, context)
    }

    /// Parses and evaluates expression source text.
    ///
    /// # Errors
    /// Returns a syntax error if `source` does not parse, or any
    /// evaluation error.
    pub fn query<W: WorldView + ?Sized>(
        &self,
        world: &W,
        source: &str,
        context: &EvaluationContext,
    ) -> Result<EntitySet> {
        let expr = parse_expression(source)?;
        self.evaluate_expression(world, &expr, context)
    }

    /// Evaluates a scope for action discovery.
    ///
    /// Errors are logged and yield `None`, so one broken scope never
    /// stops discovery of other actions.
    pub fn discover<W: WorldView + ?Sized>(
        &self,
        world: &W,
        key: &QualifiedId,
        context: &EvaluationContext,
    ) -> Option<EntitySet> {
        match self.evaluate(world, key, context) {
            Ok(entities) => Some(entities),
            Err(error) => {
                warn!(scope = %key, %error, "scope evaluation failed during discovery");
                None
            }
        }
    }
}

/// Tags an error with the source it came from, keeping any position the
/// parser already recorded.
fn attach_origin(mut error: Error, origin: &str, line: usize) -> Error {
    let context = error
        .context
        .take()
        .unwrap_or_else(|| ErrorContext::new().with_position(line, 1))
        .with_source(origin);
    error.with_context(context)
}
