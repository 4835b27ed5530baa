//! Scope registry, evaluation, and layered resolution for the Scope DSL.
//!
//! This crate provides:
//! - [`ScopeRegistry`] - Storage of parsed scope definitions
//! - [`Evaluator`] - Expression evaluation against a [`WorldView`](scopedsl_storage::WorldView)
//! - [`PredicateEvaluator`] - JSON-Logic filter evaluation
//! - [`BlockingResolver`] - Topmost-item and removal-blocking rules
//! - [`ScopeEngine`] - Loading scope files and answering queries

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod blocking;
pub mod config;
pub mod context;
pub mod engine;
pub mod evaluator;
pub mod predicate_eval;
pub mod registry;

pub use blocking::{BlockingResolver, BlockingSchema, resolve_scope};
pub use config::EngineConfig;
pub use context::EvaluationContext;
pub use engine::{LoadReport, ScopeEngine};
pub use evaluator::{Candidates, Evaluator};
pub use predicate_eval::PredicateEvaluator;
pub use registry::{RegisterOptions, ScopeRegistry};
