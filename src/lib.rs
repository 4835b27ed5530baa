//! Scope DSL - a query language that selects entity sets from a world
//!
//! This crate re-exports all layers of the Scope DSL for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 4: scopedsl_runtime    — REPL, CLI, session state
//! Layer 3: scopedsl_engine     — Registry, evaluation, blocking resolution
//! Layer 2: scopedsl_language   — Lexer, parser, predicates, reference extraction
//! Layer 1: scopedsl_storage    — Entity-component world snapshots
//! Layer 0: scopedsl_foundation — Core types (Value, EntityId, QualifiedId, Error)
//! ```

pub use scopedsl_engine as engine;
pub use scopedsl_foundation as foundation;
pub use scopedsl_language as language;
pub use scopedsl_runtime as runtime;
pub use scopedsl_storage as storage;
