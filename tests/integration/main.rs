//! End-to-end tests across all layers
//!
//! Scope files are loaded into an engine, evaluated against JSON worlds,
//! and driven through the REPL the way a modder would use them.

mod properties;
mod scenarios;
