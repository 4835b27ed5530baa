//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, EntityId, QualifiedId, Error and JSON conversion.

mod errors;
mod identifiers;
mod values;
