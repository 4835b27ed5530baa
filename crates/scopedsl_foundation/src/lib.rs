//! Core types, values, and persistent collections for the Scope DSL.
//!
//! This crate provides:
//! - [`Value`] - JSON-shaped dynamic value used for component data
//! - [`EntityId`] - Opaque string entity identifiers
//! - [`QualifiedId`] - `namespace:id` keys for scopes and components
//! - [`Type`] - Type descriptors used in error messages
//! - [`Error`] - Rich error types with context
//! - Persistent collections ([`LtVec`], [`LtMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod collections;
mod entity;
mod error;
pub mod json;
mod qualified;
mod types;
mod value;

pub use collections::{LtMap, LtVec};
pub use entity::{EntityId, EntitySet};
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use qualified::{QualifiedId, RESERVED_NAMESPACES, is_identifier, is_reserved_namespace};
pub use types::Type;
pub use value::Value;
