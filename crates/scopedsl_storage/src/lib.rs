//! Entity-component world access for the Scope DSL.
//!
//! This crate provides:
//! - [`WorldView`] - The read contract the evaluator depends on
//! - [`ComponentStore`] - Archetype-tracked component storage
//! - [`World`] - Immutable in-memory world implementing [`WorldView`]
//! - JSON world loading ([`World::from_json_str`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod component;
mod loader;
mod view;
mod world;

pub use component::{Archetype, ComponentStore};
pub use view::WorldView;
pub use world::World;
