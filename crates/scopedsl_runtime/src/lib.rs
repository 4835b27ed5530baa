//! REPL and CLI for the Scope DSL.
//!
//! This crate provides:
//! - [`Repl`] - Interactive read-eval-print loop over a [`Session`]
//! - [`Session`] - Loaded scopes, a world snapshot, the actor and bindings
//! - The `scopedsl` binary for loading scope files and worlds from the shell

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod editor;
mod highlight;
pub mod repl;
pub mod session;

pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::Repl;
pub use session::{DEFAULT_ACTOR, Session};
