//! Lexer, parser and pretty-printer for the Scope DSL.
//!
//! This crate provides:
//! - `Lexer` - Tokenization of scope source text
//! - `Parser` - Parsing tokens into [`Expression`] trees and definitions
//! - `Predicate` - The JSON-Logic filter language used inside `[...]`
//! - `parse_file` - Whole-file parsing with per-definition error recovery
//! - `extract_references` - Cross-mod dependency extraction

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod predicate;
pub mod pretty;
pub mod references;
pub mod source_file;
pub mod span;
pub mod token;


pub use ast::{Expression, ScopeDefinition};
pub use lexer::Lexer;
pub use parser::{Parser, parse_definition, parse_expression};
pub use predicate::{CompareOp, Predicate};
pub use references::{ExtractedReferences, ReferenceMap, extract_references, scan_references};
pub use source_file::{DefinitionChunk, FileParse, ParseFailure, parse_file, split_definitions};
pub use span::Span;
pub use token::{Token, TokenKind};
