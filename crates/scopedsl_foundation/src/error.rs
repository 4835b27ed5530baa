//! Error types for the Scope DSL.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! An empty query result is never an error; every variant here means a
//! scope is malformed or misconfigured.

use std::fmt;

use thiserror::Error;

use crate::qualified::QualifiedId;
use crate::types::Type;

/// Result alias used across all Scope DSL crates.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Scope DSL operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a syntax error for malformed definition or expression text.
    #[must_use]
    pub fn syntax(message: impl Into<String>, line: u32, column: u32, snippet: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax {
            message: message.into(),
            line,
            column,
            snippet: snippet.into(),
        })
    }

    /// Creates a predicate syntax error for a malformed embedded filter.
    #[must_use]
    pub fn predicate_syntax(message: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self::new(ErrorKind::PredicateSyntax {
            message: message.into(),
            snippet: snippet.into(),
        })
    }

    /// Creates an unknown scope reference error.
    #[must_use]
    pub fn unknown_reference(key: QualifiedId) -> Self {
        Self::new(ErrorKind::UnknownScopeReference(key))
    }

    /// Creates a cycle error from the resolution chain that revisited a scope.
    #[must_use]
    pub fn cycle(chain: Vec<QualifiedId>) -> Self {
        Self::new(ErrorKind::CycleDetected { chain })
    }

    /// Creates a predicate type error for an ordering comparison.
    #[must_use]
    pub fn predicate_type(op: impl Into<String>, left: Type, right: Type) -> Self {
        Self::new(ErrorKind::PredicateType {
            op: op.into(),
            left,
            right,
        })
    }

    /// Creates a duplicate registration error.
    #[must_use]
    pub fn duplicate(key: QualifiedId) -> Self {
        Self::new(ErrorKind::DuplicateScopeRegistration(key))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true for errors raised while parsing or compiling a scope.
    #[must_use]
    pub const fn is_compile_time(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Syntax { .. } | ErrorKind::PredicateSyntax { .. }
        )
    }

    /// Returns the source line of a syntax error, if known.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match &self.kind {
            ErrorKind::Syntax { line, .. } => usize::try_from(*line).ok(),
            _ => self.context.as_ref().and_then(|c| c.line),
        }
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Malformed definition or expression text.
    #[error("syntax error at {line}:{column}: {message} in `{snippet}`")]
    Syntax {
        /// Description of the problem.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
        /// The offending source text.
        snippet: String,
    },

    /// Malformed embedded filter JSON or an unknown operator.
    #[error("predicate syntax error: {message} in `{snippet}`")]
    PredicateSyntax {
        /// Description of the problem.
        message: String,
        /// The offending predicate text.
        snippet: String,
    },

    /// A scope reference points at a key missing from the registry.
    #[error("unknown scope reference: {0}")]
    UnknownScopeReference(QualifiedId),

    /// A scope reference chain revisited one of its ancestors.
    #[error("scope reference cycle detected: {}", format_chain(.chain))]
    CycleDetected {
        /// The resolution chain, ending with the revisited scope.
        chain: Vec<QualifiedId>,
    },

    /// An ordering comparison between incomparable values.
    #[error("cannot apply `{op}` to {left} and {right}")]
    PredicateType {
        /// The comparison operator.
        op: String,
        /// Type of the left operand.
        left: Type,
        /// Type of the right operand.
        right: Type,
    },

    /// A scope key was registered twice without an override.
    #[error("scope already registered: {0}")]
    DuplicateScopeRegistration(QualifiedId),

    /// A file could not be read.
    #[error("failed to read {path}: {message}")]
    Io {
        /// The path that failed.
        path: String,
        /// The underlying I/O error message.
        message: String,
    },

    /// World data could not be loaded.
    #[error("invalid world data: {0}")]
    WorldData(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

fn format_chain(chain: &[QualifiedId]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Source file or mod name.
    pub source: Option<String>,
    /// Line number in source.
    pub line: Option<usize>,
    /// Column number in source.
    pub column: Option<usize>,
    /// Stack of scopes being resolved, outermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source location.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line and column.
    #[must_use]
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            if let (Some(line), Some(col)) = (self.line, self.column) {
                write!(f, ":{line}:{col}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
