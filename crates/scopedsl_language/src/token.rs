//! Token types for the Scope DSL.
//!
//! Tokens are the output of the lexer and input to the parser.

use scopedsl_foundation::QualifiedId;

use crate::span::Span;

/// A token from lexical analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The type and value of this token.
    pub kind: TokenKind,
    /// Source location of this token.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the text this token covers in the given source.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }
}

/// Token types for the Scope DSL.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,

    // Operators
    /// `:=`
    Assign,
    /// `.`
    Dot,
    /// `|`
    Pipe,
    /// `+`
    Plus,
    /// A `:` that is not part of a qualified id or `:=`
    Colon,

    // Atoms
    /// Bare identifier like `actor` or `partners`
    Ident(String),
    /// `mod:id` with no surrounding whitespace
    Qualified(QualifiedId),
    /// String literal like `"core:player"`
    String(String),
    /// Raw text of an embedded `{...}` filter object
    Json(String),

    // Meta
    /// Comment text (including `#`)
    Comment(String),
    /// End of input
    Eof,
    /// Lexer error
    Error(String),
}

impl TokenKind {
    /// Returns true if this token kind should be ignored during parsing.
    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        matches!(self, Self::Comment(_))
    }

    /// Returns true if this token separates union operands.
    #[must_use]
    pub const fn is_union_operator(&self) -> bool {
        matches!(self, Self::Pipe | Self::Plus)
    }

    /// Returns a human-readable name for this token kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::Assign => "':='",
            Self::Dot => "'.'",
            Self::Pipe => "'|'",
            Self::Plus => "'+'",
            Self::Colon => "':'",
            Self::Ident(_) => "identifier",
            Self::Qualified(_) => "qualified id",
            Self::String(_) => "string",
            Self::Json(_) => "filter object",
            Self::Comment(_) => "comment",
            Self::Eof => "end of input",
            Self::Error(_) => "error",
        }
    }
}
