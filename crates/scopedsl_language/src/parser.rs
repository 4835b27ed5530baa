//! Recursive-descent parser for scope expressions and definitions.
//!
//! ```text
//! definition := qualifiedId ":=" expression
//! expression := filterExpr ( ("|" | "+") filterExpr )*
//! filterExpr := iterExpr ( "[" json "]" )?
//! iterExpr   := accessExpr ( "[" "]" )?
//! accessExpr := source ( "." segment )*
//! source     := segment | "entities" "(" qualifiedId ")" | string
//! segment    := identifier | qualifiedId
//! ```
//!
//! An access path becomes a component access at the `components` marker
//! (`actor.components.mod:comp.field`) or at the first qualified segment
//! after the base (`actor.mod:comp.field`). A lone qualified id is a scope
//! reference, and any other dotted path reads the evaluation context.

use scopedsl_foundation::{EntityId, Error, ErrorContext, QualifiedId, Result};

use crate::ast::{Expression, ScopeDefinition};
use crate::lexer::Lexer;
use crate::predicate::Predicate;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// The segment that marks a component access.
const COMPONENTS_MARKER: &str = "components";

/// One `.`-separated segment of an access path.
enum Segment {
    Ident(String),
    Qualified(QualifiedId),
}

/// Parser for Scope DSL source text.
pub struct Parser<'src> {
    /// The lexer providing tokens.
    lexer: Lexer<'src>,
    /// Current token (lookahead).
    current: Token,
    /// Source text (for error snippets).
    source: &'src str,
    /// Lines preceding `source` in its file.
    line_offset: u32,
}

impl<'src> Parser<'src> {
    /// Creates a new parser for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self::with_line_offset(source, 0)
    }

    /// Creates a parser for text that starts `line_offset` lines into a
    /// file, so reported line numbers are file-relative.
    #[must_use]
    pub fn with_line_offset(source: &'src str, line_offset: u32) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        let mut parser = Self {
            lexer,
            current,
            source,
            line_offset,
        };
        parser.skip_trivia();
        parser
    }

    /// Parses a complete expression; trailing input is an error.
    ///
    /// # Errors
    /// Returns a syntax or predicate syntax error if the source is malformed.
    pub fn parse_expression(&mut self) -> Result<Expression> {
        let expr = self.parse_union()?;
        self.expect_end()?;
        Ok(expr)
    }

    /// Parses a complete `mod:scope := expression` definition.
    ///
    /// # Errors
    /// Returns a syntax or predicate syntax error if the source is malformed.
    pub fn parse_definition(&mut self) -> Result<ScopeDefinition> {
        let start = self.current.span;
        let key = match &self.current.kind {
            TokenKind::Qualified(key) => key.clone(),
            TokenKind::Ident(name) => {
                return Err(self.error(&format!(
                    "scope name `{name}` must be qualified as `mod:scope`"
                )));
            }
            TokenKind::Error(msg) => return Err(self.error(msg)),
            other => {
                return Err(self.error(&format!("expected scope name, found {}", other.name())));
            }
        };
        self.advance();

        if self.current.kind != TokenKind::Assign {
            return Err(self.error(&format!(
                "expected ':=' after scope name, found {}",
                self.current.kind.name()
            )));
        }
        self.advance();

        let expression = self.parse_expression()?;
        Ok(ScopeDefinition::new(
            key,
            expression,
            self.absolute_line(start.line) as usize,
        ))
    }

    /// Parses `filterExpr ( ("|" | "+") filterExpr )*`.
    fn parse_union(&mut self) -> Result<Expression> {
        let mut operands = vec![self.parse_postfix()?];
        while self.current.kind.is_union_operator() {
            self.advance();
            operands.push(self.parse_postfix()?);
        }

        if operands.len() == 1 {
            Ok(operands.remove(0))
        } else {
            Ok(Expression::Union { operands })
        }
    }

    /// Parses an access path followed by an optional `[]` and an optional
    /// `[{...}]` filter, in that order.
    fn parse_postfix(&mut self) -> Result<Expression> {
        let mut expr = self.parse_access()?;
        let mut iterated = false;

        while self.current.kind == TokenKind::LBracket {
            let open = self.current.span;
            self.advance();

            match &self.current.kind {
                TokenKind::RBracket if !iterated => {
                    self.advance();
                    iterated = true;
                    expr = Expression::ArrayIteration {
                        base: Box::new(expr),
                    };
                }
                TokenKind::RBracket => {
                    return Err(self.error_at(open, "array iteration `[]` may appear only once"));
                }
                TokenKind::Json(text) => {
                    let predicate = self.parse_predicate(text)?;
                    self.advance();
                    self.expect(&TokenKind::RBracket)?;
                    return Ok(Expression::FilteredAccess {
                        base: Box::new(expr),
                        predicate,
                    });
                }
                TokenKind::Error(msg) => return Err(self.error(msg)),
                other => {
                    return Err(self.error(&format!(
                        "expected ']' or a filter object after '[', found {}",
                        other.name()
                    )));
                }
            }
        }

        Ok(expr)
    }

    /// Parses a source followed by `.segment`s.
    fn parse_access(&mut self) -> Result<Expression> {
        let start = self.current.span;
        let first = match &self.current.kind {
            TokenKind::Ident(name) => Segment::Ident(name.clone()),
            TokenKind::Qualified(key) => Segment::Qualified(key.clone()),
            TokenKind::String(value) => {
                let values = vec![EntityId::from(value.as_str())];
                self.advance();
                return Ok(Expression::Literal { values });
            }
            TokenKind::Error(msg) => return Err(self.error(msg)),
            other => {
                return Err(self.error(&format!("expected expression, found {}", other.name())));
            }
        };
        self.advance();

        if matches!(&first, Segment::Ident(name) if name == "entities")
            && self.current.kind == TokenKind::LParen
        {
            return self.parse_entities();
        }

        let mut segments = vec![first];
        while self.current.kind == TokenKind::Dot {
            self.advance();
            match &self.current.kind {
                TokenKind::Ident(name) => segments.push(Segment::Ident(name.clone())),
                TokenKind::Qualified(key) => segments.push(Segment::Qualified(key.clone())),
                other => {
                    return Err(self.error(&format!(
                        "expected field name after '.', found {}",
                        other.name()
                    )));
                }
            }
            self.advance();
        }

        self.build_access(segments, start)
    }

    /// Parses `( mod:comp )` after the `entities` keyword.
    fn parse_entities(&mut self) -> Result<Expression> {
        self.expect(&TokenKind::LParen)?;
        let TokenKind::Qualified(kind) = &self.current.kind else {
            return Err(self.error(&format!(
                "expected `mod:component` inside entities(...), found {}",
                self.current.kind.name()
            )));
        };
        let kind = kind.clone();
        self.advance();
        self.expect(&TokenKind::RParen)?;
        Ok(Expression::Entities { kind })
    }

    /// Classifies a dotted path.
    fn build_access(&self, segments: Vec<Segment>, start: Span) -> Result<Expression> {
        let mut segments = segments.into_iter().peekable();
        let mut base = Vec::new();

        match segments.next() {
            Some(Segment::Qualified(key)) => {
                if segments.peek().is_some() {
                    return Err(self.error_at(
                        start,
                        &format!("scope reference `{key}` cannot be followed by a field path"),
                    ));
                }
                return Ok(Expression::ScopeReference { key });
            }
            Some(Segment::Ident(name)) if name == COMPONENTS_MARKER => {
                return Err(self.error_at(start, "expected an entity before `components`"));
            }
            Some(Segment::Ident(name)) if name == "none" && segments.peek().is_none() => {
                return Ok(Expression::Literal { values: Vec::new() });
            }
            Some(Segment::Ident(name)) => base.push(name),
            None => return Err(self.error_at(start, "expected expression")),
        }

        while let Some(segment) = segments.next() {
            let component = match segment {
                Segment::Qualified(component) => component,
                Segment::Ident(name) if name == COMPONENTS_MARKER => match segments.next() {
                    Some(Segment::Qualified(component)) => component,
                    _ => {
                        return Err(self.error_at(
                            start,
                            "expected `mod:component` after `components`",
                        ));
                    }
                },
                Segment::Ident(name) => {
                    base.push(name);
                    continue;
                }
            };

            let field_path = segments
                .map(|segment| match segment {
                    Segment::Ident(name) => name,
                    Segment::Qualified(key) => key.to_string(),
                })
                .collect();
            return Ok(Expression::ComponentAccess {
                base_entity_path: base,
                component,
                field_path,
            });
        }

        Ok(Expression::Variable { path: base })
    }

    /// Parses filter JSON, attaching the filter's position to any error.
    fn parse_predicate(&self, text: &str) -> Result<Predicate> {
        let span = self.current.span;
        Predicate::parse(text).map_err(|e| {
            e.with_context(
                ErrorContext::new()
                    .with_position(self.absolute_line(span.line) as usize, span.column as usize),
            )
        })
    }

    /// Skips comment tokens.
    fn skip_trivia(&mut self) {
        while self.current.kind.is_trivia() {
            self.current = self.lexer.next_token();
        }
    }

    /// Advances to the next non-trivia token.
    fn advance(&mut self) {
        self.current = self.lexer.next_token();
        self.skip_trivia();
    }

    /// Expects the current token to be of a specific kind, then advances.
    fn expect(&mut self, expected: &TokenKind) -> Result<()> {
        if std::mem::discriminant(&self.current.kind) == std::mem::discriminant(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!(
                "expected {}, found {}",
                expected.name(),
                self.current.kind.name()
            )))
        }
    }

    /// Fails unless all input has been consumed.
    fn expect_end(&self) -> Result<()> {
        match &self.current.kind {
            TokenKind::Eof => Ok(()),
            TokenKind::Error(msg) => Err(self.error(msg)),
            other => Err(self.error(&format!("unexpected {} after expression", other.name()))),
        }
    }

    fn absolute_line(&self, line: u32) -> u32 {
        self.line_offset.saturating_add(line)
    }

    /// Creates a syntax error at the current position.
    fn error(&self, message: &str) -> Error {
        self.error_at(self.current.span, message)
    }

    /// Creates a syntax error at a specific span.
    fn error_at(&self, span: Span, message: &str) -> Error {
        Error::syntax(
            message,
            self.absolute_line(span.line),
            span.column,
            span.line_text(self.source).trim(),
        )
    }
}

/// Parses a standalone expression.
///
/// # Errors
/// Returns an error if the source cannot be parsed.
pub fn parse_expression(source: &str) -> Result<Expression> {
    Parser::new(source).parse_expression()
}

/// Parses a single `mod:scope := expression` definition.
///
/// # Errors
/// Returns an error if the source cannot be parsed.
pub fn parse_definition(source: &str) -> Result<ScopeDefinition> {
    Parser::new(source).parse_definition()
}
