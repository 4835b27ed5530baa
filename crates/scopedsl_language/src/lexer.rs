//! Lexer for the Scope DSL.
//!
//! The lexer converts source text into a stream of tokens. Embedded filter
//! objects are lexed as a single [`TokenKind::Json`] token, tracking brace
//! depth and string escapes, so that `|` or `+` inside a filter never reach
//! the parser as union operators.

use scopedsl_foundation::QualifiedId;

use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Lexer for Scope DSL source text.
pub struct Lexer<'src> {
    /// Source text being tokenized.
    source: &'src str,
    /// Remaining source text.
    rest: &'src str,
    /// Current byte offset in source.
    position: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    column: u32,
    /// Whether the previous token was a `.`, so a digit run is a list index.
    after_dot: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            position: 0,
            line: 1,
            column: 1,
            after_dot: false,
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.position;
        let start_line = self.line;
        let start_column = self.column;

        let Some(c) = self.peek_char() else {
            return Token::new(
                TokenKind::Eof,
                Span::new(start, start, start_line, start_column),
            );
        };

        let kind = match c {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '.' => self.single(TokenKind::Dot),
            '|' => self.single(TokenKind::Pipe),
            '+' => self.single(TokenKind::Plus),
            ':' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::Assign
                } else {
                    TokenKind::Colon
                }
            }
            '#' => self.scan_comment(),
            '"' => self.scan_string(),
            '{' => self.scan_json(),
            c if is_ident_start(c) => self.scan_name(),
            c if c.is_ascii_digit() && self.after_dot => {
                TokenKind::Ident(self.scan_ident_text().to_string())
            }
            c => {
                self.advance();
                TokenKind::Error(format!("unexpected character: {c}"))
            }
        };
        self.after_dot = kind == TokenKind::Dot;

        Token::new(
            kind,
            Span::new(start, self.position, start_line, start_column),
        )
    }

    /// Tokenizes all source and returns a vector of tokens.
    ///
    /// Comments are included in the output.
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    /// Advances past the next character.
    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Scans a comment starting with `#` up to the end of the line.
    fn scan_comment(&mut self) -> TokenKind {
        let start = self.position;
        while self.peek_char().is_some_and(|c| c != '\n') {
            self.advance();
        }
        TokenKind::Comment(self.source[start..self.position].to_string())
    }

    /// Scans a string literal.
    fn scan_string(&mut self) -> TokenKind {
        self.advance(); // consume opening '"'
        let mut text = String::new();
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.peek_char() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some(c) => {
                            return TokenKind::Error(format!("invalid escape sequence: \\{c}"));
                        }
                        None => {
                            return TokenKind::Error(
                                "unexpected end of input in string escape".into(),
                            );
                        }
                    };
                    self.advance();
                    text.push(escaped);
                }
                Some(c) => {
                    self.advance();
                    text.push(c);
                }
                None => {
                    return TokenKind::Error("unterminated string literal".into());
                }
            }
        }
        TokenKind::String(text)
    }

    /// Scans a balanced `{...}` filter object.
    ///
    /// Braces inside JSON strings do not count towards the depth, and a
    /// backslash always escapes the next character inside a string.
    fn scan_json(&mut self) -> TokenKind {
        let start = self.position;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        while let Some(c) = self.peek_char() {
            self.advance();
            if in_string {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    in_string = false;
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return TokenKind::Json(self.source[start..self.position].to_string());
                    }
                }
                _ => {}
            }
        }

        TokenKind::Error("unterminated filter object".into())
    }

    /// Scans an identifier, joining `ident:ident` into a qualified id.
    ///
    /// A `:` directly followed by `=` is left for the `:=` token.
    fn scan_name(&mut self) -> TokenKind {
        let first = self.scan_ident_text();
        let joins = self.peek_char() == Some(':') && self.peek_char_n(1).is_some_and(is_ident_start);
        if !joins {
            return TokenKind::Ident(first.to_string());
        }

        self.advance(); // consume ':'
        let second = self.scan_ident_text();
        TokenKind::Qualified(QualifiedId::new(first, second))
    }

    fn scan_ident_text(&mut self) -> &'src str {
        let start = self.position;
        while self.peek_char().is_some_and(is_ident_char) {
            self.advance();
        }
        &self.source[start..self.position]
    }
}

/// Returns true if `c` can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Returns true if `c` can appear in an identifier after the first char.
fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}
