//! Syntax highlighting for the REPL.

use std::borrow::Cow;

use scopedsl_language::{Lexer, TokenKind};

const RESET: &str = "\x1b[0m";

/// Highlighter for Scope DSL syntax.
///
/// Expressions are colored token by token using the real lexer, so the
/// colors always agree with how the line will parse.
pub struct ScopeHighlighter;

impl ScopeHighlighter {
    /// Creates a new highlighter.
    pub const fn new() -> Self {
        Self
    }

    /// Highlight a line of input.
    #[allow(clippy::unused_self)]
    pub fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.is_empty() {
            return Cow::Borrowed(line);
        }

        // REPL commands: color the command word, then the argument as an
        // expression when the command takes one.
        if let Some(command) = line.strip_prefix(':') {
            let word_len = command.find(char::is_whitespace).unwrap_or(command.len());
            let (word, rest) = command.split_at(word_len);
            let rest = if matches!(word, "parse" | "p") {
                highlight_expression(rest)
            } else {
                rest.to_string()
            };
            return Cow::Owned(format!("\x1b[1;32m:{word}{RESET}{rest}"));
        }

        Cow::Owned(highlight_expression(line))
    }
}

impl Default for ScopeHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Colors each token, copying the whitespace between tokens unchanged.
fn highlight_expression(source: &str) -> String {
    let mut result = String::with_capacity(source.len() * 2);
    let mut copied = 0;

    for token in Lexer::tokenize_all(source) {
        if token.kind == TokenKind::Eof {
            break;
        }
        let (start, end) = (token.span.start, token.span.end);
        if start < copied || end > source.len() {
            break;
        }
        result.push_str(&source[copied..start]);
        let text = &source[start..end];

        match color_of(&token.kind) {
            Some(color) => {
                result.push_str(color);
                result.push_str(text);
                result.push_str(RESET);
            }
            None => result.push_str(text),
        }
        copied = end;
    }

    result.push_str(&source[copied.min(source.len())..]);
    result
}

fn color_of(kind: &TokenKind) -> Option<&'static str> {
    match kind {
        TokenKind::Qualified(_) => Some("\x1b[36m"),         // cyan
        TokenKind::String(_) => Some("\x1b[33m"),            // yellow
        TokenKind::Json(_) => Some("\x1b[35m"),              // magenta
        TokenKind::Assign | TokenKind::Pipe | TokenKind::Plus => Some("\x1b[1m"),
        TokenKind::Comment(_) => Some("\x1b[2;3m"),          // dim italic
        TokenKind::Error(_) => Some("\x1b[31m"),             // red
        TokenKind::Ident(name) if matches!(name.as_str(), "actor" | "self" | "none" | "entities") => {
            Some("\x1b[34m")
        }
        _ => None,
    }
}
