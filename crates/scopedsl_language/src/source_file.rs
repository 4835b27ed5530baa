//! Whole-file parsing with per-definition error collection.
//!
//! A scope file holds one or more definitions, `#` comment lines and blank
//! lines. A definition continues onto following lines while its brackets
//! are unbalanced, while a line ends with `|`, `+` or `:=`, or while the
//! next line starts with `|`, `+`, `.` or `[`.
//! One malformed definition never stops its siblings from parsing.

use scopedsl_foundation::Error;

use crate::ast::ScopeDefinition;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::references::{ReferenceMap, scan_references};
use crate::token::TokenKind;

/// Characters that continue the previous definition when they start a line.
const CONTINUATION_CHARS: [char; 4] = ['|', '+', '.', '['];

/// The source text of one definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinitionChunk {
    /// 1-based line the definition starts on.
    pub line: usize,
    /// The definition text, possibly spanning several lines.
    pub text: String,
}

/// A definition that failed to parse.
#[derive(Debug)]
pub struct ParseFailure {
    /// The syntax or predicate error.
    pub error: Error,
    /// 1-based line the failed definition starts on.
    pub line: usize,
    /// The offending definition text.
    pub text: String,
    /// References recovered from the text by the fallback scan.
    pub partial_references: ReferenceMap,
}

/// The result of parsing a whole file.
#[derive(Debug, Default)]
pub struct FileParse {
    /// Definitions that parsed, in file order.
    pub definitions: Vec<ScopeDefinition>,
    /// Definitions that did not.
    pub errors: Vec<ParseFailure>,
}

impl FileParse {
    /// Returns true if every definition parsed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parses every definition in a scope file.
#[must_use]
pub fn parse_file(source: &str) -> FileParse {
    let mut result = FileParse::default();

    for chunk in split_definitions(source) {
        let line_offset = u32::try_from(chunk.line - 1).unwrap_or(u32::MAX);
        match Parser::with_line_offset(&chunk.text, line_offset).parse_definition() {
            Ok(definition) => result.definitions.push(definition),
            Err(error) => result.errors.push(ParseFailure {
                partial_references: scan_references(&chunk.text),
                error,
                line: chunk.line,
                text: chunk.text,
            }),
        }
    }

    result
}

/// Splits a file into definition chunks, dropping comments and blank lines
/// between definitions.
#[must_use]
pub fn split_definitions(source: &str) -> Vec<DefinitionChunk> {
    let lines: Vec<&str> = source.lines().collect();
    let mut chunks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let trimmed = lines[i].trim();
        if is_filler(trimmed) {
            i += 1;
            continue;
        }

        let start = i;
        let mut text = lines[i].to_string();
        let mut depth = DepthTracker::default();
        depth.feed(lines[i]);
        i += 1;

        while i < lines.len() {
            // Comment and blank lines belong to the definition only when a
            // continuation line follows them.
            let Some(next_code) = (i..lines.len()).find(|&j| !is_filler(lines[j])) else {
                break;
            };
            let next = lines[next_code].trim_start();
            let continues = if depth.is_open() || depth.dangling {
                !starts_definition(next)
            } else {
                next.starts_with(CONTINUATION_CHARS)
            };
            if !continues {
                break;
            }
            for line in &lines[i..=next_code] {
                text.push('\n');
                text.push_str(line);
                depth.feed(line);
            }
            i = next_code + 1;
        }

        chunks.push(DefinitionChunk {
            line: start + 1,
            text,
        });
    }

    chunks
}

/// Returns true for blank lines and `#` comment lines.
fn is_filler(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Returns true if `line` begins with `mod:id :=`.
fn starts_definition(line: &str) -> bool {
    let mut lexer = Lexer::new(line);
    matches!(lexer.next_token().kind, TokenKind::Qualified(_))
        && lexer.next_token().kind == TokenKind::Assign
}

/// Tracks bracket nesting across lines, ignoring string contents and
/// trailing `#` comments.
#[derive(Default)]
struct DepthTracker {
    depth: i32,
    in_string: bool,
    escaped: bool,
    /// The last line fed ended with an operator still missing its operand.
    dangling: bool,
}

impl DepthTracker {
    fn feed(&mut self, line: &str) {
        let mut last = None;
        let mut before_last = None;
        for c in line.chars() {
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == '"' {
                    self.in_string = false;
                }
                continue;
            }
            match c {
                '"' => self.in_string = true,
                '(' | '[' | '{' => self.depth += 1,
                ')' | ']' | '}' => self.depth -= 1,
                '#' => break,
                _ => {}
            }
            if !c.is_whitespace() {
                before_last = last;
                last = Some(c);
            }
        }
        self.dangling = !self.in_string
            && (matches!(last, Some('|' | '+'))
                || (before_last == Some(':') && last == Some('=')));
    }

    fn is_open(&self) -> bool {
        self.depth > 0 || self.in_string
    }
}
