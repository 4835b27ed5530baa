//! Line editor abstraction for the REPL.
//!
//! This module provides a trait-based abstraction over line editing libraries,
//! allowing the REPL to use rustyline while remaining swappable.

use std::borrow::Cow;

use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Completer, Config, Context, Editor, Helper, Hinter, Validator as RLValidator};
use scopedsl_foundation::{Error, Result};

use crate::highlight::ScopeHighlighter;
use crate::repl::is_complete;

/// Maximum number of history entries kept by the editor.
const HISTORY_SIZE: usize = 1000;

/// Result of reading a line from the editor.
#[derive(Debug)]
pub enum ReadResult {
    /// A line was successfully read.
    Line(String),
    /// User pressed Ctrl+C.
    Interrupted,
    /// User pressed Ctrl+D (EOF).
    Eof,
}

/// Abstraction over line editing functionality.
///
/// This trait allows swapping out the underlying line editor implementation
/// (e.g., from rustyline to reedline) without changing the REPL code.
pub trait LineEditor {
    /// Read a line with the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Read a continuation line (for multi-line input).
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_continuation(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Add a line to history.
    fn add_history(&mut self, line: &str);

    /// Set available completions, typically the registered scope keys.
    fn set_keywords(&mut self, keywords: Vec<String>);
}

/// Helper for rustyline that provides completion, hints, highlighting, and validation.
#[derive(Helper, Completer, Hinter, RLValidator)]
struct ScopeHelper {
    #[rustyline(Completer)]
    completer: ScopeCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
    #[rustyline(Validator)]
    validator: CompletenessValidator,
    highlighter: ScopeHighlighter,
}

impl Highlighter for ScopeHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("\x1b[1;32m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{hint}\x1b[0m"))
    }
}

/// Completer for REPL commands, DSL keywords, scope keys and file paths.
struct ScopeCompleter {
    file_completer: FilenameCompleter,
    keywords: Vec<String>,
}

impl ScopeCompleter {
    fn new() -> Self {
        Self {
            file_completer: FilenameCompleter::new(),
            keywords: Vec::new(),
        }
    }

    /// Words that are always offered, whatever scopes are loaded.
    fn builtin_words() -> &'static [&'static str] {
        &[
            // Commands
            ":load",
            ":world",
            ":eval",
            ":parse",
            ":refs",
            ":list",
            ":deps",
            ":unresolved",
            ":entity",
            ":bind",
            ":unbind",
            ":actor",
            ":reload",
            ":help",
            ":quit",
            // Expression sources
            "actor",
            "self",
            "none",
            "entities(",
            "components",
            // Predicate operators
            "\"and\"",
            "\"or\"",
            "\"!\"",
            "\"has\"",
            "\"get_component_value\"",
            "\"var\"",
            "\"in\"",
        ]
    }
}

impl Completer for ScopeCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // File arguments complete as paths.
        if [":load ", ":world ", ":refs "]
            .iter()
            .any(|command| line.starts_with(command))
        {
            return self.file_completer.complete(line, pos, ctx);
        }

        // Find the start of the current word
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || "()[]{}|+.,".contains(c))
            .map_or(0, |i| i + 1);

        let word = &line[start..pos];

        let candidates: Vec<Pair> = Self::builtin_words()
            .iter()
            .copied()
            .chain(self.keywords.iter().map(String::as_str))
            .filter(|kw| kw.starts_with(word))
            .map(|kw| Pair {
                display: kw.to_string(),
                replacement: kw.to_string(),
            })
            .collect();

        Ok((start, candidates))
    }
}

/// Validator that keeps reading while an expression is unfinished
/// (open brackets, an open string, or a trailing union operator).
#[derive(Default)]
struct CompletenessValidator;

impl Validator for CompletenessValidator {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        if is_complete(ctx.input()) {
            Ok(ValidationResult::Valid(None))
        } else {
            Ok(ValidationResult::Incomplete)
        }
    }
}

/// Line editor implementation using rustyline.
pub struct RustylineEditor {
    editor: Editor<ScopeHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Creates a new rustyline-based editor.
    ///
    /// # Errors
    ///
    /// Returns an error if rustyline initialization fails.
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(HISTORY_SIZE)
            .map_err(|e| Error::internal(e.to_string()))?
            .build();

        let helper = ScopeHelper {
            completer: ScopeCompleter::new(),
            hinter: HistoryHinter::new(),
            validator: CompletenessValidator,
            highlighter: ScopeHighlighter::new(),
        };

        let mut editor = Editor::with_config(config).map_err(|e| Error::internal(e.to_string()))?;
        editor.set_helper(Some(helper));

        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::internal(e.to_string())),
        }
    }

    fn read_continuation(&mut self, prompt: &str) -> Result<ReadResult> {
        self.read_line(prompt)
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }

    fn set_keywords(&mut self, keywords: Vec<String>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.completer.keywords = keywords;
        }
    }
}
