//! The main REPL implementation.
//!
//! Input is either a command (`:load`, `:eval`, ...), one or more scope
//! definitions (`mod:scope := ...`), which are registered, or an expression,
//! which is evaluated against the session world as the current actor.

use std::io::{self, Write};

use scopedsl_engine::LoadReport;
use scopedsl_foundation::json::from_json;
use scopedsl_foundation::{EntityId, EntitySet, Error, QualifiedId, Result, Value};
use scopedsl_language::{
    Lexer, ReferenceMap, TokenKind, extract_references, parse_definition, parse_expression,
};
use tracing::debug;

use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::session::{Session, read_file};

/// Origin recorded for definitions typed at the prompt.
const REPL_ORIGIN: &str = "<repl>";

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// Session state (engine, world, actor, bindings).
    session: Session,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,

    /// Continuation prompt (for multi-line input).
    continuation_prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new() -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL with the given editor.
    pub fn with_editor(editor: E) -> Self {
        Self {
            editor,
            session: Session::new(),
            show_banner: true,
            prompt: "scope> ".to_string(),
            continuation_prompt: "   ... ".to_string(),
        }
    }

    /// Sets the session for this REPL.
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self.refresh_completions();
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Returns a reference to the session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns a mutable reference to the session.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Runs the REPL loop.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails fatally.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        loop {
            match self.read_eval_print() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    self.print_error(&e);
                }
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    /// Executes one read-eval-print iteration.
    ///
    /// Returns `Ok(true)` to continue, `Ok(false)` to exit.
    fn read_eval_print(&mut self) -> Result<bool> {
        let Some(input) = self.read_input()? else {
            return Ok(false); // EOF
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(true);
        }

        self.editor.add_history(&input);

        if matches!(trimmed, ":quit" | ":q" | ":exit") {
            return Ok(false);
        }

        match self.eval(&input) {
            Ok(value) => {
                if value != Value::Nil {
                    println!("{}", self.format_value(&value));
                }
            }
            Err(e) => {
                self.print_error(&e);
            }
        }

        Ok(true)
    }

    /// Reads a potentially multi-line input.
    fn read_input(&mut self) -> Result<Option<String>> {
        let mut input = String::new();
        let mut first_line = true;

        loop {
            let read = if first_line {
                self.editor.read_line(&self.prompt)?
            } else {
                self.editor.read_continuation(&self.continuation_prompt)?
            };

            match read {
                ReadResult::Line(line) => {
                    if first_line {
                        input = line;
                    } else {
                        input.push('\n');
                        input.push_str(&line);
                    }

                    if is_complete(&input) {
                        return Ok(Some(input));
                    }

                    first_line = false;
                }
                ReadResult::Interrupted => {
                    if !first_line {
                        println!("\nInput cancelled.");
                    }
                    return Ok(Some(String::new()));
                }
                ReadResult::Eof => {
                    if first_line {
                        return Ok(None);
                    }
                    return Err(Error::internal("unexpected EOF in multi-line input"));
                }
            }
        }
    }

    /// Evaluates one input and returns the value to print.
    ///
    /// Expressions evaluate to the list of matching entity ids in sorted
    /// order. Definitions are registered and evaluate to their keys.
    ///
    /// # Errors
    ///
    /// Returns an error if a command is malformed, parsing fails, or
    /// evaluation fails.
    pub fn eval(&mut self, input: &str) -> Result<Value> {
        let trimmed = input.trim();
        if let Some(command) = trimmed.strip_prefix(':') {
            let (name, argument) = command
                .split_once(char::is_whitespace)
                .map_or((command, ""), |(name, rest)| (name, rest.trim()));
            debug!(command = name, "repl command");
            return self.eval_command(name, argument);
        }

        if is_definition(trimmed) {
            return self.define(trimmed);
        }

        self.session.query(trimmed).map(entity_list)
    }

    /// Registers definitions typed at the prompt.
    fn define(&mut self, source: &str) -> Result<Value> {
        let mut report = self.session.load_source(REPL_ORIGIN, source);
        self.refresh_completions();
        if report.registered.is_empty() && !report.errors.is_empty() {
            return Err(report.errors.remove(0));
        }
        for error in &report.errors {
            self.print_error(error);
        }
        Ok(key_list(report.registered.iter()))
    }

    /// Dispatches a `:command`.
    fn eval_command(&mut self, name: &str, argument: &str) -> Result<Value> {
        match name {
            "load" | "l" => {
                let report = self.load_file(required(name, argument)?)?;
                Ok(report_summary(&report))
            }
            "world" | "w" => {
                let count = self.session.load_world(required(name, argument)?)?;
                Ok(Value::map([("entities", Value::from(count_value(count)))]))
            }
            "eval" | "e" => {
                let key = parse_key(required(name, argument)?)?;
                self.session.evaluate(&key).map(entity_list)
            }
            "parse" | "p" => {
                let source = required(name, argument)?;
                let printed = if is_definition(source) {
                    parse_definition(source)?.to_string()
                } else {
                    parse_expression(source)?.to_string()
                };
                Ok(Value::from(printed))
            }
            "refs" | "r" => {
                let mut parts = required(name, argument)?.split_whitespace();
                let path = parts.next().unwrap_or_default();
                let own_mod = parts.next();
                let source = read_file(&self.session.resolve_path(path))?;
                let refs = extract_references(&source, own_mod);
                Ok(Value::map([
                    ("parsed", reference_value(&refs.parsed)),
                    ("partial", reference_value(&refs.partial)),
                ]))
            }
            "list" | "ls" => {
                let registry = self.session.engine().registry();
                let keys = if argument.is_empty() {
                    registry.list()
                } else {
                    registry.by_namespace(argument)
                };
                Ok(key_list(keys))
            }
            "deps" => {
                let key = parse_key(required(name, argument)?)?;
                let deps = self
                    .session
                    .engine()
                    .registry()
                    .dependencies(&key)
                    .ok_or_else(|| Error::unknown_reference(key.clone()))?;
                Ok(key_list(deps.iter()))
            }
            "unresolved" => {
                let missing = self.session.engine().registry().unresolved();
                Ok(Value::from(
                    missing
                        .into_iter()
                        .map(|(scope, target)| format!("{scope} -> {target}"))
                        .collect::<Vec<_>>(),
                ))
            }
            "entity" => {
                let id = EntityId::from(required(name, argument)?);
                self.session
                    .describe_entity(&id)
                    .ok_or_else(|| Error::internal(format!("no such entity: {id}")))
            }
            "bind" | "b" => {
                if argument.is_empty() {
                    return Ok(Value::map(
                        self.session
                            .bindings()
                            .iter()
                            .map(|(k, v)| (k.as_str(), v.clone())),
                    ));
                }
                let (var, raw) = argument
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| Error::internal("usage: :bind <name> <json value>"))?;
                let value = parse_binding(raw.trim());
                self.session.bind(var, value.clone());
                Ok(value)
            }
            "unbind" => Ok(self
                .session
                .unbind(required(name, argument)?)
                .unwrap_or(Value::Nil)),
            "actor" | "a" => {
                if !argument.is_empty() {
                    self.session.set_actor(argument);
                }
                Ok(Value::EntityRef(self.session.actor().clone()))
            }
            "reload" => {
                let reports = self.session.reload_scopes()?;
                self.refresh_completions();
                for error in reports.iter().flat_map(|r| &r.errors) {
                    self.print_error(error);
                }
                let registered = reports.iter().map(|r| r.registered.len()).sum();
                Ok(Value::map([("registered", Value::from(count_value(registered)))]))
            }
            "help" | "h" | "?" => {
                print_help();
                Ok(Value::Nil)
            }
            other => Err(Error::internal(format!(
                "unknown command :{other} (try :help)"
            ))),
        }
    }

    /// Loads a scope file, printing any per-definition errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn load_file(&mut self, path: &str) -> Result<LoadReport> {
        let report = self.session.load_scopes(path)?;
        for error in &report.errors {
            self.print_error(error);
        }
        self.refresh_completions();
        Ok(report)
    }

    /// Offers every registered scope key for completion.
    fn refresh_completions(&mut self) {
        let keys = self
            .session
            .engine()
            .registry()
            .list()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        self.editor.set_keywords(keys);
    }

    /// Formats a value for display.
    #[allow(clippy::unused_self)]
    fn format_value(&self, value: &Value) -> String {
        format!("\x1b[1m{value}\x1b[0m")
    }

    /// Prints an error to stderr.
    #[allow(clippy::unused_self)]
    fn print_error(&self, error: &Error) {
        eprintln!("\x1b[31mError: {error}\x1b[0m");
        if let Some(context) = &error.context {
            let context = context.to_string();
            if !context.is_empty() {
                eprintln!("\x1b[2m  {}\x1b[0m", context.trim_end());
            }
        }
    }

    /// Prints the welcome banner.
    #[allow(clippy::unused_self)]
    fn print_banner(&self) {
        println!("\x1b[1;36mScope DSL REPL v{}\x1b[0m", env!("CARGO_PKG_VERSION"));
        println!("Type an expression to evaluate it as the current actor,");
        println!("or `mod:scope := ...` to define a scope. :help lists commands, Ctrl+D exits.\n");

        // Flush to ensure banner appears
        let _ = io::stdout().flush();
    }
}

/// Checks if input is syntactically complete: brackets balanced, no open
/// string, and no trailing union operator or `:=`.
pub(crate) fn is_complete(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;
    let mut in_comment = false;

    for c in input.chars() {
        if in_comment {
            in_comment = c != '\n';
            continue;
        }
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '#' if !in_string && depth == 0 => in_comment = true,
            '(' | '[' | '{' if !in_string => depth += 1,
            ')' | ']' | '}' if !in_string => depth -= 1,
            _ => {}
        }
    }

    if depth > 0 || in_string {
        return false;
    }

    let code = input
        .lines()
        .last()
        .map_or("", |line| line.split('#').next().unwrap_or(line))
        .trim_end();
    !(code.ends_with('|') || code.ends_with('+') || code.ends_with(":="))
}

/// Returns true if the source contains a top-level `:=`.
fn is_definition(source: &str) -> bool {
    Lexer::tokenize_all(source)
        .iter()
        .any(|token| token.kind == TokenKind::Assign)
}

fn required<'a>(command: &str, argument: &'a str) -> Result<&'a str> {
    if argument.is_empty() {
        Err(Error::internal(format!(":{command} requires an argument")))
    } else {
        Ok(argument)
    }
}

fn parse_key(text: &str) -> Result<QualifiedId> {
    QualifiedId::parse(text)
        .ok_or_else(|| Error::internal(format!("expected a `mod:scope` key, got `{text}`")))
}

/// Parses a binding value as JSON, falling back to a plain string so
/// `:bind target npc:a` works without quotes.
fn parse_binding(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw)
        .map_or_else(|_| Value::from(raw), |json| from_json(&json))
}

fn entity_list(entities: EntitySet) -> Value {
    Value::from(entities.into_iter().collect::<Vec<_>>())
}

fn key_list<'k>(keys: impl IntoIterator<Item = &'k QualifiedId>) -> Value {
    Value::from(keys.into_iter().map(ToString::to_string).collect::<Vec<_>>())
}

fn reference_value(refs: &ReferenceMap) -> Value {
    Value::map(refs.iter().map(|(namespace, ids)| {
        (
            namespace,
            Value::from(ids.iter().map(String::as_str).collect::<Vec<_>>()),
        )
    }))
}

fn report_summary(report: &LoadReport) -> Value {
    Value::map([
        ("registered", Value::from(count_value(report.registered.len()))),
        ("errors", Value::from(count_value(report.errors.len()))),
    ])
}

fn count_value(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

fn print_help() {
    println!(
        "\x1b[1mCOMMANDS:\x1b[0m
    :load <file>           Load a scope file (alias :l)
    :world <file>          Load a JSON world, replacing the current one (alias :w)
    :eval <mod:scope>      Evaluate a registered scope (alias :e)
    :parse <expr>          Parse and print an expression or definition (alias :p)
    :refs <file> [mod]     List the mods a scope file references (alias :r)
    :list [namespace]      List registered scopes (alias :ls)
    :deps <mod:scope>      List the scopes a definition references
    :unresolved            List references to scopes that are not registered
    :entity <id>           Show an entity's components
    :bind [name value]     Bind a context variable (JSON, or a bare string)
    :unbind <name>         Remove a context variable
    :actor [id]            Show or change the acting entity (alias :a)
    :reload                Reload every scope file loaded so far
    :help                  Show this help
    :quit                  Exit

\x1b[1mINPUT:\x1b[0m
    mod:scope := <expr>    Define or replace a scope
    <expr>                 Evaluate an expression, e.g.
                           actor.core:inventory.items[][{{\"has\": [{{\"var\": \".\"}}, \"items:wearable\"]}}]"
    );
}
