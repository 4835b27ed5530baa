//! Pretty-printer for scope expressions.
//!
//! Printing a parsed expression and parsing the output again yields a
//! structurally equal tree. A hand-built [`Expression::Literal`] with more
//! than one value has no source form of its own; it prints as a union of
//! single literals and reparses as an [`Expression::Union`].
//!
//! # Example
//!
//! ```
//! use scopedsl_language::{parse_expression, pretty::pretty_print};
//!
//! let expr = parse_expression("actor.positioning:closeness.partners + none").unwrap();
//! assert_eq!(
//!     pretty_print(&expr),
//!     "actor.components.positioning:closeness.partners | none"
//! );
//! ```

use std::fmt::Write;

use crate::ast::{Expression, ScopeDefinition};

/// Configuration for pretty-printing.
#[derive(Debug, Clone)]
pub struct PrettyConfig {
    /// Operator written between union operands.
    pub union_operator: char,
    /// Whether component access keeps the explicit `components` marker.
    pub explicit_components: bool,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self {
            union_operator: '|',
            explicit_components: true,
        }
    }
}

/// Pretty-print an expression.
#[must_use]
pub fn pretty_print(expr: &Expression) -> String {
    pretty_print_with_config(expr, &PrettyConfig::default())
}

/// Pretty-print an expression with custom configuration.
#[must_use]
pub fn pretty_print_with_config(expr: &Expression, config: &PrettyConfig) -> String {
    let mut out = String::new();
    print_expr(&mut out, expr, config);
    out
}

/// Pretty-print definitions in scope file form, one per line.
#[must_use]
pub fn pretty_print_definitions(definitions: &[ScopeDefinition]) -> String {
    definitions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_expr(out: &mut String, expr: &Expression, config: &PrettyConfig) {
    match expr {
        Expression::ComponentAccess {
            base_entity_path,
            component,
            field_path,
        } => {
            out.push_str(&base_entity_path.join("."));
            if config.explicit_components {
                out.push_str(".components");
            }
            let _ = write!(out, ".{component}");
            for field in field_path {
                out.push('.');
                out.push_str(field);
            }
        }
        Expression::FilteredAccess { base, predicate } => {
            print_expr(out, base, config);
            let _ = write!(out, "[{predicate}]");
        }
        Expression::ArrayIteration { base } => {
            print_expr(out, base, config);
            out.push_str("[]");
        }
        Expression::Union { operands } => {
            for (i, operand) in operands.iter().enumerate() {
                if i > 0 {
                    let _ = write!(out, " {} ", config.union_operator);
                }
                print_expr(out, operand, config);
            }
        }
        Expression::ScopeReference { key } => {
            let _ = write!(out, "{key}");
        }
        Expression::Literal { values } => {
            if values.is_empty() {
                out.push_str("none");
            }
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    let _ = write!(out, " {} ", config.union_operator);
                }
                write_string(out, value.as_str());
            }
        }
        Expression::Variable { path } => out.push_str(&path.join(".")),
        Expression::Entities { kind } => {
            let _ = write!(out, "entities({kind})");
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}
