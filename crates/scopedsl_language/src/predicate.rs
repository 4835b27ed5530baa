//! JSON-Logic predicates embedded in filter expressions.
//!
//! A filter such as `partners[{"has": [{"var": "."}, "intimacy:attraction"]}]`
//! carries a JSON object that is parsed into a [`Predicate`] tree at
//! compile time. Unknown operators, wrong arity and malformed component
//! references are reported as `PredicateSyntax` errors right away rather
//! than on first evaluation.
//!
//! # Operators
//!
//! | Operator | Operands |
//! |----------|----------|
//! | `and`, `or` | one or more predicates |
//! | `!`, `not` | exactly one predicate |
//! | `==`, `===`, `!=`, `!==`, `<`, `<=`, `>`, `>=` | exactly two |
//! | `has` | entity, `"mod:component"` |
//! | `get_component_value` | entity, `"mod:component"`, optional `"field.path"` |
//! | `var` | path, or `[path, default]` |
//! | `in` | needle, haystack |

use std::fmt;

use scopedsl_foundation::json::{from_json, to_json};
use scopedsl_foundation::{Error, QualifiedId, Result, Value};
use serde_json::json;

/// Comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// Looks up an operator by its JSON-Logic key.
    ///
    /// The strict forms `===` and `!==` are accepted as aliases.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "==" | "===" => Some(Self::Eq),
            "!=" | "!==" => Some(Self::Ne),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            _ => None,
        }
    }

    /// Returns the canonical operator symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// Returns true for `<`, `<=`, `>` and `>=`.
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        !matches!(self, Self::Eq | Self::Ne)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A parsed JSON-Logic predicate.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// All operands truthy; yields the first falsy operand or the last one.
    And(Vec<Predicate>),
    /// Any operand truthy; yields the first truthy operand or the last one.
    Or(Vec<Predicate>),
    /// Negated truthiness of the operand.
    Not(Box<Predicate>),
    /// Binary comparison.
    Compare {
        /// The operator.
        op: CompareOp,
        /// Left operand.
        left: Box<Predicate>,
        /// Right operand.
        right: Box<Predicate>,
    },
    /// Whether an entity carries a component.
    Has {
        /// Operand resolving to the entity.
        entity: Box<Predicate>,
        /// The component type.
        component: QualifiedId,
    },
    /// A component field value, or nil when absent.
    GetComponentValue {
        /// Operand resolving to the entity.
        entity: Box<Predicate>,
        /// The component type.
        component: QualifiedId,
        /// Dotted field path; empty for the whole component.
        field: Vec<String>,
    },
    /// Variable lookup.
    ///
    /// An empty path denotes the current element (`"."` or `""`).
    Var {
        /// Dotted path segments.
        path: Vec<String>,
        /// Value used when the path does not resolve.
        default: Option<Box<Predicate>>,
    },
    /// List membership or substring test.
    In {
        /// The value searched for.
        needle: Box<Predicate>,
        /// The list or string searched in.
        haystack: Box<Predicate>,
    },
    /// A constant operand.
    Literal(Value),
    /// A list of operands evaluated element-wise.
    List(Vec<Predicate>),
}

impl Predicate {
    /// Parses the JSON text of a filter.
    ///
    /// # Errors
    ///
    /// Returns a `PredicateSyntax` error if the text is not valid JSON, is
    /// not an object, or uses an unknown operator or wrong arity.
    pub fn parse(text: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| Error::predicate_syntax(format!("invalid JSON: {e}"), text))?;
        if !json.is_object() {
            return Err(Error::predicate_syntax("filter must be a JSON object", text));
        }
        Self::from_json(&json)
    }

    /// Builds a predicate from parsed JSON.
    ///
    /// Objects are operators, arrays become [`Predicate::List`] and every
    /// other value is a [`Predicate::Literal`].
    ///
    /// # Errors
    ///
    /// Returns a `PredicateSyntax` error for malformed operator objects.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Object(entries) => {
                let mut iter = entries.iter();
                let (Some((op, args)), None) = (iter.next(), iter.next()) else {
                    return Err(syntax("operator objects must have exactly one key", json));
                };
                Self::from_operator(op, args, json)
            }
            serde_json::Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>>>()
                .map(Self::List),
            scalar => Ok(Self::Literal(from_json(scalar))),
        }
    }

    fn from_operator(op: &str, args: &serde_json::Value, whole: &serde_json::Value) -> Result<Self> {
        if let Some(cmp) = CompareOp::from_symbol(op) {
            let [left, right] = fixed_operands::<2>(op, args, whole)?;
            return Ok(Self::Compare {
                op: cmp,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        match op {
            "and" | "or" => {
                let operands = operands(args)?;
                if operands.is_empty() {
                    return Err(syntax(format!("`{op}` needs at least one operand"), whole));
                }
                Ok(if op == "and" {
                    Self::And(operands)
                } else {
                    Self::Or(operands)
                })
            }
            "!" | "not" => {
                let [operand] = fixed_operands::<1>(op, args, whole)?;
                Ok(Self::Not(Box::new(operand)))
            }
            "has" => {
                let [entity, component] = fixed_operands::<2>(op, args, whole)?;
                Ok(Self::Has {
                    entity: Box::new(entity),
                    component: component_ref(&component, whole)?,
                })
            }
            "get_component_value" => {
                let mut operands = operands(args)?.into_iter();
                let (Some(entity), Some(component), field, None) = (
                    operands.next(),
                    operands.next(),
                    operands.next(),
                    operands.next(),
                ) else {
                    return Err(syntax("`get_component_value` expects 2 or 3 operands", whole));
                };
                let field = match field {
                    None => Vec::new(),
                    Some(Self::Literal(Value::String(path))) => split_path(&path),
                    Some(_) => {
                        return Err(syntax("`get_component_value` field must be a string", whole));
                    }
                };
                Ok(Self::GetComponentValue {
                    entity: Box::new(entity),
                    component: component_ref(&component, whole)?,
                    field,
                })
            }
            "var" => var(args, whole),
            "in" => {
                let [needle, haystack] = fixed_operands::<2>(op, args, whole)?;
                Ok(Self::In {
                    needle: Box::new(needle),
                    haystack: Box::new(haystack),
                })
            }
            other => Err(syntax(format!("unknown operator `{other}`"), whole)),
        }
    }

    /// Shorthand for `{"var": "."}`, the current element.
    #[must_use]
    pub const fn current() -> Self {
        Self::Var {
            path: Vec::new(),
            default: None,
        }
    }

    /// Converts the predicate back into JSON-Logic form.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::And(ops) => operator_json("and", list_json(ops)),
            Self::Or(ops) => operator_json("or", list_json(ops)),
            Self::Not(op) => operator_json("!", json!([op.to_json()])),
            Self::Compare { op, left, right } => {
                operator_json(op.symbol(), json!([left.to_json(), right.to_json()]))
            }
            Self::Has { entity, component } => {
                operator_json("has", json!([entity.to_json(), component.to_string()]))
            }
            Self::GetComponentValue {
                entity,
                component,
                field,
            } => {
                let mut args = vec![entity.to_json(), json!(component.to_string())];
                if !field.is_empty() {
                    args.push(json!(field.join(".")));
                }
                operator_json("get_component_value", serde_json::Value::Array(args))
            }
            Self::Var { path, default } => {
                let path = if path.is_empty() {
                    ".".to_string()
                } else {
                    path.join(".")
                };
                match default {
                    Some(default) => operator_json("var", json!([path, default.to_json()])),
                    None => operator_json("var", json!(path)),
                }
            }
            Self::In { needle, haystack } => {
                operator_json("in", json!([needle.to_json(), haystack.to_json()]))
            }
            Self::Literal(value) => to_json(value),
            Self::List(items) => list_json(items),
        }
    }

    /// Collects every component type this predicate mentions.
    pub fn component_refs<'a>(&'a self, out: &mut Vec<&'a QualifiedId>) {
        match self {
            Self::And(ops) | Self::Or(ops) | Self::List(ops) => {
                for op in ops {
                    op.component_refs(out);
                }
            }
            Self::Not(op) => op.component_refs(out),
            Self::Compare { left, right, .. } => {
                left.component_refs(out);
                right.component_refs(out);
            }
            Self::Has { entity, component } | Self::GetComponentValue { entity, component, .. } => {
                out.push(component);
                entity.component_refs(out);
            }
            Self::Var { default, .. } => {
                if let Some(default) = default {
                    default.component_refs(out);
                }
            }
            Self::In { needle, haystack } => {
                needle.component_refs(out);
                haystack.component_refs(out);
            }
            Self::Literal(_) => {}
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

fn syntax(message: impl Into<String>, json: &serde_json::Value) -> Error {
    Error::predicate_syntax(message, json.to_string())
}

fn operator_json(op: &str, args: serde_json::Value) -> serde_json::Value {
    let mut object = serde_json::Map::new();
    object.insert(op.to_string(), args);
    serde_json::Value::Object(object)
}

fn list_json(items: &[Predicate]) -> serde_json::Value {
    serde_json::Value::Array(items.iter().map(Predicate::to_json).collect())
}

/// Parses operator arguments; a non-array argument is a single operand.
fn operands(args: &serde_json::Value) -> Result<Vec<Predicate>> {
    match args {
        serde_json::Value::Array(items) => items.iter().map(Predicate::from_json).collect(),
        single => Ok(vec![Predicate::from_json(single)?]),
    }
}

fn fixed_operands<const N: usize>(
    op: &str,
    args: &serde_json::Value,
    whole: &serde_json::Value,
) -> Result<[Predicate; N]> {
    let operands = operands(args)?;
    let found = operands.len();
    operands.try_into().map_err(|_| {
        let plural = if N == 1 { "" } else { "s" };
        syntax(
            format!("`{op}` expects {N} operand{plural}, found {found}"),
            whole,
        )
    })
}

fn component_ref(operand: &Predicate, whole: &serde_json::Value) -> Result<QualifiedId> {
    match operand {
        Predicate::Literal(Value::String(text)) => QualifiedId::parse(text).ok_or_else(|| {
            syntax(
                format!("malformed component reference `{text}`, expected `mod:component`"),
                whole,
            )
        }),
        _ => Err(syntax("component reference must be a string", whole)),
    }
}

fn var(args: &serde_json::Value, whole: &serde_json::Value) -> Result<Predicate> {
    let (path, default) = match args {
        serde_json::Value::Array(items) => match items.as_slice() {
            [] => (None, None),
            [path] => (Some(path), None),
            [path, default] => (Some(path), Some(Box::new(Predicate::from_json(default)?))),
            _ => return Err(syntax("`var` expects a path and an optional default", whole)),
        },
        path => (Some(path), None),
    };

    let path = match path {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(serde_json::Value::String(s)) => split_path(s),
        Some(serde_json::Value::Number(n)) => vec![n.to_string()],
        Some(_) => return Err(syntax("`var` path must be a string or number", whole)),
    };

    Ok(Predicate::Var { path, default })
}

/// Splits a dotted path; `"."` and `""` are the empty path.
fn split_path(path: &str) -> Vec<String> {
    if path.is_empty() || path == "." {
        Vec::new()
    } else {
        path.split('.').map(str::to_string).collect()
    }
}
