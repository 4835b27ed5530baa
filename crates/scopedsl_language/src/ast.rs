//! Abstract syntax tree for scope expressions.

use std::fmt;

use scopedsl_foundation::{EntityId, QualifiedId};

use crate::predicate::Predicate;
use crate::pretty::pretty_print;

/// A parsed scope expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    /// `base.components.mod:comp.field.subfield`
    ComponentAccess {
        /// Path resolving the entity whose component is read, e.g. `["actor"]`.
        base_entity_path: Vec<String>,
        /// The component type.
        component: QualifiedId,
        /// Fields walked inside the component value.
        field_path: Vec<String>,
    },
    /// `base[{...}]`
    FilteredAccess {
        /// The candidates being filtered.
        base: Box<Expression>,
        /// Predicate applied to each candidate.
        predicate: Predicate,
    },
    /// `base[]`
    ArrayIteration {
        /// The collection being flattened.
        base: Box<Expression>,
    },
    /// `a | b`, `a + b`
    Union {
        /// Two or more operands.
        operands: Vec<Expression>,
    },
    /// `mod:scope`
    ScopeReference {
        /// The referenced scope's key.
        key: QualifiedId,
    },
    /// `none`, `"core:player"`
    ///
    /// The parser only builds zero- or one-value literals.
    Literal {
        /// The constant entity set.
        values: Vec<EntityId>,
    },
    /// `actor`, `self`, `target.owner`
    Variable {
        /// Binding name followed by fields.
        path: Vec<String>,
    },
    /// `entities(mod:comp)`
    Entities {
        /// The kind whose entities are listed.
        kind: QualifiedId,
    },
}

impl Expression {
    /// Returns the direct sub-expressions.
    #[must_use]
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Self::FilteredAccess { base, .. } | Self::ArrayIteration { base } => vec![base],
            Self::Union { operands } => operands.iter().collect(),
            Self::ComponentAccess { .. }
            | Self::ScopeReference { .. }
            | Self::Literal { .. }
            | Self::Variable { .. }
            | Self::Entities { .. } => Vec::new(),
        }
    }

    /// Visits this expression and every sub-expression, parents first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expression)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Returns the scope keys referenced anywhere in this expression, in
    /// source order and without duplicates.
    #[must_use]
    pub fn scope_references(&self) -> Vec<&QualifiedId> {
        let mut refs: Vec<&QualifiedId> = Vec::new();
        self.walk(&mut |expr| {
            if let Self::ScopeReference { key } = expr {
                if !refs.contains(&key) {
                    refs.push(key);
                }
            }
        });
        refs
    }

    /// Returns every component type mentioned by this expression, including
    /// those inside filter predicates.
    #[must_use]
    pub fn component_refs(&self) -> Vec<&QualifiedId> {
        let mut refs = Vec::new();
        self.walk(&mut |expr| match expr {
            Self::ComponentAccess { component, .. } => refs.push(component),
            Self::Entities { kind } => refs.push(kind),
            Self::FilteredAccess { predicate, .. } => predicate.component_refs(&mut refs),
            _ => {}
        });
        refs
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&pretty_print(self))
    }
}

/// A named scope: `mod:scope := expression`.
#[derive(Clone, Debug, PartialEq)]
pub struct ScopeDefinition {
    /// The `namespace:scope_id` key.
    pub key: QualifiedId,
    /// The compiled expression.
    pub expression: Expression,
    /// 1-based line the definition starts on.
    pub source_line: usize,
}

impl ScopeDefinition {
    /// Creates a definition.
    #[must_use]
    pub fn new(key: QualifiedId, expression: Expression, source_line: usize) -> Self {
        Self {
            key,
            expression,
            source_line,
        }
    }

    /// The owning mod.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.key.namespace
    }

    /// The scope id within the mod.
    #[must_use]
    pub fn scope_id(&self) -> &str {
        &self.key.id
    }
}

impl fmt::Display for ScopeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} := {}", self.key, self.expression)
    }
}
