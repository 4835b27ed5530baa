//! Namespaced `mod:id` identifiers.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Namespaces that never count as cross-mod references.
pub const RESERVED_NAMESPACES: [&str; 3] = ["core", "none", "self"];

/// Returns true if `namespace` is one of [`RESERVED_NAMESPACES`].
#[must_use]
pub fn is_reserved_namespace(namespace: &str) -> bool {
    RESERVED_NAMESPACES.contains(&namespace)
}

/// Returns true if `s` is a valid DSL identifier.
///
/// Identifiers start with an ASCII letter or `_` and continue with ASCII
/// alphanumerics, `_` or `-`.
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// A `namespace:id` pair.
///
/// Used as the key of scope definitions (`modId:scopeId`) and as the
/// reference to a component type (`modId:componentId`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QualifiedId {
    /// The owning mod.
    pub namespace: Arc<str>,
    /// The identifier within the mod.
    pub id: Arc<str>,
}

impl QualifiedId {
    /// Creates a qualified id from its parts.
    #[must_use]
    pub fn new(namespace: impl Into<Arc<str>>, id: impl Into<Arc<str>>) -> Self {
        Self {
            namespace: namespace.into(),
            id: id.into(),
        }
    }

    /// Parses `namespace:id`.
    ///
    /// Returns `None` unless the text has exactly one `:` separating two
    /// valid identifiers.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let (namespace, id) = text.split_once(':')?;
        if is_identifier(namespace) && is_identifier(id) {
            Some(Self::new(namespace, id))
        } else {
            None
        }
    }

    /// Returns true if the namespace is reserved.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        is_reserved_namespace(&self.namespace)
    }
}

impl fmt::Debug for QualifiedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.id)
    }
}

impl fmt::Display for QualifiedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.id)
    }
}
