//! Cross-mod reference extraction for dependency validation.
//!
//! Extraction is two-tier. Definitions that parse contribute the scope and
//! component references found in their syntax tree. Definitions that fail
//! to parse fall back to a regex scan for `mod:identifier` tokens; those
//! results are kept apart in [`ExtractedReferences::partial`] because the
//! scan cannot tell a reference from an entity id or a typo.
//!
//! References into the reserved `core`, `none` and `self` namespaces are
//! never recorded.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use scopedsl_foundation::{QualifiedId, is_reserved_namespace};

use crate::source_file::parse_file;

static QUALIFIED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_-])([A-Za-z_][A-Za-z0-9_-]*):([A-Za-z_][A-Za-z0-9_-]*)")
        .expect("qualified id pattern is valid")
});

/// Referenced ids grouped by mod.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceMap(BTreeMap<String, BTreeSet<String>>);

impl ReferenceMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `namespace:id`. Returns false if the namespace is reserved
    /// or the reference was already present.
    pub fn insert(&mut self, namespace: &str, id: &str) -> bool {
        if is_reserved_namespace(namespace) {
            return false;
        }
        self.0
            .entry(namespace.to_string())
            .or_default()
            .insert(id.to_string())
    }

    /// Records a qualified id.
    pub fn insert_id(&mut self, id: &QualifiedId) -> bool {
        self.insert(&id.namespace, &id.id)
    }

    /// Merges every reference from `other`.
    pub fn extend(&mut self, other: &ReferenceMap) {
        for (namespace, ids) in &other.0 {
            self.0
                .entry(namespace.clone())
                .or_default()
                .extend(ids.iter().cloned());
        }
    }

    /// Drops every reference into `namespace`.
    pub fn remove_namespace(&mut self, namespace: &str) {
        self.0.remove(namespace);
    }

    /// Returns the ids referenced in `namespace`.
    #[must_use]
    pub fn get(&self, namespace: &str) -> Option<&BTreeSet<String>> {
        self.0.get(namespace)
    }

    /// Returns true if `namespace:id` was recorded.
    #[must_use]
    pub fn contains(&self, namespace: &str, id: &str) -> bool {
        self.get(namespace).is_some_and(|ids| ids.contains(id))
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates referenced mods in name order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates `(mod, ids)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.0.iter().map(|(ns, ids)| (ns.as_str(), ids))
    }

    /// Returns the underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, BTreeSet<String>> {
        self.0
    }
}

/// The result of [`extract_references`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractedReferences {
    /// References taken from successfully parsed definitions.
    pub parsed: ReferenceMap,
    /// Best-effort references scanned out of unparsable definitions.
    pub partial: ReferenceMap,
}

impl ExtractedReferences {
    /// Returns true if every definition parsed, so no result is partial.
    #[must_use]
    pub fn is_reliable(&self) -> bool {
        self.partial.is_empty()
    }

    /// Returns parsed and partial references merged together.
    #[must_use]
    pub fn all(&self) -> ReferenceMap {
        let mut all = self.parsed.clone();
        all.extend(&self.partial);
        all
    }
}

/// Extracts the mods a scope file depends on.
///
/// `own_mod`, when given, is excluded from the results since a mod never
/// depends on itself.
#[must_use]
pub fn extract_references(source: &str, own_mod: Option<&str>) -> ExtractedReferences {
    let file = parse_file(source);
    let mut result = ExtractedReferences::default();

    for definition in &file.definitions {
        for key in definition.expression.scope_references() {
            result.parsed.insert_id(key);
        }
        for component in definition.expression.component_refs() {
            result.parsed.insert_id(component);
        }
    }
    for failure in &file.errors {
        result.partial.extend(&failure.partial_references);
    }

    if let Some(own) = own_mod {
        result.parsed.remove_namespace(own);
        result.partial.remove_namespace(own);
    }
    result
}

/// Scans raw text for `mod:identifier` tokens.
///
/// A qualified id at the very start of the text is the would-be name of
/// the definition and is skipped, as are reserved namespaces.
#[must_use]
pub fn scan_references(text: &str) -> ReferenceMap {
    let leading = text.len() - text.trim_start().len();
    let mut refs = ReferenceMap::new();
    for captures in QUALIFIED_RE.captures_iter(text) {
        let (Some(namespace), Some(id)) = (captures.get(1), captures.get(2)) else {
            continue;
        };
        if namespace.start() == leading {
            continue;
        }
        refs.insert(namespace.as_str(), id.as_str());
    }
    refs
}
