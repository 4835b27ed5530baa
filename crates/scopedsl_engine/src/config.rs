//! Engine configuration.

/// Settings that change how scopes are loaded and evaluated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// A reference to an unregistered scope is an error. When false,
    /// unknown references evaluate to the empty set, which suits tooling
    /// that works on incomplete mod sets.
    pub strict_references: bool,
    /// Loading a definition whose key is already registered replaces it
    /// instead of failing.
    pub allow_override: bool,
    /// Verify after every filter that the result is a subset of its base.
    pub check_filter_invariant: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_references: true,
            allow_override: false,
            check_filter_invariant: cfg!(debug_assertions),
        }
    }
}

impl EngineConfig {
    /// Creates the default gameplay configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a lenient configuration for editors and validators.
    #[must_use]
    pub fn tooling() -> Self {
        Self {
            strict_references: false,
            allow_override: true,
            ..Self::default()
        }
    }

    /// Sets whether unknown scope references are errors.
    #[must_use]
    pub fn with_strict_references(mut self, strict: bool) -> Self {
        self.strict_references = strict;
        self
    }

    /// Sets whether reloading a key replaces the earlier definition.
    #[must_use]
    pub fn with_allow_override(mut self, allow: bool) -> Self {
        self.allow_override = allow;
        self
    }

    /// Sets whether filter results are checked against their base.
    #[must_use]
    pub fn with_filter_invariant_check(mut self, check: bool) -> Self {
        self.check_filter_invariant = check;
        self
    }
}
