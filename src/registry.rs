//! The on-demand kind registry.
//!
//! Kinds are created lazily on first resolution and memoized for the life of
//! the process. The registry is the single owner of the name-to-kind map;
//! handlers never hold kind state of their own.

use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::kind::{builtin, Kind, KindData, ERROR, NAME_CONFLICT_ERROR, PARAMETER_ERROR};
use crate::Result;

/// Names taken by the registry's own surface. Resolving one of these would
/// shadow an accessor, so it is rejected instead of silently registered.
const RESERVED: &[&str] = &["history", "resolve", "registry", "contains"];

/// Registry of named error kinds.
///
/// Empty at process start. Entries are created on first resolution, are
/// immutable once created, and are never removed. Resolution is referentially
/// stable: `resolve("X")` returns the identical [`Kind`] every time,
/// including under concurrent first resolution from multiple threads.
pub struct Registry {
    history: RwLock<HashMap<&'static str, Kind>>,
}

impl Registry {
    /// Create an empty registry. Most callers want [`registry`] instead.
    pub fn new() -> Self {
        Self {
            history: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve `name` to its kind, creating it under the root kind on first
    /// use.
    ///
    /// Fails with `ParameterError` when `name` is not identifier-shaped, and
    /// with `NameConflictError` when it collides with the registry's own
    /// surface. Builtin kind names resolve to their statics and are not
    /// recorded in history.
    pub fn resolve(&self, name: &str) -> Result<Kind> {
        self.resolve_under(name, ERROR)
    }

    /// Resolve `name`, creating it as a specialization of `base` on first
    /// use.
    ///
    /// An already-registered name returns the existing kind unchanged; the
    /// requested base is ignored in that case.
    pub fn resolve_under(&self, name: &str, base: Kind) -> Result<Kind> {
        if !is_identifier(name) {
            return PARAMETER_ERROR.raise(format!(
                "kind name must be identifier-shaped, got {name:?}"
            ));
        }
        if let Some(kind) = builtin(name) {
            return Ok(kind);
        }
        if RESERVED.contains(&name) {
            return NAME_CONFLICT_ERROR.raise(format!(
                "{name:?} is reserved by the registry"
            ));
        }

        if let Some(kind) = self.history.read().get(name) {
            return Ok(*kind);
        }

        // Check-then-insert runs under the write lock so concurrent first
        // resolution of the same name yields exactly one descriptor.
        let mut history = self.history.write();
        if let Some(kind) = history.get(name) {
            return Ok(*kind);
        }

        #[cfg(feature = "tracing")]
        if !name.ends_with("Error") {
            tracing::warn!(
                target: "dynerr",
                name,
                "strange kind name, kind names should end with \"Error\""
            );
        }

        let name: &'static str = Box::leak(name.to_owned().into_boxed_str());
        let kind = Kind(Box::leak(Box::new(KindData {
            name,
            parent: Some(base),
        })));
        history.insert(name, kind);
        Ok(kind)
    }

    /// Whether `name` has been registered.
    pub fn contains(&self, name: &str) -> bool {
        self.history.read().contains_key(name)
    }

    /// Read-only snapshot of every kind ever created through this registry,
    /// sorted by name. Builtin kinds are not included.
    pub fn history(&self) -> Vec<Kind> {
        let mut kinds: Vec<Kind> = self.history.read().values().copied().collect();
        kinds.sort_by_key(|k| k.name());
        kinds
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.history.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.read().is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide registry.
pub fn registry() -> &'static Registry {
    static GLOBAL: OnceLock<Registry> = OnceLock::new();
    GLOBAL.get_or_init(Registry::new)
}

/// Resolve `name` against the process-wide registry.
pub fn resolve(name: &str) -> Result<Kind> {
    registry().resolve(name)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
