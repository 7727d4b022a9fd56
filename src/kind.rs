//! Error kinds and kind sets.
//!
//! A [`Kind`] is a named category of runtime failure. Kinds form a hierarchy
//! rooted at [`ERROR`]: every kind created through the registry descends from
//! it, so a handler configured with `ERROR` claims everything.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::ptr;

use smallvec::SmallVec;

use crate::error::Error;

/// Descriptor behind a [`Kind`]. One per name per process, never freed.
pub(crate) struct KindData {
    pub(crate) name: &'static str,
    pub(crate) parent: Option<Kind>,
}

/// A named error kind.
///
/// `Kind` is a copyable handle to a process-lifetime descriptor. Equality is
/// pointer identity: two `Kind`s compare equal exactly when they came from
/// the same registry entry (or the same builtin), which is what makes
/// `resolve("X") == resolve("X")` hold for the life of the process.
#[derive(Clone, Copy)]
pub struct Kind(pub(crate) &'static KindData);

static ERROR_DATA: KindData = KindData {
    name: "Error",
    parent: None,
};

static PARAMETER_ERROR_DATA: KindData = KindData {
    name: "ParameterError",
    parent: Some(Kind(&ERROR_DATA)),
};

static NAME_CONFLICT_ERROR_DATA: KindData = KindData {
    name: "NameConflictError",
    parent: Some(Kind(&ERROR_DATA)),
};

/// The universal root kind. Every kind descends from it.
pub static ERROR: Kind = Kind(&ERROR_DATA);

/// Configuration errors raised at handler construction time.
pub static PARAMETER_ERROR: Kind = Kind(&PARAMETER_ERROR_DATA);

/// Raised when a name collides with the registry's own surface.
pub static NAME_CONFLICT_ERROR: Kind = Kind(&NAME_CONFLICT_ERROR_DATA);

/// Builtin kinds resolve directly to their statics and never enter history.
pub(crate) fn builtin(name: &str) -> Option<Kind> {
    match name {
        "Error" => Some(ERROR),
        "ParameterError" => Some(PARAMETER_ERROR),
        "NameConflictError" => Some(NAME_CONFLICT_ERROR),
        _ => None,
    }
}

impl Kind {
    /// The kind's name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.0.name
    }

    /// The parent kind, if any. Only [`ERROR`] has none.
    #[inline]
    pub fn parent(&self) -> Option<Kind> {
        self.0.parent
    }

    /// Whether this kind is `other` or a specialization of it.
    pub fn is(&self, other: Kind) -> bool {
        let mut cur = Some(*self);
        while let Some(k) = cur {
            if k == other {
                return true;
            }
            cur = k.parent();
        }
        false
    }

    /// Create an error of this kind, capturing the caller's location.
    #[track_caller]
    pub fn error(self, message: impl Into<String>) -> Error {
        Error::new(self, message)
    }

    /// Shorthand for `Err(kind.error(message))`.
    #[track_caller]
    pub fn raise<T>(self, message: impl Into<String>) -> crate::Result<T> {
        Err(self.error(message))
    }
}

impl PartialEq for Kind {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.0, other.0)
    }
}

impl Eq for Kind {}

impl Hash for Kind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.0 as *const KindData as usize).hash(state);
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Kind").field(&self.name()).finish()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of kinds a handler is configured to claim.
///
/// Small sets (the common case) are stored inline. Matching walks the kind
/// hierarchy, so a set containing a broad kind also claims its
/// specializations.
#[derive(Clone, Debug, Default)]
pub struct KindSet(SmallVec<[Kind; 4]>);

impl KindSet {
    /// An empty set. Handlers that require at least one kind reject this at
    /// construction.
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Add a kind to the set.
    pub fn insert(&mut self, kind: Kind) {
        if !self.0.contains(&kind) {
            self.0.push(kind);
        }
    }

    /// Whether `kind` is a member of (or a specialization of a member of)
    /// this set.
    pub fn matches(&self, kind: Kind) -> bool {
        self.0.iter().any(|k| kind.is(*k))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Kind> + '_ {
        self.0.iter().copied()
    }
}

impl From<Kind> for KindSet {
    fn from(kind: Kind) -> Self {
        let mut set = Self::new();
        set.insert(kind);
        set
    }
}

impl<const N: usize> From<[Kind; N]> for KindSet {
    fn from(kinds: [Kind; N]) -> Self {
        kinds.into_iter().collect()
    }
}

impl From<&[Kind]> for KindSet {
    fn from(kinds: &[Kind]) -> Self {
        kinds.iter().copied().collect()
    }
}

impl From<Vec<Kind>> for KindSet {
    fn from(kinds: Vec<Kind>) -> Self {
        kinds.into_iter().collect()
    }
}

impl FromIterator<Kind> for KindSet {
    fn from_iter<I: IntoIterator<Item = Kind>>(iter: I) -> Self {
        let mut set = Self::new();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;

    #[test]
    fn builtin_identity() {
        assert_eq!(ERROR, ERROR);
        assert_ne!(ERROR, PARAMETER_ERROR);
        assert_eq!(ERROR.name(), "Error");
        assert!(ERROR.parent().is_none());
    }

    #[test]
    fn hierarchy_walk() {
        assert!(PARAMETER_ERROR.is(ERROR));
        assert!(PARAMETER_ERROR.is(PARAMETER_ERROR));
        assert!(!ERROR.is(PARAMETER_ERROR));
    }

    #[test]
    fn registered_kinds_descend_from_root() {
        let kind = registry().resolve("KindHierarchyError").unwrap();
        assert!(kind.is(ERROR));
        assert_eq!(kind.parent(), Some(ERROR));
    }

    #[test]
    fn set_matches_specializations() {
        let base = registry().resolve("SetBaseError").unwrap();
        let child = registry().resolve_under("SetChildError", base).unwrap();
        let set = KindSet::from(base);
        assert!(set.matches(base));
        assert!(set.matches(child));
        assert!(!set.matches(PARAMETER_ERROR));
    }

    #[test]
    fn set_deduplicates() {
        let set: KindSet = [ERROR, ERROR, PARAMETER_ERROR].into();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn universal_set_claims_everything() {
        let set = KindSet::from(ERROR);
        let kind = registry().resolve("AnythingGoesError").unwrap();
        assert!(set.matches(kind));
        assert!(set.matches(NAME_CONFLICT_ERROR));
    }
}
