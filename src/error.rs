//! The error value raised and handled by this crate.

use core::fmt;
use core::panic::Location;
use std::error::Error as StdError;

use crate::kind::{Kind, KindSet, ERROR};
use crate::registry;

/// An error instance: a [`Kind`], a message, and the location it was raised.
///
/// Created through [`Kind::error`], [`Kind::raise`], the `raise!` macro, or
/// by adopting a foreign error with [`Error::wrap`]. The raising location is
/// captured via `#[track_caller]` so the reporter can show where the failure
/// originated without a full backtrace.
#[derive(Debug)]
pub struct Error {
    kind: Kind,
    message: String,
    location: &'static Location<'static>,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Error {
    /// Create an error of the given kind.
    #[track_caller]
    pub fn new(kind: Kind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: Location::caller(),
            source: None,
        }
    }

    /// Adopt a foreign error value.
    ///
    /// The kind is resolved from the error's short type name (so an
    /// `AddrParseError` matches a handler configured with
    /// `resolve("AddrParseError")`), falling back to the root kind when the
    /// type name is not a usable kind name. The original value is preserved
    /// and reachable through [`source`](StdError::source).
    #[track_caller]
    pub fn wrap<E>(e: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let name = short_type_name::<E>();
        let kind = registry().resolve(name).unwrap_or(ERROR);
        Self {
            kind,
            message: e.to_string(),
            location: Location::caller(),
            source: Some(Box::new(e)),
        }
    }

    /// The error's kind.
    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this error's kind is `kind` or a specialization of it.
    pub fn is(&self, kind: Kind) -> bool {
        self.kind.is(kind)
    }

    /// Whether this error's kind is claimed by `kinds`.
    pub fn is_any(&self, kinds: &KindSet) -> bool {
        kinds.matches(self.kind)
    }

    /// Source file where the error was raised.
    pub fn file(&self) -> &'static str {
        self.location.file()
    }

    /// Source line where the error was raised.
    pub fn line(&self) -> u32 {
        self.location.line()
    }

    /// Source column where the error was raised.
    pub fn column(&self) -> u32 {
        self.location.column()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Last path segment of a type name, with any generic arguments stripped.
fn short_type_name<T>() -> &'static str {
    let full = core::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
