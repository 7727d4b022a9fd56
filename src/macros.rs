//! Syntactic sugar for kind resolution.
//!
//! These are the Rust stand-in for attribute-triggered creation: naming a
//! kind resolves it through the process-wide registry, creating it on first
//! use.

/// Resolve a kind by bare name: `kind!(TimeoutError)` is
/// `resolve("TimeoutError")`.
///
/// ```
/// use dynerr::kind;
///
/// # fn main() -> dynerr::Result<()> {
/// let timeout = kind!(TimeoutError)?;
/// assert_eq!(timeout.name(), "TimeoutError");
/// assert_eq!(timeout, kind!(TimeoutError)?);
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! kind {
    ($name:ident) => {
        $crate::registry().resolve(stringify!($name))
    };
}

/// Resolve several kinds into a [`KindSet`](crate::KindSet).
///
/// ```
/// use dynerr::{kinds, TryExcept};
///
/// # fn main() -> dynerr::Result<()> {
/// let guard = TryExcept::new(kinds![ReadError, WriteError]?)?;
/// # let _ = guard;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! kinds {
    ($($name:ident),+ $(,)?) => {
        (|| -> $crate::Result<$crate::KindSet> {
            ::core::result::Result::Ok($crate::KindSet::from_iter([
                $($crate::registry().resolve(stringify!($name))?,)+
            ]))
        })()
    };
}

/// Raise an error of a named kind from the current function.
///
/// Expands to an early `return Err(..)`; the enclosing function must return
/// [`Result`](crate::Result). The message is a `format!` string.
///
/// ```
/// use dynerr::{raise, Result};
///
/// fn parse(input: &str) -> Result<u32> {
///     if input.is_empty() {
///         raise!(ValueError, "empty input");
///     }
///     Ok(input.len() as u32)
/// }
///
/// let err = parse("").unwrap_err();
/// assert_eq!(err.kind().name(), "ValueError");
/// assert_eq!(err.message(), "empty input");
/// ```
#[macro_export]
macro_rules! raise {
    ($name:ident, $($arg:tt)+) => {
        return ::core::result::Result::Err(
            match $crate::registry().resolve(stringify!($name)) {
                ::core::result::Result::Ok(kind) => kind.error(::std::format!($($arg)+)),
                ::core::result::Result::Err(err) => err,
            }
        )
    };
}
