//! dynerr - dynamic named error kinds with catch/report/retry handling
//!
//! # Overview
//!
//! `dynerr` lets callers reference an error kind by name without declaring it
//! anywhere: the first resolution of a name creates the kind, every later
//! resolution returns the identical kind for the life of the process. On top
//! of the registry sits a small control-flow layer that wraps closures or
//! code blocks with catch, report, and retry semantics.
//!
//! # Quick Start
//!
//! ```
//! use dynerr::{kind, Result, TryExcept};
//!
//! fn main() -> Result<()> {
//!     let value_error = kind!(ValueError)?;
//!     let guard = TryExcept::new(value_error)?.silent(true);
//!
//!     let out = guard.call(|| value_error.raise::<i32>("not a number"))?;
//!     assert_eq!(out, None); // claimed, reported, swallowed
//!     Ok(())
//! }
//! ```
//!
//! # Constructs
//!
//! | Construct | Description |
//! |-----------|-------------|
//! | `kind!(Name)` / `resolve("Name")` | Resolve a kind, creating it on first use |
//! | `kinds![A, B]` | Resolve several kinds into a `KindSet` |
//! | `raise!(Name, "msg {}", x)` | Early-return an error of a named kind |
//! | `TryExcept::new(kinds)?.call(f)` | Catch, report, swallow (`Ok(None)`) |
//! | `Retry::new().kinds(k)?.count(n)?.call(f)` | Bounded re-invocation |
//! | `TryContext::new(kinds)?.run(\|\| { .. })` | Scoped catch-and-report |
//! | `registry().history()` | Every kind ever created, read-only |
//!
//! # Matching
//!
//! Handlers are explicit opt-in: they claim an error only when its kind is a
//! member of (or a specialization of a member of) their configured set.
//! Anything else propagates unchanged through every layer. `Retry` defaults
//! to the universal root kind and therefore retries anything.
//!
//! # Composition
//!
//! Stack handlers as plain closure composition, innermost first:
//!
//! ```
//! use dynerr::{kind, Result, Retry, TryExcept};
//!
//! # fn main() -> Result<()> {
//! let flaky = kind!(FlakyError)?;
//! let retry = Retry::new().kinds(flaky)?.count(3)?;
//! let guard = TryExcept::new(flaky)?.silent(true);
//!
//! // TryExcept sees only the error that survives Retry's exhaustion.
//! let out = guard.call(|| retry.call(|| flaky.raise::<()>("still down")))?;
//! assert_eq!(out, None);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `async` - `call_async`/`run_async` variants; retry pauses await
//!   `tokio::time::sleep` instead of blocking.
//! - `tracing` - a `TracingSink` reporter sink plus registry diagnostics.

// ============================================================
// Modules
// ============================================================

mod error;
mod ext;
mod handle;
pub mod kind;
mod macros;
mod registry;
pub mod report;
mod retry;

// ============================================================
// Re-exports
// ============================================================

pub use error::Error;
pub use ext::ResultExt;
pub use handle::{TryContext, TryExcept};
pub use kind::{Kind, KindSet};
pub use registry::{registry, resolve, Registry};
pub use report::{Reporter, Sink, Stderr};
pub use retry::{format_duration, parse_duration, Retry, DEFAULT_COUNT};

// ============================================================
// Type aliases
// ============================================================

/// Result type alias.
///
/// `Result<T>` = `core::result::Result<T, Error>`; the error position
/// defaults to this crate's [`Error`] but stays overridable.
pub type Result<T, E = Error> = core::result::Result<T, E>;
