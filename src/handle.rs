//! Catch-and-report handlers: [`TryExcept`] for callables, [`TryContext`]
//! for scoped blocks.
//!
//! Handlers are explicit opt-in: they only claim errors whose kind is in
//! their configured set, everything else propagates unchanged through every
//! layer. A claimed error is reported exactly once and swallowed; the call
//! yields the sentinel absence `Ok(None)`.

use crate::error::Error;
use crate::kind::{KindSet, PARAMETER_ERROR};
use crate::report::{Reporter, Sink};
use crate::Result;

/// Which errors a handler claims.
///
/// Kind membership walks the hierarchy; the optional message filter narrows
/// to errors whose message contains a substring; `invert` flips kind
/// membership (claim everything except the configured kinds).
#[derive(Clone, Debug)]
pub(crate) struct Matcher {
    kinds: KindSet,
    message: Option<String>,
    invert: bool,
}

impl Matcher {
    pub(crate) fn new(kinds: KindSet) -> Self {
        Self {
            kinds,
            message: None,
            invert: false,
        }
    }

    pub(crate) fn message(&mut self, needle: impl Into<String>) {
        self.message = Some(needle.into());
    }

    pub(crate) fn invert(&mut self, invert: bool) {
        self.invert = invert;
    }

    pub(crate) fn claims(&self, e: &Error) -> bool {
        let contained = self
            .message
            .as_deref()
            .map_or(true, |needle| e.message().contains(needle));
        if self.kinds.matches(e.kind()) {
            !self.invert && contained
        } else {
            self.invert && contained
        }
    }
}

/// Shared catch/report core of [`TryExcept`] and [`TryContext`].
struct Handler {
    matcher: Matcher,
    reporter: Reporter,
    silent: bool,
    callback: Option<Box<dyn Fn(&Error) + Send + Sync>>,
}

impl Handler {
    fn new(kinds: impl Into<KindSet>) -> Result<Self> {
        let kinds = kinds.into();
        if kinds.is_empty() {
            return PARAMETER_ERROR.raise("at least one exception kind is required");
        }
        Ok(Self {
            matcher: Matcher::new(kinds),
            reporter: Reporter::new(),
            silent: false,
            callback: None,
        })
    }

    fn handle(&self, e: &Error) {
        if !self.silent {
            self.reporter.report(e);
        }
        if let Some(callback) = &self.callback {
            callback(e);
        }
    }

    fn run<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<Option<T>> {
        match f() {
            Ok(value) => Ok(Some(value)),
            Err(e) if self.matcher.claims(&e) => {
                self.handle(&e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    #[cfg(feature = "async")]
    async fn run_async<T, Fut>(&self, f: impl FnOnce() -> Fut) -> Result<Option<T>>
    where
        Fut: core::future::Future<Output = Result<T>>,
    {
        match f().await {
            Ok(value) => Ok(Some(value)),
            Err(e) if self.matcher.claims(&e) => {
                self.handle(&e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

macro_rules! handler_builders {
    () => {
        /// Replace the reporting sink.
        pub fn sink(mut self, sink: impl Sink + 'static) -> Self {
            self.inner.reporter = self.inner.reporter.sink(sink);
            self
        }

        /// Include the raising location in reported lines.
        pub fn verbose(mut self, verbose: bool) -> Self {
            self.inner.reporter = self.inner.reporter.verbose(verbose);
            self
        }

        /// Claim errors without reporting them.
        pub fn silent(mut self, silent: bool) -> Self {
            self.inner.silent = silent;
            self
        }

        /// Only claim errors whose message contains `needle`.
        pub fn when_message(mut self, needle: impl Into<String>) -> Self {
            self.inner.matcher.message(needle);
            self
        }

        /// Claim errors whose kind is NOT in the configured set.
        pub fn invert(mut self, invert: bool) -> Self {
            self.inner.matcher.invert(invert);
            self
        }

        /// Run a callback after a claimed error has been reported.
        pub fn on_error(mut self, callback: impl Fn(&Error) + Send + Sync + 'static) -> Self {
            self.inner.callback = Some(Box::new(callback));
            self
        }
    };
}

/// Wraps a callable; claimed errors are reported and swallowed.
///
/// On success the wrapped call returns `Ok(Some(value))`; a claimed error is
/// reported once and the call returns `Ok(None)`; an unclaimed error is
/// returned unchanged, so this never becomes a catch-all.
///
/// ```
/// use dynerr::{resolve, Result, TryExcept};
///
/// # fn main() -> Result<()> {
/// let value_error = resolve("ValueError")?;
/// let guard = TryExcept::new(value_error)?.silent(true);
///
/// let handled = guard.call(|| value_error.raise::<i32>("not a number"))?;
/// assert_eq!(handled, None);
/// # Ok(())
/// # }
/// ```
pub struct TryExcept {
    inner: Handler,
}

impl core::fmt::Debug for TryExcept {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TryExcept").finish_non_exhaustive()
    }
}

impl TryExcept {
    /// Configure a handler for the given kinds.
    ///
    /// At least one kind is required; an empty set is a `ParameterError` at
    /// construction time, never deferred to call time.
    pub fn new(kinds: impl Into<KindSet>) -> Result<Self> {
        Ok(Self {
            inner: Handler::new(kinds)?,
        })
    }

    handler_builders!();

    /// Invoke `f`, claiming a matching error.
    pub fn call<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<Option<T>> {
        self.inner.run(f)
    }

    /// Invoke an async `f`, claiming a matching error.
    #[cfg(feature = "async")]
    pub async fn call_async<T, Fut>(&self, f: impl FnOnce() -> Fut) -> Result<Option<T>>
    where
        Fut: core::future::Future<Output = Result<T>>,
    {
        self.inner.run_async(f).await
    }

    /// Decorator form: wrap `f` into a closure with the same calling
    /// convention.
    pub fn wrap<T, F>(self, f: F) -> impl Fn() -> Result<Option<T>>
    where
        F: Fn() -> Result<T>,
    {
        move || self.call(&f)
    }
}

/// [`TryExcept`] semantics scoped to a single block of caller code.
///
/// The block is passed as a closure to [`run`](TryContext::run); entry and
/// exit are symmetric on every path (normal completion, claimed error,
/// propagating error), and a claimed error is reported exactly once.
///
/// ```
/// use dynerr::{resolve, Result, TryContext};
///
/// # fn main() -> Result<()> {
/// let io_error = resolve("IoError")?;
/// let scope = TryContext::new(io_error)?.silent(true);
///
/// let out = scope.run(|| {
///     io_error.raise::<()>("disk on fire")?;
///     Ok(())
/// })?;
/// assert_eq!(out, None); // execution resumes here
/// # Ok(())
/// # }
/// ```
pub struct TryContext {
    inner: Handler,
}

impl core::fmt::Debug for TryContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TryContext").finish_non_exhaustive()
    }
}

impl TryContext {
    /// Configure a scope for the given kinds. Same construction rules as
    /// [`TryExcept::new`].
    pub fn new(kinds: impl Into<KindSet>) -> Result<Self> {
        Ok(Self {
            inner: Handler::new(kinds)?,
        })
    }

    handler_builders!();

    /// Run a block under this scope.
    pub fn run<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<Option<T>> {
        self.inner.run(f)
    }

    /// Run an async block under this scope.
    #[cfg(feature = "async")]
    pub async fn run_async<T, Fut>(&self, f: impl FnOnce() -> Fut) -> Result<Option<T>>
    where
        Fut: core::future::Future<Output = Result<T>>,
    {
        self.inner.run_async(f).await
    }
}
