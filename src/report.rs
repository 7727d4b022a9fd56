//! Rendering handled errors to a sink.
//!
//! Reporting is best-effort by contract: a broken sink must never turn a
//! handled error into an unhandled crash, so write failures are ignored and
//! sink panics are contained.

use core::fmt;
use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::Error;

/// Destination for reported error lines.
///
/// Implemented for closures, so `Reporter::with_sink(|line: &str| ...)`
/// redirects reporting without changing caller code. Sinks receive the
/// rendered line without a trailing newline.
pub trait Sink: Send + Sync {
    fn write_line(&self, line: &str);
}

impl<F> Sink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn write_line(&self, line: &str) {
        self(line)
    }
}

/// The default sink: standard error, each line prefixed with a local
/// timestamp.
pub struct Stderr;

impl Sink for Stderr {
    fn write_line(&self, line: &str) {
        let now = chrono::Local::now().format("%F %T");
        let _ = writeln!(std::io::stderr(), "[{now}] {line}");
    }
}

/// Sink that forwards lines to `tracing` at error level.
#[cfg(feature = "tracing")]
pub struct TracingSink;

#[cfg(feature = "tracing")]
impl Sink for TracingSink {
    fn write_line(&self, line: &str) {
        tracing::error!(target: "dynerr", "{line}");
    }
}

/// Renders a caught [`Error`] into one short line and writes it to a sink.
///
/// Never panics and never errors: rendering and writing failures are
/// swallowed so the protected code path stays protected.
#[derive(Clone)]
pub struct Reporter {
    sink: Arc<dyn Sink>,
    verbose: bool,
}

impl Reporter {
    /// Reporter writing to [`Stderr`].
    pub fn new() -> Self {
        Self {
            sink: Arc::new(Stderr),
            verbose: false,
        }
    }

    /// Reporter writing to the given sink.
    pub fn with_sink(sink: impl Sink + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
            verbose: false,
        }
    }

    /// Replace the sink.
    pub fn sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Include the raising location in rendered lines.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Report a handled error.
    pub fn report(&self, e: &Error) {
        self.emit(self.render(e));
    }

    /// Report one failed retry attempt out of `count`.
    pub fn report_attempt(&self, e: &Error, attempt: u32, count: u32) {
        self.emit(format!("[try:{attempt}/{count}] {}", self.render(e)));
    }

    fn render(&self, e: &Error) -> String {
        if self.verbose {
            format!("[{}:{}.{}] {}", e.file(), e.line(), e.kind(), e.message())
        } else {
            format!("[{}] {}", e.kind(), e.message())
        }
    }

    fn emit(&self, line: String) {
        let sink = &self.sink;
        let _ = catch_unwind(AssertUnwindSafe(|| sink.write_line(&line)));
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}
