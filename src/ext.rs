//! Extension trait for one-off handling of `Result` values.

use crate::error::Error;
use crate::kind::Kind;
use crate::report::Reporter;
use crate::Result;

/// Extensions on `Result<T, Error>`.
pub trait ResultExt<T> {
    /// Report the error and swallow it, yielding the sentinel absence.
    ///
    /// Unlike a handler this claims any error kind; it is the one-off
    /// equivalent of an unconditional `TryExcept` around a single value.
    fn or_report(self, reporter: &Reporter) -> Option<T>;

    /// Replace the error's kind, keeping the message.
    fn rekind(self, kind: Kind) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn or_report(self, reporter: &Reporter) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                reporter.report(&e);
                None
            }
        }
    }

    fn rekind(self, kind: Kind) -> Result<T> {
        self.map_err(|e| Error::new(kind, e.message().to_owned()))
    }
}
