//! Bounded retry of a failing callable.

use std::time::Duration;

use crate::error::Error;
use crate::handle::Matcher;
use crate::kind::{KindSet, ERROR, PARAMETER_ERROR};
use crate::report::{Reporter, Sink};
use crate::Result;

/// Default attempt budget, counting the first attempt.
pub const DEFAULT_COUNT: u32 = 3;

/// Re-invokes a failing callable up to a bounded count.
///
/// Defaults: retry on any kind (the universal root), three attempts, no pause
/// between attempts. A failure whose kind is outside the configured set
/// propagates immediately without consuming an attempt; once the budget is
/// spent the last error itself is returned, not a wrapper, so callers see the
/// true root cause.
///
/// The pause between attempts is a blocking sleep of the calling thread.
/// Re-invocation is assumed safe to repeat: nothing compensates for partial
/// side effects between attempts.
///
/// ```
/// use dynerr::{resolve, Result, Retry};
///
/// # fn main() -> Result<()> {
/// let flaky = resolve("FlakyError")?;
/// let retry = Retry::new().kinds(flaky)?.count(3)?;
///
/// let mut runs = 0;
/// let value = retry.call(|| {
///     runs += 1;
///     if runs < 3 {
///         flaky.raise("transient")
///     } else {
///         Ok("done")
///     }
/// })?;
/// assert_eq!(value, "done");
/// assert_eq!(runs, 3);
/// # Ok(())
/// # }
/// ```
pub struct Retry {
    matcher: Matcher,
    count: u32,
    interval: Duration,
    attempt_reporter: Option<Reporter>,
}

impl core::fmt::Debug for Retry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Retry")
            .field("matcher", &self.matcher)
            .field("count", &self.count)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl Retry {
    /// A retry policy with the defaults above.
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(KindSet::from(ERROR)),
            count: DEFAULT_COUNT,
            interval: Duration::ZERO,
            attempt_reporter: None,
        }
    }

    /// Restrict retrying to the given kinds. An explicitly empty set is a
    /// `ParameterError`.
    pub fn kinds(mut self, kinds: impl Into<KindSet>) -> Result<Self> {
        let kinds = kinds.into();
        if kinds.is_empty() {
            return PARAMETER_ERROR.raise("at least one exception kind is required");
        }
        self.matcher = Matcher::new(kinds);
        Ok(self)
    }

    /// Set the attempt budget. Zero is a `ParameterError`: the callable must
    /// be attempted at least once.
    pub fn count(mut self, count: u32) -> Result<Self> {
        if count == 0 {
            return PARAMETER_ERROR.raise("retry count must be at least 1");
        }
        self.count = count;
        Ok(self)
    }

    /// Pause between attempts. Zero means immediate retry.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Pause between attempts, given as a unit string such as `"1m30s"` or
    /// bare seconds. See [`parse_duration`].
    pub fn interval_str(self, interval: &str) -> Result<Self> {
        Ok(self.interval(parse_duration(interval)?))
    }

    /// Only retry errors whose message contains `needle`.
    pub fn when_message(mut self, needle: impl Into<String>) -> Self {
        self.matcher.message(needle);
        self
    }

    /// Retry errors whose kind is NOT in the configured set.
    pub fn invert(mut self, invert: bool) -> Self {
        self.matcher.invert(invert);
        self
    }

    /// Report each failed attempt through `sink` with a `[try:N/COUNT]`
    /// prefix. Off by default, so a composed outer handler reports exactly
    /// once, after exhaustion.
    pub fn report_attempts(mut self, sink: impl Sink + 'static) -> Self {
        self.attempt_reporter = Some(Reporter::with_sink(sink));
        self
    }

    /// Invoke `f`, retrying matching failures up to the attempt budget.
    pub fn call<T>(&self, mut f: impl FnMut() -> Result<T>) -> Result<T> {
        // RetryState: fresh per invocation, never shared across calls.
        let mut attempts = 0u32;
        loop {
            match f() {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if !self.should_retry(&e, &mut attempts) {
                        return Err(e);
                    }
                    if !self.interval.is_zero() {
                        std::thread::sleep(self.interval);
                    }
                }
            }
        }
    }

    /// Async form of [`call`](Retry::call); the pause awaits
    /// `tokio::time::sleep` instead of blocking the thread.
    #[cfg(feature = "async")]
    pub async fn call_async<T, Fut>(&self, mut f: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: core::future::Future<Output = Result<T>>,
    {
        let mut attempts = 0u32;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if !self.should_retry(&e, &mut attempts) {
                        return Err(e);
                    }
                    if !self.interval.is_zero() {
                        tokio::time::sleep(self.interval).await;
                    }
                }
            }
        }
    }

    /// Decorator form: wrap `f` into a closure with the same calling
    /// convention.
    pub fn wrap<T, F>(self, f: F) -> impl Fn() -> Result<T>
    where
        F: Fn() -> Result<T>,
    {
        move || self.call(&f)
    }

    /// Consume one attempt for a matching failure. False means propagate:
    /// either the failure is not ours to retry or the budget is spent.
    fn should_retry(&self, e: &Error, attempts: &mut u32) -> bool {
        if !self.matcher.claims(e) {
            return false;
        }
        *attempts += 1;
        if let Some(reporter) = &self.attempt_reporter {
            reporter.report_attempt(e, *attempts, self.count);
        }
        *attempts < self.count
    }
}

impl Default for Retry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a duration from a unit string.
///
/// Accepts bare seconds (`"90"`, `"0.5"`) or a sequence of valued units in
/// descending order, `d` > `h` > `m` > `s` (`"1d2h"`, `"1m30s"`, `"2h30m"`).
/// A trailing bare number counts as seconds. Case-insensitive.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    let bad = || PARAMETER_ERROR.error(format!("unit time {s:?} format is incorrect"));

    if s.is_empty() {
        return Err(bad());
    }

    let mut total = 0f64;
    let mut last_span = f64::INFINITY;
    let mut chars = s.chars().peekable();

    while chars.peek().is_some() {
        let mut number = String::new();
        while let Some(c) = chars.peek() {
            if c.is_ascii_digit() || *c == '.' {
                number.push(*c);
                chars.next();
            } else {
                break;
            }
        }
        let value: f64 = number.parse().map_err(|_| bad())?;
        if !value.is_finite() || value < 0.0 {
            return Err(bad());
        }

        let span = match chars.next() {
            Some(c) => match c.to_ascii_lowercase() {
                'd' => 86400.0,
                'h' => 3600.0,
                'm' => 60.0,
                's' => 1.0,
                _ => return Err(bad()),
            },
            // Trailing bare number is seconds.
            None => 1.0,
        };
        // Units must appear in descending order, each at most once.
        if span >= last_span {
            return Err(bad());
        }
        last_span = span;
        total += value * span;
    }

    if !total.is_finite() || total > u64::MAX as f64 {
        return Err(bad());
    }
    Ok(Duration::from_secs_f64(total))
}

/// Render a duration as a unit string: `90s` becomes `"1m30s"`, zero becomes
/// `"0s"`. Sub-second remainders are kept to two decimal places.
pub fn format_duration(d: Duration) -> String {
    let mut sec = d.as_secs();
    let mut dec = (d.subsec_nanos() as f64 / 1e9 * 100.0).round() / 100.0;
    if dec >= 1.0 {
        sec += 1;
        dec = 0.0;
    }

    let mut out = String::new();
    for (unit, span) in [("d", 86400), ("h", 3600), ("m", 60)] {
        if sec >= span {
            out.push_str(&format!("{}{}", sec / span, unit));
            sec %= span;
        }
    }

    if sec > 0 || dec > 0.0 || out.is_empty() {
        if dec > 0.0 {
            let mut rendered = format!("{:.2}", sec as f64 + dec);
            while rendered.ends_with('0') {
                rendered.pop();
            }
            out.push_str(&rendered);
            out.push('s');
        } else if sec > 0 || out.is_empty() {
            out.push_str(&format!("{sec}s"));
        }
    }

    out
}
