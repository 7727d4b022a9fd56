//! End-to-end behavior across the registry and the handling layer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use dynerr::{kind, kinds, raise, registry, resolve, Result, Retry, TryContext, TryExcept};

fn counting_sink() -> (Arc<AtomicUsize>, impl Fn(&str) + Send + Sync) {
    let count = Arc::new(AtomicUsize::new(0));
    let sink_count = Arc::clone(&count);
    (count, move |_: &str| {
        sink_count.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn try_except_over_retry_reports_once_after_exhaustion() {
    let k = kind!(ComposedError).unwrap();
    let (count, sink) = counting_sink();

    let retry = Retry::new().kinds(k).unwrap().count(3).unwrap();
    let guard = TryExcept::new(k).unwrap().sink(sink);

    let runs = Arc::new(AtomicUsize::new(0));
    let runs_inner = Arc::clone(&runs);
    let out = guard
        .call(|| {
            retry.call(|| -> Result<()> {
                runs_inner.fetch_add(1, Ordering::SeqCst);
                k.raise("always down")
            })
        })
        .unwrap();

    assert_eq!(out, None, "exhausted error is claimed by the outer guard");
    assert_eq!(runs.load(Ordering::SeqCst), 3, "callable runs exactly count times");
    assert_eq!(count.load(Ordering::SeqCst), 1, "reported exactly once");
}

#[test]
fn retry_success_escapes_the_outer_guard_untouched() {
    let k = kind!(ComposedRecoveryError).unwrap();
    let (count, sink) = counting_sink();

    let retry = Retry::new().kinds(k).unwrap().count(5).unwrap();
    let guard = TryExcept::new(k).unwrap().sink(sink);

    let mut runs = 0;
    let out = guard
        .call(|| {
            retry.call(|| {
                runs += 1;
                if runs < 2 {
                    k.raise("transient")
                } else {
                    Ok("recovered")
                }
            })
        })
        .unwrap();

    assert_eq!(out, Some("recovered"));
    assert_eq!(runs, 2);
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn unrelated_kind_passes_through_both_layers() {
    let wanted = kind!(ComposedWantedError).unwrap();
    let unrelated = kind!(ComposedUnrelatedError).unwrap();

    let retry = Retry::new().kinds(wanted).unwrap().count(4).unwrap();
    let guard = TryExcept::new(wanted).unwrap().silent(true);

    let mut runs = 0;
    let err = guard
        .call(|| {
            retry.call(|| -> Result<()> {
                runs += 1;
                unrelated.raise("none of your business")
            })
        })
        .unwrap_err();

    assert_eq!(runs, 1, "fail-fast: no retry attempt consumed");
    assert_eq!(err.kind(), unrelated);
    assert_eq!(err.message(), "none of your business");
}

#[test]
fn context_scopes_a_block_with_the_same_rules() {
    let k = kind!(ComposedScopeError).unwrap();
    let (count, sink) = counting_sink();
    let scope = TryContext::new(k).unwrap().sink(sink);

    let out = scope
        .run(|| {
            raise!(ComposedScopeError, "inside");
            #[allow(unreachable_code)]
            Ok(())
        })
        .unwrap();

    // Execution resumes past the scope boundary.
    assert_eq!(out, None);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_first_resolution_yields_one_kind() {
    let kinds: Vec<_> = (0..16)
        .map(|_| {
            thread::spawn(|| resolve("ConcurrentFirstError").unwrap())
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    let first = kinds[0];
    for k in &kinds {
        assert_eq!(*k, first);
    }
    assert!(registry().contains("ConcurrentFirstError"));
}

#[test]
fn foreign_errors_are_handled_by_resolved_kind() {
    #[derive(Debug, thiserror::Error)]
    #[error("backend said no: {0}")]
    struct BackendError(String);

    let backend = kind!(BackendError).unwrap();
    let guard = TryExcept::new(backend).unwrap().silent(true);

    let out = guard
        .call(|| -> Result<()> {
            Err(dynerr::Error::wrap(BackendError("quota".into())))
        })
        .unwrap();
    assert_eq!(out, None);

    let err = guard
        .call(|| -> Result<()> {
            let parse_err = "x".parse::<u8>().unwrap_err();
            Err(dynerr::Error::wrap(parse_err))
        })
        .unwrap_err();
    assert_eq!(err.kind().name(), "ParseIntError");
}

#[test]
fn kind_set_macro_feeds_handlers() {
    let set = kinds![ComposedSetAError, ComposedSetBError].unwrap();
    let guard = TryExcept::new(set).unwrap().silent(true);

    let a = kind!(ComposedSetAError).unwrap();
    let b = kind!(ComposedSetBError).unwrap();
    assert_eq!(guard.call(|| a.raise::<()>("a")).unwrap(), None);
    assert_eq!(guard.call(|| b.raise::<()>("b")).unwrap(), None);
}

#[test]
fn history_accumulates_across_entry_points() {
    kind!(HistoryViaMacroError).unwrap();
    resolve("HistoryViaFnError").unwrap();
    registry().resolve("HistoryViaRegistryError").unwrap();

    let names: Vec<_> = registry().history().iter().map(|k| k.name()).collect();
    for name in [
        "HistoryViaMacroError",
        "HistoryViaFnError",
        "HistoryViaRegistryError",
    ] {
        assert!(names.contains(&name), "missing {name}");
        assert!(registry().contains(name));
    }
}
