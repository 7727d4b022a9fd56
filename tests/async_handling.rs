//! Async variants of the handling layer.

#![cfg(feature = "async")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dynerr::{kind, Retry, TryContext, TryExcept};

#[tokio::test]
async fn async_try_except_claims_matching_errors() {
    let k = kind!(AsyncClaimedError).unwrap();
    let guard = TryExcept::new(k).unwrap().silent(true);

    let out = guard
        .call_async(|| async move { k.raise::<i32>("async failure") })
        .await
        .unwrap();
    assert_eq!(out, None);

    let out = guard.call_async(|| async { Ok(7) }).await.unwrap();
    assert_eq!(out, Some(7));
}

#[tokio::test]
async fn async_try_except_propagates_the_rest() {
    let k = kind!(AsyncWantedError).unwrap();
    let other = kind!(AsyncUnwantedError).unwrap();
    let guard = TryExcept::new(k).unwrap().silent(true);

    let err = guard
        .call_async(|| async move { other.raise::<()>("not claimed") })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), other);
}

#[tokio::test]
async fn async_retry_counts_attempts() {
    let k = kind!(AsyncRetryError).unwrap();
    let retry = Retry::new()
        .kinds(k)
        .unwrap()
        .count(3)
        .unwrap()
        .interval(Duration::from_millis(1));

    let runs = Arc::new(AtomicUsize::new(0));
    let runs_inner = Arc::clone(&runs);
    let err = retry
        .call_async(|| {
            let runs = Arc::clone(&runs_inner);
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
                k.raise::<()>("never up")
            }
        })
        .await
        .unwrap_err();

    assert_eq!(runs.load(Ordering::SeqCst), 3);
    assert_eq!(err.kind(), k);
    assert_eq!(err.message(), "never up");
}

#[tokio::test]
async fn async_retry_recovers_mid_budget() {
    let k = kind!(AsyncRecoveryError).unwrap();
    let retry = Retry::new().kinds(k).unwrap().count(4).unwrap();

    let runs = Arc::new(AtomicUsize::new(0));
    let runs_inner = Arc::clone(&runs);
    let value = retry
        .call_async(|| {
            let runs = Arc::clone(&runs_inner);
            async move {
                if runs.fetch_add(1, Ordering::SeqCst) < 2 {
                    k.raise("warming up")
                } else {
                    Ok("ready")
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(value, "ready");
    assert_eq!(runs.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn async_context_scopes_a_block() {
    let k = kind!(AsyncScopeError).unwrap();
    let scope = TryContext::new(k).unwrap().silent(true);

    let out = scope
        .run_async(|| async move {
            k.raise::<()>("inside the async block")?;
            Ok(())
        })
        .await
        .unwrap();
    assert_eq!(out, None);
}

#[tokio::test]
async fn composed_async_layers_report_once() {
    let k = kind!(AsyncComposedError).unwrap();
    let count = Arc::new(AtomicUsize::new(0));
    let sink_count = Arc::clone(&count);

    let retry = Retry::new().kinds(k).unwrap().count(2).unwrap();
    let guard = TryExcept::new(k).unwrap().sink(move |_: &str| {
        sink_count.fetch_add(1, Ordering::SeqCst);
    });

    let out = guard
        .call_async(|| async {
            retry
                .call_async(|| async move { k.raise::<()>("still failing") })
                .await
        })
        .await
        .unwrap();

    assert_eq!(out, None);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}
