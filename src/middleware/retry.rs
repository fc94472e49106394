use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retry an async call with bounded exponential backoff.
///
/// The call is attempted up to `max_attempts` times. After a failed attempt
/// with attempts remaining, sleeps `2^attempt_index` seconds (1s, 2s, ...),
/// no jitter. The error from the final attempt is propagated as-is rather
/// than a synthetic exhaustion error.
pub async fn with_retry<T, E, F, Fut>(max_attempts: u32, mut call: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt: u32 = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt + 1 < max_attempts => {
                let delay = Duration::from_secs(1u64 << attempt);
                debug!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt + 1,
                    max_attempts,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn returns_immediately_on_success() {
        let result: Result<&str, &str> = with_retry(3, || async { Ok("ok") }).await;
        assert_eq!(result, Ok("ok"));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt_after_two_backoffs() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result: Result<u32, &str> = with_retry(3, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err("transient")
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two backoff sleeps: 1s then 2s, auto-advanced by the paused clock.
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn propagates_error_from_final_attempt() {
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = with_retry(3, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Err(format!("failure {}", n)) }
        })
        .await;

        assert_eq!(result.unwrap_err(), "failure 3");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn single_attempt_does_not_sleep() {
        let calls = AtomicU32::new(0);

        let result: Result<(), &str> = with_retry(1, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("fatal") }
        })
        .await;

        assert_eq!(result, Err("fatal"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
