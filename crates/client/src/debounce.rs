//! Keystroke debouncing for interactive search.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::data::FetchOutcome;

/// Default quiet period before a search is issued.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Runs only the latest of a burst of calls.
///
/// Each [`run`](Debouncer::run) cancels the call before it, so a superseded
/// call resolves to [`FetchOutcome::Canceled`] whether it is still waiting out
/// the quiet period or already fetching.
///
/// ```no_run
/// use drugbit_client::{CancelToken, DataClient, Debouncer, FetchOutcome, SearchOptions};
/// use drugbit_core::Drug;
///
/// // Called on every keystroke; only the last one within 300ms hits the API.
/// async fn on_input(client: &DataClient, debouncer: &Debouncer, text: &str) -> FetchOutcome<Vec<Drug>> {
///     debouncer
///         .run(|cancel: CancelToken| async move { client.search_drugs(text, SearchOptions::default(), &cancel).await })
///         .await
/// }
/// ```
#[derive(Debug)]
pub struct Debouncer {
    wait: Duration,
    current: Mutex<CancelToken>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self { wait, current: Mutex::new(CancelToken::new()) }
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    fn supersede(&self) -> CancelToken {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        current.cancel();
        *current = CancelToken::new();
        current.clone()
    }

    /// Wait out the quiet period, then run `operation` with a token that the
    /// next call to `run` or [`cancel`](Debouncer::cancel) will trigger.
    pub async fn run<T, F, Fut>(&self, operation: F) -> FetchOutcome<T>
    where
        F: FnOnce(CancelToken) -> Fut,
        Fut: Future<Output = FetchOutcome<T>>,
    {
        let token = self.supersede();

        tokio::select! {
            biased;
            _ = token.canceled() => return FetchOutcome::Canceled,
            _ = tokio::time::sleep(self.wait) => {}
        }

        operation(token).await
    }

    /// Cancel the pending call, if any.
    pub fn cancel(&self) {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_runs_after_quiet_period() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let started = tokio::time::Instant::now();

        let outcome = debouncer.run(|_| async { FetchOutcome::Data(1) }).await;

        assert_eq!(outcome, FetchOutcome::Data(1));
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_call_supersedes_older() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(300)));
        let calls = Arc::new(AtomicU32::new(0));

        let first = {
            let debouncer = Arc::clone(&debouncer);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                debouncer
                    .run(|_| async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        FetchOutcome::Data("pro")
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;

        let second = {
            let calls = Arc::clone(&calls);
            debouncer
                .run(|_| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    FetchOutcome::Data("propofol")
                })
                .await
        };

        assert!(first.await.unwrap().is_canceled());
        assert_eq!(second, FetchOutcome::Data("propofol"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_running_call_sees_cancellation() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(10)));

        let running = {
            let debouncer = Arc::clone(&debouncer);
            tokio::spawn(async move {
                debouncer
                    .run(|token| async move {
                        token.canceled().await;
                        FetchOutcome::<()>::Canceled
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        debouncer.cancel();

        assert!(running.await.unwrap().is_canceled());
    }
}
