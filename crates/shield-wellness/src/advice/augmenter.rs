use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::warn;

use super::provider::{CompletionRequest, SuggestionProvider};

/// Neutral text attached when a suggestion cannot be produced in time.
pub const FALLBACK_SUGGESTION: &str =
    "No suggestion available right now. Please review this result with your clinician.";

/// Fan-out limits for a batch of suggestion calls.
#[derive(Debug, Clone, Copy)]
pub struct AdviceLimits {
    pub call_timeout: Duration,
    pub batch_deadline: Duration,
    pub max_concurrent: usize,
}

/// Runs one completion call per alert with bounded concurrency, an
/// independent timeout per call, and a deadline on the whole batch.
/// Failures never propagate; the affected alert gets the fallback text
/// and sibling calls keep running.
pub struct SuggestionAugmenter<P> {
    provider: Arc<P>,
    limits: AdviceLimits,
}

impl<P> SuggestionAugmenter<P>
where
    P: SuggestionProvider + 'static,
{
    pub fn new(provider: Arc<P>, limits: AdviceLimits) -> Self {
        Self { provider, limits }
    }

    /// Produces one suggestion per prompt, preserving input order.
    pub async fn suggest_all(&self, prompts: Vec<String>) -> Vec<String> {
        let deadline = Instant::now() + self.limits.batch_deadline;
        let semaphore = Arc::new(Semaphore::new(self.limits.max_concurrent));

        let mut handles = Vec::with_capacity(prompts.len());
        for prompt in prompts {
            let provider = Arc::clone(&self.provider);
            let semaphore = Arc::clone(&semaphore);
            let call_timeout = self.limits.call_timeout;
            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return None,
                };
                let request = CompletionRequest::suggestion(prompt);
                match timeout(call_timeout, provider.complete(request)).await {
                    Ok(Ok(suggestion)) => Some(suggestion),
                    Ok(Err(error)) => {
                        warn!(%error, "suggestion call failed; using fallback");
                        None
                    }
                    Err(_) => {
                        warn!(timeout = ?call_timeout, "suggestion call timed out; using fallback");
                        None
                    }
                }
            }));
        }

        let mut suggestions = Vec::with_capacity(handles.len());
        let mut deadline_hit = false;
        for mut handle in handles {
            let suggestion = match timeout_at(deadline, &mut handle).await {
                Ok(joined) => joined.ok().flatten(),
                Err(_) => {
                    handle.abort();
                    if !deadline_hit {
                        warn!("suggestion batch deadline reached; remaining alerts fall back");
                        deadline_hit = true;
                    }
                    None
                }
            };
            suggestions.push(suggestion.unwrap_or_else(|| FALLBACK_SUGGESTION.to_string()));
        }

        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::AdviceError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoProvider {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl EchoProvider {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SuggestionProvider for EchoProvider {
        async fn complete(&self, request: CompletionRequest) -> Result<String, AdviceError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(format!("echo: {}", request.prompt))
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl SuggestionProvider for FailingProvider {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, AdviceError> {
            Err(AdviceError::Status(500))
        }
    }

    fn limits(call_timeout_ms: u64, deadline_ms: u64, max_concurrent: usize) -> AdviceLimits {
        AdviceLimits {
            call_timeout: Duration::from_millis(call_timeout_ms),
            batch_deadline: Duration::from_millis(deadline_ms),
            max_concurrent,
        }
    }

    #[tokio::test]
    async fn preserves_prompt_order() {
        let provider = Arc::new(EchoProvider::new(Duration::from_millis(5)));
        let augmenter = SuggestionAugmenter::new(provider, limits(1_000, 5_000, 2));

        let prompts = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let suggestions = augmenter.suggest_all(prompts).await;

        assert_eq!(suggestions, vec!["echo: one", "echo: two", "echo: three"]);
    }

    #[tokio::test]
    async fn respects_concurrency_cap() {
        let provider = Arc::new(EchoProvider::new(Duration::from_millis(30)));
        let augmenter = SuggestionAugmenter::new(Arc::clone(&provider), limits(1_000, 5_000, 2));

        let prompts = (0..6).map(|n| format!("prompt {n}")).collect();
        let suggestions = augmenter.suggest_all(prompts).await;

        assert_eq!(suggestions.len(), 6);
        assert!(provider.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn failed_calls_fall_back_without_affecting_order() {
        let provider = Arc::new(FailingProvider);
        let augmenter = SuggestionAugmenter::new(provider, limits(1_000, 5_000, 4));

        let suggestions = augmenter
            .suggest_all(vec!["a".to_string(), "b".to_string()])
            .await;

        assert_eq!(suggestions, vec![FALLBACK_SUGGESTION, FALLBACK_SUGGESTION]);
    }

    #[tokio::test]
    async fn slow_calls_hit_the_per_call_timeout() {
        let provider = Arc::new(EchoProvider::new(Duration::from_millis(500)));
        let augmenter = SuggestionAugmenter::new(provider, limits(20, 5_000, 4));

        let suggestions = augmenter.suggest_all(vec!["slow".to_string()]).await;

        assert_eq!(suggestions, vec![FALLBACK_SUGGESTION]);
    }

    #[tokio::test]
    async fn batch_deadline_replaces_pending_suggestions() {
        let provider = Arc::new(EchoProvider::new(Duration::from_millis(500)));
        // Per-call timeout is generous; only the batch deadline can fire.
        let augmenter = SuggestionAugmenter::new(provider, limits(5_000, 50, 1));

        let suggestions = augmenter
            .suggest_all(vec!["first".to_string(), "second".to_string()])
            .await;

        assert_eq!(suggestions, vec![FALLBACK_SUGGESTION, FALLBACK_SUGGESTION]);
    }
}
