use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::advice::{
    AdviceError, AdviceLimits, CompletionRequest, SuggestionAugmenter, SuggestionProvider,
};
use crate::scoring::domain::{MetricKey, ScoreRequest, Sex};
use crate::scoring::registry::{MetricDefinition, MetricRegistry};
use crate::scoring::service::{ScoringEngine, ScoringService};

pub(super) fn standard_registry() -> MetricRegistry {
    MetricRegistry::standard().expect("standard registry is valid")
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::new(standard_registry())
}

pub(super) fn definition(key: MetricKey) -> MetricDefinition {
    standard_registry()
        .definition(key)
        .expect("metric is registered")
        .clone()
}

/// Measurement set with every reading on target.
pub(super) fn optimal_request() -> ScoreRequest {
    ScoreRequest {
        total_sleep_hours: 7.5,
        sleep_efficiency: 90.0,
        rem_percentage: 22.0,
        age: 30,
        sex: Sex::Male,
        sleep_latency: 15.0,
        hrv: 50.0,
        timing_consistency: 0.5,
        chronotype_alignment: true,
    }
}

pub(super) fn test_limits() -> AdviceLimits {
    AdviceLimits {
        call_timeout: Duration::from_secs(1),
        batch_deadline: Duration::from_secs(5),
        max_concurrent: 4,
    }
}

/// Provider that logs prompts and answers with the prompt's first line,
/// so tests can tell which alert a suggestion was written for.
#[derive(Default)]
pub(super) struct StubProvider {
    prompts: Mutex<Vec<String>>,
}

impl StubProvider {
    pub(super) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log poisoned").clone()
    }
}

#[async_trait]
impl SuggestionProvider for StubProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AdviceError> {
        let first_line = request.prompt.lines().next().unwrap_or_default().to_string();
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(request.prompt);
        Ok(format!("re: {first_line}"))
    }
}

pub(super) struct FailingProvider;

#[async_trait]
impl SuggestionProvider for FailingProvider {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, AdviceError> {
        Err(AdviceError::Status(500))
    }
}

pub(super) fn advised_service() -> (Arc<ScoringService<StubProvider>>, Arc<StubProvider>) {
    let provider = Arc::new(StubProvider::default());
    let augmenter = SuggestionAugmenter::new(Arc::clone(&provider), test_limits());
    let service = ScoringService::new(engine(), Some(augmenter));
    (Arc::new(service), provider)
}

/// Service without an augmenter, as configured when no API key is set.
pub(super) fn bare_service() -> ScoringService<StubProvider> {
    ScoringService::new(engine(), None)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
