use metrics_exporter_prometheus::PrometheusHandle;
use shield_wellness::advice::{AdviceLimits, CompletionClient, SuggestionAugmenter};
use shield_wellness::config::AppConfig;
use shield_wellness::error::AppError;
use shield_wellness::labs::{LabReportService, TextLayerExtractor};
use shield_wellness::scoring::{MetricRegistry, ScoringEngine, ScoringService};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) struct Services {
    pub(crate) scoring: Arc<ScoringService<CompletionClient>>,
    pub(crate) labs: Arc<LabReportService<TextLayerExtractor, CompletionClient>>,
}

/// Wires the scoring and lab pipelines from configuration. Both share one
/// completion client; without an API key they run with suggestions disabled.
pub(crate) fn build_services(config: &AppConfig) -> Result<Services, AppError> {
    let registry = MetricRegistry::standard()?;
    let engine = ScoringEngine::new(registry);

    let provider = CompletionClient::from_settings(&config.advice)?.map(Arc::new);
    if provider.is_none() {
        info!("no advice API key configured; responses will carry null suggestions");
    }
    let limits = AdviceLimits {
        call_timeout: config.advice.call_timeout(),
        batch_deadline: config.advice.batch_deadline(),
        max_concurrent: config.advice.max_concurrent,
    };

    let augmenter = provider
        .clone()
        .map(|client| SuggestionAugmenter::new(client, limits));
    let scoring = Arc::new(ScoringService::new(engine, augmenter));

    let extractor = Arc::new(TextLayerExtractor::new()?);
    let labs = Arc::new(LabReportService::new(extractor, provider, limits));

    Ok(Services { scoring, labs })
}
