use std::sync::Arc;

use super::common::*;
use crate::advice::{SuggestionAugmenter, FALLBACK_SUGGESTION};
use crate::scoring::domain::{InputError, MetricKey, MetricValue, RenderedTarget, Severity};
use crate::scoring::service::ScoringService;

#[tokio::test]
async fn optimal_readings_score_a_perfect_hundred() {
    let result = bare_service()
        .score(optimal_request())
        .await
        .expect("request scores");

    assert_eq!(result.shield_score, 100);
    assert_eq!(result.bio_age_delta, -0.5);
    assert!(result.alerts.is_empty());
    assert_eq!(result.breakdown.len(), 7);

    let sleep = &result.breakdown[&MetricKey::TotalSleepHours];
    assert_eq!(sleep.value, MetricValue::Quantity(7.5));
    assert_eq!(sleep.optimal, RenderedTarget::Band("7\u{2013}9".to_string()));
    assert_eq!(sleep.impact, 0.0);
    assert_eq!(sleep.label, "Total Sleep");

    let chronotype = &result.breakdown[&MetricKey::ChronotypeAlignment];
    assert_eq!(chronotype.value, MetricValue::Flag(true));
    assert_eq!(chronotype.optimal, RenderedTarget::Flag(true));
}

#[tokio::test]
async fn breakdown_follows_registry_order() {
    let result = bare_service()
        .score(optimal_request())
        .await
        .expect("request scores");

    let keys: Vec<MetricKey> = result.breakdown.keys().copied().collect();
    assert_eq!(keys, MetricKey::ordered());
}

#[tokio::test]
async fn low_hrv_raises_an_info_alert() {
    let mut request = optimal_request();
    request.hrv = 25.0;

    let result = bare_service().score(request).await.expect("request scores");

    assert_eq!(result.bio_age_delta, 0.13);
    assert_eq!(result.shield_score, 99);
    assert_eq!(result.alerts.len(), 1);
    assert_eq!(result.alerts[0].message, "Low HRV");
    assert_eq!(result.alerts[0].severity, Severity::Info);
    assert_eq!(result.alerts[0].suggestion, None);
    assert_eq!(result.breakdown[&MetricKey::Hrv].impact, 0.13);
}

#[tokio::test]
async fn chronotype_mismatch_raises_an_info_alert() {
    let mut request = optimal_request();
    request.chronotype_alignment = false;

    let result = bare_service().score(request).await.expect("request scores");

    assert_eq!(result.bio_age_delta, 0.1);
    assert_eq!(result.shield_score, 99);
    assert_eq!(result.alerts.len(), 1);
    assert_eq!(result.alerts[0].message, "Chronotype misalignment");
    assert_eq!(result.alerts[0].severity, Severity::Info);
}

#[tokio::test]
async fn excessive_latency_warns_and_is_capped() {
    let mut request = optimal_request();
    request.sleep_latency = 180.0;

    let result = bare_service().score(request).await.expect("request scores");

    assert_eq!(result.bio_age_delta, 0.2);
    assert_eq!(result.shield_score, 98);
    assert_eq!(result.alerts.len(), 1);
    assert_eq!(result.alerts[0].message, "High Sleep Latency");
    assert_eq!(result.alerts[0].severity, Severity::Warning);
    assert_eq!(result.breakdown[&MetricKey::SleepLatency].impact, 0.2);
}

#[tokio::test]
async fn alerts_follow_registry_order() {
    let mut request = optimal_request();
    request.sleep_latency = 30.0;
    request.hrv = 25.0;
    request.chronotype_alignment = false;

    let result = bare_service().score(request).await.expect("request scores");

    assert_eq!(result.bio_age_delta, 0.28);
    assert_eq!(result.shield_score, 97);

    let messages: Vec<&str> = result
        .alerts
        .iter()
        .map(|alert| alert.message.as_str())
        .collect();
    assert_eq!(
        messages,
        vec!["High Sleep Latency", "Low HRV", "Chronotype misalignment"]
    );
    assert_eq!(result.alerts[0].severity, Severity::Warning);
    assert_eq!(result.alerts[1].severity, Severity::Info);
}

#[tokio::test]
async fn suggestions_attach_to_their_alerts() {
    let (service, provider) = advised_service();
    let mut request = optimal_request();
    request.hrv = 25.0;
    request.chronotype_alignment = false;

    let result = service.score(request).await.expect("request scores");

    assert_eq!(result.alerts.len(), 2);
    assert_eq!(
        result.alerts[0].suggestion.as_deref(),
        Some("re: Alert: Low HRV")
    );
    assert_eq!(
        result.alerts[1].suggestion.as_deref(),
        Some("re: Alert: Chronotype misalignment")
    );

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("\"label\":\"HRV\""));
    assert!(prompts[0].ends_with("Give a short, actionable suggestion for the patient."));
}

#[tokio::test]
async fn provider_failures_fall_back_to_default_text() {
    let augmenter = SuggestionAugmenter::new(Arc::new(FailingProvider), test_limits());
    let service = ScoringService::new(engine(), Some(augmenter));
    let mut request = optimal_request();
    request.hrv = 25.0;

    let result = service.score(request).await.expect("request scores");

    assert_eq!(result.shield_score, 99);
    assert_eq!(
        result.alerts[0].suggestion.as_deref(),
        Some(FALLBACK_SUGGESTION)
    );
}

#[tokio::test]
async fn clean_results_skip_the_provider() {
    let (service, provider) = advised_service();

    let result = service
        .score(optimal_request())
        .await
        .expect("request scores");

    assert!(result.alerts.is_empty());
    assert!(provider.prompts().is_empty());
}

#[tokio::test]
async fn rejected_input_never_reaches_the_provider() {
    let (service, provider) = advised_service();
    let mut request = optimal_request();
    request.age = 150;

    let result = service.score(request).await;

    match result {
        Err(InputError::OutOfRange { field, range, .. }) => {
            assert_eq!(field, "age");
            assert_eq!(range, "[0, 120]");
        }
        other => panic!("expected out-of-range rejection, got {other:?}"),
    }
    assert!(provider.prompts().is_empty());
}

#[tokio::test]
async fn sleep_hours_bounds_are_exclusive() {
    for hours in [0.0, 24.0] {
        let mut request = optimal_request();
        request.total_sleep_hours = hours;

        let result = bare_service().score(request).await;

        match result {
            Err(InputError::OutOfRange { field, range, .. }) => {
                assert_eq!(field, "total_sleep_hours");
                assert_eq!(range, "(0, 24)");
            }
            other => panic!("expected out-of-range rejection, got {other:?}"),
        }
    }
}
