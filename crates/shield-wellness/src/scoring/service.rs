use std::collections::BTreeMap;

use tracing::debug;

use super::domain::{
    Alert, BreakdownEntry, InputError, MetricKey, ScoreInput, ScoreRequest, ScoreResult, Severity,
};
use super::evaluation;
use super::registry::MetricRegistry;
use crate::advice::{SuggestionAugmenter, SuggestionProvider};

/// Stateless evaluator applying the registry to validated measurement sets.
pub struct ScoringEngine {
    registry: MetricRegistry,
}

impl ScoringEngine {
    pub fn new(registry: MetricRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// Scores every registry metric in order. Aborts on the first reading
    /// the registry cannot accept.
    pub fn evaluate(&self, input: &ScoreInput) -> Result<Evaluation, InputError> {
        let definitions = self.registry.definitions();

        let mut penalties = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let value = input.value(definition.key);
            penalties.push(evaluation::evaluate_metric(definition, value)?);
        }
        let totals = evaluation::aggregate(&penalties);

        let mut breakdown = BTreeMap::new();
        let mut triggered = Vec::new();
        for (definition, outcome) in definitions.iter().zip(&penalties) {
            breakdown.insert(
                definition.key,
                BreakdownEntry {
                    value: outcome.value,
                    optimal: definition.target.rendered(),
                    impact: evaluation::round2(outcome.penalty),
                    label: definition.label,
                    help: definition.help,
                },
            );
            if let Some(deviation) = outcome.deviation {
                triggered.push(TriggeredAlert {
                    key: definition.key,
                    message: definition.alert_message(deviation),
                    severity: deviation.severity(),
                });
            }
        }

        Ok(Evaluation {
            shield_score: totals.shield_score,
            bio_age_delta: totals.bio_age_delta,
            triggered,
            breakdown,
        })
    }
}

/// Alert text awaiting suggestion enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggeredAlert {
    pub key: MetricKey,
    pub message: String,
    pub severity: Severity,
}

/// Engine output before suggestions are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub shield_score: u8,
    pub bio_age_delta: f64,
    pub triggered: Vec<TriggeredAlert>,
    pub breakdown: BTreeMap<MetricKey, BreakdownEntry>,
}

/// Orchestrates validation, evaluation, and suggestion enrichment.
///
/// Without an augmenter the service still scores; alerts then carry
/// `suggestion: null`.
pub struct ScoringService<P> {
    engine: ScoringEngine,
    augmenter: Option<SuggestionAugmenter<P>>,
}

impl<P> ScoringService<P>
where
    P: SuggestionProvider + 'static,
{
    pub fn new(engine: ScoringEngine, augmenter: Option<SuggestionAugmenter<P>>) -> Self {
        Self { engine, augmenter }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub async fn score(&self, request: ScoreRequest) -> Result<ScoreResult, InputError> {
        let input = request.validate()?;
        let Evaluation {
            shield_score,
            bio_age_delta,
            triggered,
            breakdown,
        } = self.engine.evaluate(&input)?;

        let alerts = match &self.augmenter {
            Some(augmenter) if !triggered.is_empty() => {
                let prompts = triggered
                    .iter()
                    .map(|alert| suggestion_prompt(alert, &breakdown))
                    .collect();
                let suggestions = augmenter.suggest_all(prompts).await;
                triggered
                    .into_iter()
                    .zip(suggestions)
                    .map(|(alert, suggestion)| Alert {
                        message: alert.message,
                        severity: alert.severity,
                        suggestion: Some(suggestion),
                    })
                    .collect()
            }
            _ => triggered
                .into_iter()
                .map(|alert| Alert {
                    message: alert.message,
                    severity: alert.severity,
                    suggestion: None,
                })
                .collect(),
        };

        debug!(
            score = shield_score,
            delta = bio_age_delta,
            alerts = alerts.len(),
            "measurement set scored"
        );

        Ok(ScoreResult {
            shield_score,
            bio_age_delta,
            alerts,
            breakdown,
        })
    }
}

fn suggestion_prompt(
    alert: &TriggeredAlert,
    breakdown: &BTreeMap<MetricKey, BreakdownEntry>,
) -> String {
    let details = breakdown
        .get(&alert.key)
        .and_then(|entry| serde_json::to_value(entry).ok())
        .map(|value| value.to_string())
        .unwrap_or_default();
    format!(
        "Alert: {}\nMetric details: {}\nGive a short, actionable suggestion for the patient.",
        alert.message, details
    )
}
