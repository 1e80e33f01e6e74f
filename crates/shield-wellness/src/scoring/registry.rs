use std::collections::BTreeSet;

use super::domain::{Deviation, MetricKey, Target, ValueRange};

/// Scoring contract for one metric: weight, target, and input bounds.
#[derive(Debug, Clone)]
pub struct MetricDefinition {
    pub key: MetricKey,
    pub label: &'static str,
    pub help: &'static str,
    pub weight: f64,
    pub target: Target,
    /// Physiological input bounds. Flag metrics carry no numeric range.
    pub valid_range: Option<ValueRange>,
}

impl MetricDefinition {
    pub fn alert_message(&self, deviation: Deviation) -> String {
        match deviation {
            Deviation::BelowTarget => format!("Low {}", self.label),
            Deviation::AboveTarget => format!("High {}", self.label),
            Deviation::Mismatch => match self.target {
                Target::Matches { mismatch_alert, .. } => mismatch_alert.to_string(),
                _ => format!("{} mismatch", self.label),
            },
        }
    }

    fn validate(&self) -> Result<(), RegistryError> {
        let metric = self.key.as_str();

        if !self.weight.is_finite() || self.weight <= 0.0 || self.weight > 1.0 {
            return Err(RegistryError::InvalidWeight {
                metric,
                weight: self.weight,
            });
        }

        match self.target {
            Target::AtLeast(optimal) | Target::AtMost(optimal) => {
                if !optimal.is_finite() || optimal <= 0.0 {
                    return Err(RegistryError::NonPositiveTarget { metric });
                }
            }
            Target::Within { low, high } => {
                if !low.is_finite() || !high.is_finite() || low <= 0.0 {
                    return Err(RegistryError::NonPositiveTarget { metric });
                }
                if low >= high {
                    return Err(RegistryError::UnorderedBand { metric });
                }
            }
            Target::Matches { .. } => {}
        }

        match (&self.target, self.valid_range) {
            (Target::Matches { .. }, Some(_)) => Err(RegistryError::UnexpectedRange { metric }),
            (Target::Matches { .. }, None) => Ok(()),
            (_, None) => Err(RegistryError::MissingRange { metric }),
            (_, Some(range)) => {
                if range.min.is_finite() && range.max.is_finite() && range.min < range.max {
                    Ok(())
                } else {
                    Err(RegistryError::InvalidRange { metric })
                }
            }
        }
    }
}

/// Ordered table of metric definitions. Construction rejects tables the
/// penalty formulas cannot evaluate safely, so a running service never
/// divides by zero or double-counts a metric.
#[derive(Debug, Clone)]
pub struct MetricRegistry {
    definitions: Vec<MetricDefinition>,
}

impl MetricRegistry {
    pub fn new(definitions: Vec<MetricDefinition>) -> Result<Self, RegistryError> {
        let mut seen = BTreeSet::new();
        for definition in &definitions {
            definition.validate()?;
            if !seen.insert(definition.key) {
                return Err(RegistryError::DuplicateKey(definition.key.as_str()));
            }
        }
        Ok(Self { definitions })
    }

    /// The production metric table.
    pub fn standard() -> Result<Self, RegistryError> {
        Self::new(vec![
            MetricDefinition {
                key: MetricKey::TotalSleepHours,
                label: "Total Sleep",
                help: "Hours of actual sleep per night. Most adults do best on 7 to 9 hours.",
                weight: 0.20,
                target: Target::Within {
                    low: 7.0,
                    high: 9.0,
                },
                valid_range: Some(ValueRange {
                    min: 0.0,
                    max: 24.0,
                }),
            },
            MetricDefinition {
                key: MetricKey::SleepEfficiency,
                label: "Sleep Efficiency",
                help: "Percentage of time in bed spent asleep. 85% or more indicates consolidated sleep.",
                weight: 0.15,
                target: Target::AtLeast(85.0),
                valid_range: Some(ValueRange {
                    min: 0.0,
                    max: 100.0,
                }),
            },
            MetricDefinition {
                key: MetricKey::RemPercentage,
                label: "REM Sleep",
                help: "Share of sleep spent in REM. 18 to 25% supports memory and emotional recovery.",
                weight: 0.10,
                target: Target::Within {
                    low: 18.0,
                    high: 25.0,
                },
                valid_range: Some(ValueRange {
                    min: 0.0,
                    max: 100.0,
                }),
            },
            MetricDefinition {
                key: MetricKey::SleepLatency,
                label: "Sleep Latency",
                help: "Minutes taken to fall asleep. Under 20 minutes is typical for healthy sleepers.",
                weight: 0.10,
                target: Target::AtMost(20.0),
                valid_range: Some(ValueRange {
                    min: 0.0,
                    max: 180.0,
                }),
            },
            MetricDefinition {
                key: MetricKey::Hrv,
                label: "HRV",
                help: "Heart rate variability in milliseconds. Higher values reflect stronger recovery capacity.",
                weight: 0.25,
                target: Target::AtLeast(50.0),
                valid_range: Some(ValueRange {
                    min: 0.0,
                    max: 300.0,
                }),
            },
            MetricDefinition {
                key: MetricKey::TimingConsistency,
                label: "Timing Consistency",
                help: "Night-to-night drift in bedtime, in hours. Under one hour keeps the circadian rhythm stable.",
                weight: 0.10,
                target: Target::AtMost(1.0),
                valid_range: Some(ValueRange {
                    min: 0.0,
                    max: 12.0,
                }),
            },
            MetricDefinition {
                key: MetricKey::ChronotypeAlignment,
                label: "Chronotype Alignment",
                help: "Whether the sleep window matches the body's preferred chronotype.",
                weight: 0.10,
                target: Target::Matches {
                    expected: true,
                    mismatch_alert: "Chronotype misalignment",
                },
                valid_range: None,
            },
        ])
    }

    pub fn definitions(&self) -> &[MetricDefinition] {
        &self.definitions
    }

    pub fn definition(&self, key: MetricKey) -> Option<&MetricDefinition> {
        self.definitions
            .iter()
            .find(|definition| definition.key == key)
    }
}

/// Startup rejection reasons for a metric table.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate metric definition for {0}")]
    DuplicateKey(&'static str),
    #[error("{metric} weight {weight} outside (0, 1]")]
    InvalidWeight { metric: &'static str, weight: f64 },
    #[error("{metric} target must be a positive finite number")]
    NonPositiveTarget { metric: &'static str },
    #[error("{metric} band must order low below high")]
    UnorderedBand { metric: &'static str },
    #[error("{metric} valid range is empty or non-finite")]
    InvalidRange { metric: &'static str },
    #[error("{metric} requires a numeric input range")]
    MissingRange { metric: &'static str },
    #[error("{metric} is a flag metric and carries no numeric range")]
    UnexpectedRange { metric: &'static str },
}
