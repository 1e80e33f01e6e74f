use std::fmt;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Closed set of metrics the service scores. Declaration order is the
/// canonical registry order and drives alert and breakdown ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricKey {
    #[serde(rename = "total_sleep_hours")]
    TotalSleepHours,
    #[serde(rename = "sleep_efficiency")]
    SleepEfficiency,
    #[serde(rename = "REM_percentage")]
    RemPercentage,
    #[serde(rename = "sleep_latency")]
    SleepLatency,
    #[serde(rename = "hrv")]
    Hrv,
    #[serde(rename = "timing_consistency")]
    TimingConsistency,
    #[serde(rename = "chronotype_alignment")]
    ChronotypeAlignment,
}

impl MetricKey {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::TotalSleepHours,
            Self::SleepEfficiency,
            Self::RemPercentage,
            Self::SleepLatency,
            Self::Hrv,
            Self::TimingConsistency,
            Self::ChronotypeAlignment,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TotalSleepHours => "total_sleep_hours",
            Self::SleepEfficiency => "sleep_efficiency",
            Self::RemPercentage => "REM_percentage",
            Self::SleepLatency => "sleep_latency",
            Self::Hrv => "hrv",
            Self::TimingConsistency => "timing_consistency",
            Self::ChronotypeAlignment => "chronotype_alignment",
        }
    }
}

/// A measured reading: either a quantity or a yes/no flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Quantity(f64),
    Flag(bool),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Quantity(value) => write!(f, "{value}"),
            MetricValue::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

/// Where the optimum lies for a metric. The variant fixes both the
/// deviation direction that is penalized and the divisor used to size it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    /// Readings below `optimal` are penalized.
    AtLeast(f64),
    /// Readings above `optimal` are penalized.
    AtMost(f64),
    /// Readings outside the band are penalized against the nearer bound.
    Within { low: f64, high: f64 },
    /// Flag readings differing from `expected` take the full metric weight.
    Matches {
        expected: bool,
        mismatch_alert: &'static str,
    },
}

impl Target {
    pub fn rendered(&self) -> RenderedTarget {
        match *self {
            Target::AtLeast(optimal) | Target::AtMost(optimal) => RenderedTarget::Scalar(optimal),
            Target::Within { low, high } => RenderedTarget::Band(format!("{low}\u{2013}{high}")),
            Target::Matches { expected, .. } => RenderedTarget::Flag(expected),
        }
    }
}

/// Client-facing rendering of a target: bands collapse to `low–high`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RenderedTarget {
    Scalar(f64),
    Flag(bool),
    Band(String),
}

impl fmt::Display for RenderedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderedTarget::Scalar(value) => write!(f, "{value}"),
            RenderedTarget::Flag(flag) => write!(f, "{flag}"),
            RenderedTarget::Band(band) => write!(f, "{band}"),
        }
    }
}

/// Inclusive physiological bounds a quantity reading must fall inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// How a reading missed its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deviation {
    BelowTarget,
    AboveTarget,
    Mismatch,
}

impl Deviation {
    /// Severity follows the deviation kind: only above-target readings warn.
    pub const fn severity(self) -> Severity {
        match self {
            Deviation::AboveTarget => Severity::Warning,
            Deviation::BelowTarget | Deviation::Mismatch => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

/// Alert raised for a metric whose penalty is non-zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub message: String,
    pub severity: Severity,
    pub suggestion: Option<String>,
}

/// Per-metric line of the score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownEntry {
    pub value: MetricValue,
    pub optimal: RenderedTarget,
    pub impact: f64,
    pub label: &'static str,
    pub help: &'static str,
}

/// Scored outcome returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub shield_score: u8,
    pub bio_age_delta: f64,
    pub alerts: Vec<Alert>,
    pub breakdown: BTreeMap<MetricKey, BreakdownEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Other,
}

/// One night's measurement set as submitted by clients.
///
/// Demographics are validated but do not contribute to the score today.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreRequest {
    pub total_sleep_hours: f64,
    pub sleep_efficiency: f64,
    #[serde(rename = "REM_percentage")]
    pub rem_percentage: f64,
    pub age: u8,
    pub sex: Sex,
    pub sleep_latency: f64,
    pub hrv: f64,
    pub timing_consistency: f64,
    pub chronotype_alignment: bool,
}

impl ScoreRequest {
    /// Applies the request-level bounds and produces the engine input.
    pub fn validate(&self) -> Result<ScoreInput, InputError> {
        let total_sleep_hours = if self.total_sleep_hours.is_finite()
            && self.total_sleep_hours > 0.0
            && self.total_sleep_hours < 24.0
        {
            self.total_sleep_hours
        } else {
            return Err(InputError::OutOfRange {
                field: "total_sleep_hours",
                value: self.total_sleep_hours,
                range: "(0, 24)".to_string(),
            });
        };
        let sleep_efficiency =
            bounded("sleep_efficiency", self.sleep_efficiency, 0.0, 100.0, "[0, 100]")?;
        let rem_percentage =
            bounded("REM_percentage", self.rem_percentage, 0.0, 100.0, "[0, 100]")?;
        if self.age > 120 {
            return Err(InputError::OutOfRange {
                field: "age",
                value: f64::from(self.age),
                range: "[0, 120]".to_string(),
            });
        }
        let sleep_latency = bounded("sleep_latency", self.sleep_latency, 0.0, 180.0, "[0, 180]")?;
        let hrv = bounded("hrv", self.hrv, 0.0, 300.0, "[0, 300]")?;
        let timing_consistency =
            bounded("timing_consistency", self.timing_consistency, 0.0, 12.0, "[0, 12]")?;

        Ok(ScoreInput {
            total_sleep_hours,
            sleep_efficiency,
            rem_percentage,
            sleep_latency,
            hrv,
            timing_consistency,
            chronotype_alignment: self.chronotype_alignment,
        })
    }
}

fn bounded(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
    range: &'static str,
) -> Result<f64, InputError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(value)
    } else {
        Err(InputError::OutOfRange {
            field,
            value,
            range: range.to_string(),
        })
    }
}

/// Validated measurement set holding exactly one reading per metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInput {
    total_sleep_hours: f64,
    sleep_efficiency: f64,
    rem_percentage: f64,
    sleep_latency: f64,
    hrv: f64,
    timing_consistency: f64,
    chronotype_alignment: bool,
}

impl ScoreInput {
    pub fn value(&self, key: MetricKey) -> MetricValue {
        match key {
            MetricKey::TotalSleepHours => MetricValue::Quantity(self.total_sleep_hours),
            MetricKey::SleepEfficiency => MetricValue::Quantity(self.sleep_efficiency),
            MetricKey::RemPercentage => MetricValue::Quantity(self.rem_percentage),
            MetricKey::SleepLatency => MetricValue::Quantity(self.sleep_latency),
            MetricKey::Hrv => MetricValue::Quantity(self.hrv),
            MetricKey::TimingConsistency => MetricValue::Quantity(self.timing_consistency),
            MetricKey::ChronotypeAlignment => MetricValue::Flag(self.chronotype_alignment),
        }
    }
}

/// Rejection reasons for a measurement set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("{field} value {value} outside the valid range {range}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        range: String,
    },
    #[error("request body malformed: {detail}")]
    Malformed { detail: String },
    #[error("{metric} expects a {expected} reading")]
    WrongKind {
        metric: &'static str,
        expected: &'static str,
    },
}
