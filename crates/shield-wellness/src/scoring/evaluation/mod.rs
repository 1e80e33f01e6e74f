mod aggregate;
mod penalty;

pub(crate) use aggregate::{aggregate, round2};
pub(crate) use penalty::evaluate_metric;

use super::domain::{Deviation, MetricKey, MetricValue};

/// Relative deviations larger than this count as total misses, so a single
/// wild reading cannot dominate the composite.
pub(crate) const DEVIATION_CAP: f64 = 2.0;

/// Penalty evaluated for one metric, before rounding.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PenaltyResult {
    pub(crate) key: MetricKey,
    pub(crate) value: MetricValue,
    pub(crate) penalty: f64,
    pub(crate) deviation: Option<Deviation>,
}
