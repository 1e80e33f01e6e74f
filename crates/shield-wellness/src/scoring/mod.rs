//! SHIELD score computation: the metric registry, penalty evaluation and
//! aggregation, and the alert pipeline that feeds suggestion enrichment.

pub mod domain;
pub(crate) mod evaluation;
pub mod registry;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Alert, BreakdownEntry, Deviation, InputError, MetricKey, MetricValue, RenderedTarget,
    ScoreInput, ScoreRequest, ScoreResult, Severity, Sex, Target, ValueRange,
};
pub use registry::{MetricDefinition, MetricRegistry, RegistryError};
pub use router::scoring_router;
pub use service::{Evaluation, ScoringEngine, ScoringService, TriggeredAlert};
