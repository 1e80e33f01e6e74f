use clap::Args;
use shield_wellness::error::AppError;
use shield_wellness::scoring::{
    InputError, MetricRegistry, ScoreRequest, ScoringEngine, Severity, Sex,
};
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file holding the measurement set. Defaults to a built-in sample.
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
}

/// Scores one measurement set and prints the report. Suggestion enrichment
/// needs the HTTP service; the command line path evaluates offline.
pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs { input } = args;

    let request = match input {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            serde_json::from_str::<ScoreRequest>(&raw).map_err(|err| InputError::Malformed {
                detail: err.to_string(),
            })?
        }
        None => sample_request(),
    };

    let registry = MetricRegistry::standard()?;
    let engine = ScoringEngine::new(registry);
    let evaluation = engine.evaluate(&request.validate()?)?;

    println!("SHIELD wellness report");
    println!("SHIELD score: {}/100", evaluation.shield_score);
    println!(
        "Biological age delta: {:+.2} years",
        evaluation.bio_age_delta
    );

    if evaluation.triggered.is_empty() {
        println!("\nAlerts: none");
    } else {
        println!("\nAlerts");
        for alert in &evaluation.triggered {
            let severity = match alert.severity {
                Severity::Info => "info",
                Severity::Warning => "warning",
            };
            println!("- [{}] {}", severity, alert.message);
        }
    }

    println!("\nMetric breakdown");
    for entry in evaluation.breakdown.values() {
        println!(
            "- {}: {} (optimal {}) impact {:.2}",
            entry.label, entry.value, entry.optimal, entry.impact
        );
    }

    Ok(())
}

fn sample_request() -> ScoreRequest {
    ScoreRequest {
        total_sleep_hours: 6.2,
        sleep_efficiency: 88.0,
        rem_percentage: 16.0,
        age: 34,
        sex: Sex::Female,
        sleep_latency: 28.0,
        hrv: 44.0,
        timing_consistency: 1.4,
        chronotype_alignment: true,
    }
}
