use super::PenaltyResult;

/// Measurement sets with no deviation at all earn a small rejuvenation
/// bonus instead of a flat zero.
const ZERO_DELTA_BONUS: f64 = -0.5;

/// Rounds to two decimals, half away from zero.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScoreTotals {
    pub(crate) bio_age_delta: f64,
    pub(crate) shield_score: u8,
}

/// Folds per-metric penalties into the biological-age delta and the
/// 0 to 100 composite score.
pub(crate) fn aggregate(penalties: &[PenaltyResult]) -> ScoreTotals {
    let raw: f64 = penalties.iter().map(|outcome| outcome.penalty).sum();
    let mut bio_age_delta = round2(raw);
    if bio_age_delta == 0.0 {
        bio_age_delta = ZERO_DELTA_BONUS;
    }

    let shield_score = (100.0 - 10.0 * bio_age_delta.max(0.0))
        .round()
        .clamp(0.0, 100.0) as u8;

    ScoreTotals {
        bio_age_delta,
        shield_score,
    }
}
