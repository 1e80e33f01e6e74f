use super::super::domain::{Deviation, InputError, MetricValue, Target};
use super::super::registry::MetricDefinition;
use super::{PenaltyResult, DEVIATION_CAP};

/// Scores one reading against its definition.
///
/// Quantity readings must fall inside the definition's valid range; the
/// whole evaluation aborts on the first violation.
pub(crate) fn evaluate_metric(
    definition: &MetricDefinition,
    value: MetricValue,
) -> Result<PenaltyResult, InputError> {
    if let (Some(range), MetricValue::Quantity(reading)) = (definition.valid_range, value) {
        if !range.contains(reading) {
            return Err(InputError::OutOfRange {
                field: definition.key.as_str(),
                value: reading,
                range: format!("[{}, {}]", range.min, range.max),
            });
        }
    }

    let (penalty, deviation) = match (definition.target, value) {
        (Target::Matches { expected, .. }, MetricValue::Flag(flag)) => {
            if flag == expected {
                (0.0, None)
            } else {
                (definition.weight, Some(Deviation::Mismatch))
            }
        }
        (Target::Matches { .. }, MetricValue::Quantity(_)) => {
            return Err(InputError::WrongKind {
                metric: definition.key.as_str(),
                expected: "boolean",
            });
        }
        (_, MetricValue::Flag(_)) => {
            return Err(InputError::WrongKind {
                metric: definition.key.as_str(),
                expected: "numeric",
            });
        }
        (Target::AtLeast(optimal), MetricValue::Quantity(reading)) => {
            shortfall(reading, optimal, definition.weight)
        }
        (Target::AtMost(optimal), MetricValue::Quantity(reading)) => {
            excess(reading, optimal, definition.weight)
        }
        (Target::Within { low, high }, MetricValue::Quantity(reading)) => {
            if reading < low {
                shortfall(reading, low, definition.weight)
            } else {
                excess(reading, high, definition.weight)
            }
        }
    };

    Ok(PenaltyResult {
        key: definition.key,
        value,
        penalty,
        deviation,
    })
}

fn shortfall(reading: f64, floor: f64, weight: f64) -> (f64, Option<Deviation>) {
    if reading < floor {
        let relative = ((floor - reading) / floor).min(DEVIATION_CAP);
        (relative * weight, Some(Deviation::BelowTarget))
    } else {
        (0.0, None)
    }
}

fn excess(reading: f64, ceiling: f64, weight: f64) -> (f64, Option<Deviation>) {
    if reading > ceiling {
        let relative = ((reading - ceiling) / ceiling).min(DEVIATION_CAP);
        (relative * weight, Some(Deviation::AboveTarget))
    } else {
        (0.0, None)
    }
}
