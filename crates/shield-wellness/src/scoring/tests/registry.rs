use super::common::*;
use crate::scoring::domain::{Deviation, MetricKey, Target, ValueRange};
use crate::scoring::registry::{MetricDefinition, MetricRegistry, RegistryError};

fn quantity_definition(weight: f64, target: Target, range: Option<ValueRange>) -> MetricDefinition {
    MetricDefinition {
        key: MetricKey::Hrv,
        label: "HRV",
        help: "",
        weight,
        target,
        valid_range: range,
    }
}

fn hrv_range() -> Option<ValueRange> {
    Some(ValueRange {
        min: 0.0,
        max: 300.0,
    })
}

#[test]
fn standard_table_is_complete_and_ordered() {
    let registry = standard_registry();
    let keys: Vec<MetricKey> = registry
        .definitions()
        .iter()
        .map(|definition| definition.key)
        .collect();

    assert_eq!(keys, MetricKey::ordered());

    let total_weight: f64 = registry
        .definitions()
        .iter()
        .map(|definition| definition.weight)
        .sum();
    assert!((total_weight - 1.0).abs() < 1e-9);
}

#[test]
fn rejects_duplicate_metrics() {
    let result = MetricRegistry::new(vec![
        quantity_definition(0.5, Target::AtLeast(50.0), hrv_range()),
        quantity_definition(0.5, Target::AtLeast(60.0), hrv_range()),
    ]);

    assert!(matches!(result, Err(RegistryError::DuplicateKey("hrv"))));
}

#[test]
fn rejects_weights_outside_the_unit_interval() {
    for weight in [0.0, -0.1, 1.5, f64::NAN] {
        let result = MetricRegistry::new(vec![quantity_definition(
            weight,
            Target::AtLeast(50.0),
            hrv_range(),
        )]);
        assert!(
            matches!(result, Err(RegistryError::InvalidWeight { .. })),
            "weight {weight} should be rejected"
        );
    }
}

#[test]
fn rejects_non_positive_targets() {
    let result = MetricRegistry::new(vec![quantity_definition(
        0.25,
        Target::AtLeast(0.0),
        hrv_range(),
    )]);

    assert!(matches!(
        result,
        Err(RegistryError::NonPositiveTarget { metric: "hrv" })
    ));
}

#[test]
fn rejects_unordered_bands() {
    let result = MetricRegistry::new(vec![quantity_definition(
        0.25,
        Target::Within {
            low: 9.0,
            high: 7.0,
        },
        hrv_range(),
    )]);

    assert!(matches!(
        result,
        Err(RegistryError::UnorderedBand { metric: "hrv" })
    ));
}

#[test]
fn quantity_metrics_require_a_valid_range() {
    let missing = MetricRegistry::new(vec![quantity_definition(
        0.25,
        Target::AtLeast(50.0),
        None,
    )]);
    assert!(matches!(
        missing,
        Err(RegistryError::MissingRange { metric: "hrv" })
    ));

    let empty = MetricRegistry::new(vec![quantity_definition(
        0.25,
        Target::AtLeast(50.0),
        Some(ValueRange {
            min: 300.0,
            max: 300.0,
        }),
    )]);
    assert!(matches!(
        empty,
        Err(RegistryError::InvalidRange { metric: "hrv" })
    ));
}

#[test]
fn flag_metrics_reject_numeric_ranges() {
    let result = MetricRegistry::new(vec![MetricDefinition {
        key: MetricKey::ChronotypeAlignment,
        label: "Chronotype Alignment",
        help: "",
        weight: 0.10,
        target: Target::Matches {
            expected: true,
            mismatch_alert: "Chronotype misalignment",
        },
        valid_range: hrv_range(),
    }]);

    assert!(matches!(
        result,
        Err(RegistryError::UnexpectedRange { .. })
    ));
}

#[test]
fn alert_messages_name_the_metric_label() {
    let hrv = definition(MetricKey::Hrv);
    assert_eq!(hrv.alert_message(Deviation::BelowTarget), "Low HRV");
    assert_eq!(hrv.alert_message(Deviation::AboveTarget), "High HRV");

    let chronotype = definition(MetricKey::ChronotypeAlignment);
    assert_eq!(
        chronotype.alert_message(Deviation::Mismatch),
        "Chronotype misalignment"
    );
}
