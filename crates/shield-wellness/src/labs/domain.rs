use std::collections::BTreeMap;

use serde::Serialize;

/// Relation of a reading to the reference interval printed on the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReferenceStatus {
    #[serde(rename = "IN RANGE")]
    InRange,
    #[serde(rename = "BORDERLINE")]
    Borderline,
    #[serde(rename = "OUT OF RANGE")]
    OutOfRange,
}

impl ReferenceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReferenceStatus::InRange => "IN RANGE",
            ReferenceStatus::Borderline => "BORDERLINE",
            ReferenceStatus::OutOfRange => "OUT OF RANGE",
        }
    }
}

/// One biomarker captured from the report, values kept as printed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiomarkerReading {
    pub value: String,
    pub unit: String,
    pub reference_low: Option<String>,
    pub reference_high: Option<String>,
    pub status: Option<ReferenceStatus>,
}

/// Response document for an analyzed upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabReport {
    pub filename: String,
    pub biomarkers: BTreeMap<String, BiomarkerReading>,
    pub suggestions: Option<String>,
    pub message: String,
}
