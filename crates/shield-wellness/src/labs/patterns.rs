use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};

use super::domain::{BiomarkerReading, ReferenceStatus};

/// Where a marker's unit comes from: a capture group or the pattern itself.
enum UnitSource {
    Captured(usize),
    Literal(&'static str),
}

struct MarkerPattern {
    name: &'static str,
    regex: Regex,
    unit: UnitSource,
    /// Capture groups holding the printed reference interval, when any.
    reference: Option<(usize, usize)>,
}

/// Compiled biomarker patterns for the lab panels we recognize.
pub(crate) struct BiomarkerPatterns {
    markers: Vec<MarkerPattern>,
    statuses: Vec<(ReferenceStatus, Regex)>,
}

impl BiomarkerPatterns {
    pub(crate) fn standard() -> Result<Self, regex::Error> {
        let markers = vec![
            marker(
                "Hemoglobin",
                r"HAEMOGLOBIN\s+([\d.]+)\s*(g/dL)\s+([\d.-]+)-(\d+)",
                UnitSource::Captured(2),
                Some((3, 4)),
            )?,
            marker(
                "PCV",
                r"PCV\s+([\d.]+)\s*(%)\s+([\d.-]+)-(\d+)",
                UnitSource::Captured(2),
                Some((3, 4)),
            )?,
            marker(
                "TSH",
                r"TSH.*?([\d.]+)\s*µIU/mL\s*([\d.]+)-([\d.]+)",
                UnitSource::Literal("µIU/mL"),
                Some((2, 3)),
            )?,
            marker(
                "Glucose, Fasting",
                r"Glucose, Fasting\*?\s*([\d.]+)\s*mg/dL",
                UnitSource::Literal("mg/dL"),
                None,
            )?,
            marker(
                "Platelet Count",
                r"PLATELET COUNT\s+([\d,]+)\s*cells/cu.mm\s+([\d,]+)-([\d,]+)",
                UnitSource::Literal("cells/cu.mm"),
                Some((2, 3)),
            )?,
            marker(
                "WBC",
                r"TOTAL LEUCOCYTE COUNT.*?([\d,]+)\s*cells/cu.mm\s+([\d,]+)-([\d,]+)",
                UnitSource::Literal("cells/cu.mm"),
                Some((2, 3)),
            )?,
            marker(
                "MCV",
                r"MCV\s+([\d.]+)\s*fL\s+([\d.]+)-([\d.]+)",
                UnitSource::Literal("fL"),
                Some((2, 3)),
            )?,
            marker(
                "MCH",
                r"MCH\s+([\d.]+)\s*pg\s+([\d.]+)-([\d.]+)",
                UnitSource::Literal("pg"),
                Some((2, 3)),
            )?,
            marker(
                "MCHC",
                r"MCHC\s+([\d.]+)\s*g/dL\s+([\d.]+)-([\d.]+)",
                UnitSource::Literal("g/dL"),
                Some((2, 3)),
            )?,
        ];

        let mut statuses = Vec::new();
        for status in [
            ReferenceStatus::InRange,
            ReferenceStatus::Borderline,
            ReferenceStatus::OutOfRange,
        ] {
            statuses.push((status, status_regex(status.label())?));
        }

        Ok(Self { markers, statuses })
    }

    /// Scans report text for known biomarkers, then annotates matched
    /// markers with the range status printed beneath their value line.
    pub(crate) fn scan(&self, text: &str) -> BTreeMap<String, BiomarkerReading> {
        let mut readings = BTreeMap::new();

        for marker in &self.markers {
            if let Some(captures) = marker.regex.captures(text) {
                let value = capture(&captures, 1);
                let unit = match marker.unit {
                    UnitSource::Captured(group) => capture(&captures, group),
                    UnitSource::Literal(unit) => unit.to_string(),
                };
                let (reference_low, reference_high) = match marker.reference {
                    Some((low, high)) => {
                        (Some(capture(&captures, low)), Some(capture(&captures, high)))
                    }
                    None => (None, None),
                };
                readings.insert(
                    marker.name.to_string(),
                    BiomarkerReading {
                        value,
                        unit,
                        reference_low,
                        reference_high,
                        status: None,
                    },
                );
            }
        }

        for (status, regex) in &self.statuses {
            for captures in regex.captures_iter(text) {
                let printed = capture(&captures, 1);
                if let Some(name) = canonical_marker(&printed) {
                    if let Some(reading) = readings.get_mut(name) {
                        reading.status = Some(*status);
                    }
                }
            }
        }

        readings
    }
}

fn marker(
    name: &'static str,
    pattern: &str,
    unit: UnitSource,
    reference: Option<(usize, usize)>,
) -> Result<MarkerPattern, regex::Error> {
    let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
    Ok(MarkerPattern {
        name,
        regex,
        unit,
        reference,
    })
}

fn status_regex(status: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"([A-Z ()*]+)\n[\d.]+.*?\n{status}"))
}

fn capture(captures: &regex::Captures<'_>, group: usize) -> String {
    captures
        .get(group)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Maps the marker heading printed on a report to our canonical name.
/// Headings may carry a trailing abbreviation such as "(TLC)".
fn canonical_marker(printed: &str) -> Option<&'static str> {
    let cleaned = match printed.split_once('(') {
        Some((head, _)) => head,
        None => printed,
    };
    let cleaned = cleaned.trim().trim_matches('*').trim();
    match cleaned.to_ascii_uppercase().as_str() {
        "HAEMOGLOBIN" | "HEMOGLOBIN" => Some("Hemoglobin"),
        "PCV" => Some("PCV"),
        "TSH" => Some("TSH"),
        "PLATELET COUNT" => Some("Platelet Count"),
        "TOTAL LEUCOCYTE COUNT" | "WBC" => Some("WBC"),
        "MCV" => Some("MCV"),
        "MCH" => Some("MCH"),
        "MCHC" => Some("MCHC"),
        _ => None,
    }
}
