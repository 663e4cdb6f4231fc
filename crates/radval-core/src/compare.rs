//! Field-by-field comparison of extracted values against ground truth.

use std::fmt;

use serde::Serialize;

use crate::error::{RadvalError, Result};
use crate::models::config::DEFAULT_SIZE_TOLERANCE_MM;
use crate::models::ground_truth::{GroundTruthSize, StructuredGroundTruth};
use crate::models::record::ExtractionRecord;

/// Rendering of an absent ground-truth value in mismatch strings.
const ABSENT: &str = "null";

/// Compared fields, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Laterality,
    Quadrant,
    Finding,
    Microcalcifications,
    SizeMm,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Laterality,
        Field::Quadrant,
        Field::Finding,
        Field::Microcalcifications,
        Field::SizeMm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Laterality => "laterality",
            Self::Quadrant => "quadrant",
            Self::Finding => "finding",
            Self::Microcalcifications => "microcalcifications",
            Self::SizeMm => "size_mm",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One disagreeing field, with both values rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub field: Field,
    pub ground_truth: String,
    pub extracted: String,
}

impl Mismatch {
    fn new(field: Field, ground_truth: Option<String>, extracted: String) -> Self {
        Self {
            field,
            ground_truth: ground_truth.unwrap_or_else(|| ABSENT.to_string()),
            extracted,
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} vs {}", self.field, self.ground_truth, self.extracted)
    }
}

/// Comparison outcome for one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MismatchReport {
    /// Extracted values, passed through for auditing.
    pub extracted: ExtractionRecord,
    /// Disagreeing fields in [`Field::ALL`] order.
    pub mismatches: Vec<Mismatch>,
    /// Original report text.
    pub report_text: String,
}

impl MismatchReport {
    pub fn mismatch_count(&self) -> usize {
        self.mismatches.len()
    }

    pub fn has_mismatches(&self) -> bool {
        !self.mismatches.is_empty()
    }

    /// All mismatches as one `"; "`-separated string.
    pub fn joined(&self) -> String {
        self.mismatches
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Tolerance-aware comparator.
///
/// Only present extracted values are compared; an absent extraction is never
/// a mismatch, whatever the ground truth says.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparator {
    size_tolerance_mm: f64,
}

impl Default for Comparator {
    fn default() -> Self {
        Self {
            size_tolerance_mm: DEFAULT_SIZE_TOLERANCE_MM,
        }
    }
}

impl Comparator {
    /// Comparator allowing `size_tolerance_mm` of absolute size difference.
    pub fn new(size_tolerance_mm: f64) -> Result<Self> {
        if !size_tolerance_mm.is_finite() || size_tolerance_mm < 0.0 {
            return Err(RadvalError::Config(format!(
                "size tolerance must be a non-negative number of millimetres, got {size_tolerance_mm}"
            )));
        }
        Ok(Self { size_tolerance_mm })
    }

    pub fn size_tolerance_mm(&self) -> f64 {
        self.size_tolerance_mm
    }

    /// Compare one extraction against its ground truth. Never fails.
    pub fn compare(&self, truth: &StructuredGroundTruth, extracted: &ExtractionRecord) -> MismatchReport {
        let mut mismatches = Vec::new();

        if let Some(value) = extracted.laterality {
            compare_category(&mut mismatches, Field::Laterality, truth.laterality.as_deref(), value.as_str());
        }
        if let Some(value) = extracted.quadrant {
            compare_category(&mut mismatches, Field::Quadrant, truth.quadrant.as_deref(), value.as_str());
        }
        if let Some(value) = extracted.finding {
            compare_category(&mut mismatches, Field::Finding, truth.finding.as_deref(), value.as_str());
        }

        if let Some(value) = extracted.microcalcifications {
            if truth.microcalcifications != Some(value) {
                mismatches.push(Mismatch::new(
                    Field::Microcalcifications,
                    truth.microcalcifications.map(|v| v.to_string()),
                    value.to_string(),
                ));
            }
        }

        if let Some(value) = extracted.size_mm {
            if !self.size_matches(truth.size_mm.as_ref(), value) {
                mismatches.push(Mismatch::new(
                    Field::SizeMm,
                    truth.size_mm.as_ref().map(ToString::to_string),
                    format!("{value:?}"),
                ));
            }
        }

        MismatchReport {
            extracted: extracted.clone(),
            mismatches,
            report_text: truth.report_text.clone(),
        }
    }

    /// A stated measurement cannot be confirmed against a missing or unreadable
    /// one; two numbers match when they differ by at most the tolerance.
    fn size_matches(&self, truth: Option<&GroundTruthSize>, extracted: f64) -> bool {
        match truth {
            Some(GroundTruthSize::Measured(expected)) if expected.is_finite() && extracted.is_finite() => {
                (expected - extracted).abs() <= self.size_tolerance_mm
            }
            _ => false,
        }
    }
}

fn compare_category(mismatches: &mut Vec<Mismatch>, field: Field, truth: Option<&str>, extracted: &str) {
    if truth != Some(extracted) {
        mismatches.push(Mismatch::new(field, truth.map(str::to_string), extracted.to_string()));
    }
}
