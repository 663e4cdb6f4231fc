//! Structured ground truth and the normalization applied at the input boundary.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Reference size measurement as found in the structured data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroundTruthSize {
    /// A numeric measurement in millimetres.
    Measured(f64),
    /// A non-numeric cell, kept verbatim. Never matches an extracted size.
    Unparsed(String),
}

impl GroundTruthSize {
    /// Interpret a raw table cell. Empty and null-like cells are absent.
    pub fn from_cell(cell: &str) -> Option<Self> {
        let cell = cell.trim();
        if is_null_token(cell) {
            return None;
        }

        let numeric = cell
            .strip_suffix("mm")
            .map(str::trim_end)
            .unwrap_or(cell);

        match numeric.parse::<f64>() {
            Ok(value) => Some(Self::Measured(value)),
            Err(_) => Some(Self::Unparsed(cell.to_string())),
        }
    }
}

impl fmt::Display for GroundTruthSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Measured(v) => write!(f, "{v:?}"),
            Self::Unparsed(raw) => f.write_str(raw),
        }
    }
}

/// Reference values for one report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredGroundTruth {
    /// Opaque identifier, only used to join output rows back to input rows.
    pub patient_id: String,

    /// Free-text report the structured values describe.
    pub report_text: String,

    pub laterality: Option<String>,
    pub quadrant: Option<String>,
    pub finding: Option<String>,

    /// Logical value after normalization; see [`parse_flag`].
    pub microcalcifications: Option<bool>,

    pub size_mm: Option<GroundTruthSize>,
}

impl StructuredGroundTruth {
    pub fn new(patient_id: impl Into<String>, report_text: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            report_text: report_text.into(),
            ..Default::default()
        }
    }

    pub fn with_laterality(mut self, value: impl Into<String>) -> Self {
        self.laterality = Some(value.into());
        self
    }

    pub fn with_quadrant(mut self, value: impl Into<String>) -> Self {
        self.quadrant = Some(value.into());
        self
    }

    pub fn with_finding(mut self, value: impl Into<String>) -> Self {
        self.finding = Some(value.into());
        self
    }

    pub fn with_microcalcifications(mut self, value: bool) -> Self {
        self.microcalcifications = Some(value);
        self
    }

    pub fn with_size_mm(mut self, value: f64) -> Self {
        self.size_mm = Some(GroundTruthSize::Measured(value));
        self
    }
}

/// Normalize a categorical cell: trimmed, with null-like tokens mapped to `None`.
///
/// Case is preserved; categorical comparison is exact.
pub fn parse_category(cell: &str) -> Option<String> {
    let cell = cell.trim();
    if is_null_token(cell) {
        None
    } else {
        Some(cell.to_string())
    }
}

/// Normalize a truthy/falsy cell to its logical value.
///
/// Accepts booleans, yes/no, y/n, 1/0 and present/absent in any case.
/// Unrecognized tokens are logged and treated as absent.
pub fn parse_flag(cell: &str) -> Option<bool> {
    let token = cell.trim().to_ascii_lowercase();
    if is_null_token(&token) {
        return None;
    }

    match token.as_str() {
        "true" | "t" | "yes" | "y" | "1" | "1.0" | "present" => Some(true),
        "false" | "f" | "no" | "n" | "0" | "0.0" | "absent" => Some(false),
        _ => {
            warn!(value = %cell, "Unrecognized microcalcifications value, treating as absent");
            None
        }
    }
}

fn is_null_token(cell: &str) -> bool {
    cell.is_empty()
        || cell.eq_ignore_ascii_case("nan")
        || cell.eq_ignore_ascii_case("null")
        || cell.eq_ignore_ascii_case("none")
}
