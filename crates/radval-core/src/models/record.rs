//! Extraction schema shared by every report extractor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Side of the body a finding is reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Laterality {
    Left,
    Right,
}

/// Anatomical breast region used in reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    #[serde(rename = "upper outer")]
    UpperOuter,
    #[serde(rename = "upper inner")]
    UpperInner,
    #[serde(rename = "lower outer")]
    LowerOuter,
    #[serde(rename = "lower inner")]
    LowerInner,
    #[serde(rename = "retroareolar")]
    Retroareolar,
}

/// Coarse classification of the reported finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Finding {
    #[serde(rename = "mass")]
    Mass,
    #[serde(rename = "no suspicious finding")]
    NoSuspiciousFinding,
    #[serde(rename = "other")]
    Other,
}

impl Laterality {
    pub const ALL: [Laterality; 2] = [Laterality::Left, Laterality::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl Quadrant {
    /// All quadrants, in the priority order used when scanning free text.
    pub const ALL: [Quadrant; 5] = [
        Quadrant::UpperOuter,
        Quadrant::UpperInner,
        Quadrant::LowerOuter,
        Quadrant::LowerInner,
        Quadrant::Retroareolar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpperOuter => "upper outer",
            Self::UpperInner => "upper inner",
            Self::LowerOuter => "lower outer",
            Self::LowerInner => "lower inner",
            Self::Retroareolar => "retroareolar",
        }
    }
}

impl Finding {
    pub const ALL: [Finding; 3] = [Finding::Mass, Finding::NoSuspiciousFinding, Finding::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mass => "mass",
            Self::NoSuspiciousFinding => "no suspicious finding",
            Self::Other => "other",
        }
    }
}

/// A value that is not part of a field's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue {
    pub field: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} is not a valid {}", self.value, self.field)
    }
}

impl std::error::Error for UnknownValue {}

macro_rules! vocabulary_impls {
    ($ty:ty, $field:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| UnknownValue {
                        field: $field,
                        value: s.to_string(),
                    })
            }
        }
    };
}

vocabulary_impls!(Laterality, "laterality");
vocabulary_impls!(Quadrant, "quadrant");
vocabulary_impls!(Finding, "finding");

/// Normalized output of a report extractor.
///
/// Every field is optional: `None` means the extractor could not tell, and an
/// unknown field is never compared against ground truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub laterality: Option<Laterality>,
    pub quadrant: Option<Quadrant>,
    pub finding: Option<Finding>,
    pub microcalcifications: Option<bool>,
    pub size_mm: Option<f64>,
}

impl ExtractionRecord {
    /// True when no field was extracted.
    pub fn is_empty(&self) -> bool {
        self.laterality.is_none()
            && self.quadrant.is_none()
            && self.finding.is_none()
            && self.microcalcifications.is_none()
            && self.size_mm.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_vocabulary_round_trips_through_strings() {
        for q in Quadrant::ALL {
            assert_eq!(q.as_str().parse::<Quadrant>().unwrap(), q);
        }
        assert_eq!("no suspicious finding".parse::<Finding>().unwrap(), Finding::NoSuspiciousFinding);
    }

    #[test]
    fn test_vocabulary_is_case_sensitive() {
        let err = "Left".parse::<Laterality>().unwrap_err();
        assert_eq!(err.field, "laterality");
        assert_eq!(err.to_string(), "\"Left\" is not a valid laterality");
    }

    #[test]
    fn test_record_serializes_canonical_strings() {
        let record = ExtractionRecord {
            laterality: Some(Laterality::Right),
            quadrant: Some(Quadrant::UpperOuter),
            finding: Some(Finding::NoSuspiciousFinding),
            microcalcifications: None,
            size_mm: Some(14.0),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "laterality": "right",
                "quadrant": "upper outer",
                "finding": "no suspicious finding",
                "microcalcifications": null,
                "size_mm": 14.0
            })
        );
    }

    #[test]
    fn test_default_record_is_empty() {
        assert!(ExtractionRecord::default().is_empty());
        let record = ExtractionRecord {
            microcalcifications: Some(false),
            ..Default::default()
        };
        assert!(!record.is_empty());
    }
}
