//! Rule-based field extraction from radiology report text.
//!
//! Each field is decided by a short list of first-match rules applied to the
//! normalized text. Rules are checked in a fixed order and the first hit wins;
//! there is no scoring.

pub mod patterns;

use tracing::trace;

use crate::models::record::{ExtractionRecord, Finding, Laterality, Quadrant};

use super::{ReportExtractor, Result};
use patterns::*;

/// Local heuristic extractor. Stateless and infallible.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalHeuristicExtractor;

impl LocalHeuristicExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every field from raw report text.
    pub fn extract_record(&self, report_text: &str) -> ExtractionRecord {
        let text = normalize(report_text);

        let record = ExtractionRecord {
            laterality: extract_laterality(&text),
            quadrant: extract_quadrant(&text),
            finding: extract_finding(&text),
            microcalcifications: extract_microcalcifications(&text),
            size_mm: extract_size_mm(&text),
        };

        trace!(?record, "Local extraction finished");
        record
    }
}

impl ReportExtractor for LocalHeuristicExtractor {
    fn name(&self) -> &str {
        "local"
    }

    fn extract(&self, report_text: &str) -> Result<ExtractionRecord> {
        Ok(self.extract_record(report_text))
    }
}

/// Lowercase and unify token boundaries (`-` and `_` become spaces).
pub fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['-', '_'], " ")
}

/// "left" is checked before "right"; the first side found wins.
pub fn extract_laterality(text: &str) -> Option<Laterality> {
    let laterality = if LEFT.is_match(text) {
        Some(Laterality::Left)
    } else if RIGHT.is_match(text) {
        Some(Laterality::Right)
    } else {
        None
    };

    trace!(?laterality, "laterality");
    laterality
}

/// First quadrant phrase contained in the text, in [`Quadrant::ALL`] order.
pub fn extract_quadrant(text: &str) -> Option<Quadrant> {
    let quadrant = Quadrant::ALL.into_iter().find(|q| text.contains(q.as_str()));

    trace!(?quadrant, "quadrant");
    quadrant
}

/// First number immediately followed by "mm". Values too large to be finite
/// are dropped.
pub fn extract_size_mm(text: &str) -> Option<f64> {
    let size = SIZE_MM
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .filter(|v| v.is_finite());

    trace!(?size, "size_mm");
    size
}

/// Explicit negation wins, then any mention counts unless "benign" appears anywhere.
pub fn extract_microcalcifications(text: &str) -> Option<bool> {
    let value = if CALCIFICATION_NEGATION.is_match(text) {
        Some(false)
    } else if CALCIFICATION_MENTION.is_match(text) {
        Some(!text.contains(BENIGN))
    } else {
        None
    };

    trace!(?value, "microcalcifications");
    value
}

/// Negative wording is checked before mass-like words.
///
/// A "no suspicious" that qualifies calcifications belongs to the
/// calcification rule and does not make the whole report negative.
pub fn extract_finding(text: &str) -> Option<Finding> {
    let finding = if has_negative_finding(text) {
        Some(Finding::NoSuspiciousFinding)
    } else if MASS_WORDS.iter().any(|w| text.contains(w)) {
        Some(Finding::Mass)
    } else {
        None
    };

    trace!(?finding, "finding");
    finding
}

fn has_negative_finding(text: &str) -> bool {
    NO_SUSPICIOUS
        .captures_iter(text)
        .any(|caps| caps.get(1).is_none())
        || NEGATIVE_PHRASES.iter().any(|p| text.contains(p))
}
