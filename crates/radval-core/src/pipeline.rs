//! Row-by-row validation: extract, compare, and collect output rows.
//!
//! Extraction failures stay local to their row. The only error that stops a
//! run is an [`ExtractionError::Configuration`], since every later row would
//! fail the same way.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::compare::{Comparator, MismatchReport};
use crate::error::ExtractionError;
use crate::extract::ReportExtractor;
use crate::models::ground_truth::StructuredGroundTruth;
use crate::models::record::{Finding, Laterality, Quadrant};

/// One exported result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    pub patient_id: String,
    pub extracted_laterality: Option<Laterality>,
    pub extracted_quadrant: Option<Quadrant>,
    pub extracted_finding: Option<Finding>,
    pub extracted_microcalcifications: Option<bool>,
    pub extracted_size_mm: Option<f64>,
    pub mismatch_count: usize,
    pub mismatches: String,
    pub report_text: String,
    /// Extraction error for this row; empty on success.
    pub error: Option<String>,
}

impl OutputRow {
    pub fn from_report(patient_id: &str, report: &MismatchReport) -> Self {
        Self {
            patient_id: patient_id.to_string(),
            extracted_laterality: report.extracted.laterality,
            extracted_quadrant: report.extracted.quadrant,
            extracted_finding: report.extracted.finding,
            extracted_microcalcifications: report.extracted.microcalcifications,
            extracted_size_mm: report.extracted.size_mm,
            mismatch_count: report.mismatch_count(),
            mismatches: report.joined(),
            report_text: report.report_text.clone(),
            error: None,
        }
    }

    /// Placeholder row for a report whose extraction failed.
    pub fn failed(truth: &StructuredGroundTruth, error: &ExtractionError) -> Self {
        Self {
            patient_id: truth.patient_id.clone(),
            extracted_laterality: None,
            extracted_quadrant: None,
            extracted_finding: None,
            extracted_microcalcifications: None,
            extracted_size_mm: None,
            mismatch_count: 0,
            mismatches: String::new(),
            report_text: truth.report_text.clone(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Counts over a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rows: usize,
    pub rows_with_mismatches: usize,
    pub failed_rows: usize,
    pub total_mismatches: usize,
}

impl RunSummary {
    fn record(&mut self, row: &OutputRow) {
        self.rows += 1;
        self.total_mismatches += row.mismatch_count;
        if row.is_failed() {
            self.failed_rows += 1;
        } else if row.mismatch_count > 0 {
            self.rows_with_mismatches += 1;
        }
    }

    /// True when every row was extracted and agreed with its ground truth.
    pub fn is_clean(&self) -> bool {
        self.failed_rows == 0 && self.rows_with_mismatches == 0
    }
}

/// Output of [`Pipeline::validate_rows`].
#[derive(Debug, Clone, Default)]
pub struct ValidationRun {
    pub rows: Vec<OutputRow>,
    pub summary: RunSummary,
    pub processing_time_ms: u64,
}

/// Runs an extractor and a comparator over input rows.
pub struct Pipeline<'a> {
    extractor: &'a dyn ReportExtractor,
    comparator: Comparator,
}

impl<'a> Pipeline<'a> {
    pub fn new(extractor: &'a dyn ReportExtractor, comparator: Comparator) -> Self {
        Self {
            extractor,
            comparator,
        }
    }

    /// Validate one row.
    ///
    /// Row-local extraction failures become a failed [`OutputRow`]; only a
    /// configuration error is returned.
    pub fn validate_row(&self, truth: &StructuredGroundTruth) -> Result<OutputRow, ExtractionError> {
        match self.extractor.extract(&truth.report_text) {
            Ok(extracted) => {
                let report = self.comparator.compare(truth, &extracted);
                debug!(
                    patient_id = %truth.patient_id,
                    mismatches = report.mismatch_count(),
                    "Row validated"
                );
                Ok(OutputRow::from_report(&truth.patient_id, &report))
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(patient_id = %truth.patient_id, error = %e, "Extraction failed, continuing");
                Ok(OutputRow::failed(truth, &e))
            }
        }
    }

    /// Validate all rows in order, calling `on_row` after each one.
    pub fn validate_rows<F>(
        &self,
        rows: &[StructuredGroundTruth],
        mut on_row: F,
    ) -> Result<ValidationRun, ExtractionError>
    where
        F: FnMut(usize, &OutputRow),
    {
        let start = Instant::now();
        let mut run = ValidationRun {
            rows: Vec::with_capacity(rows.len()),
            ..Default::default()
        };

        for (index, truth) in rows.iter().enumerate() {
            let row = self.validate_row(truth)?;
            run.summary.record(&row);
            on_row(index, &row);
            run.rows.push(row);
        }

        run.processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            backend = self.extractor.name(),
            rows = run.summary.rows,
            with_mismatches = run.summary.rows_with_mismatches,
            failed = run.summary.failed_rows,
            "Validation finished in {}ms",
            run.processing_time_ms
        );

        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::extract::{LocalHeuristicExtractor, Result as ExtractResult};
    use crate::models::record::ExtractionRecord;
    use pretty_assertions::assert_eq;

    /// Fails on reports containing "FAIL", refuses to run on "CONFIG".
    struct FlakyExtractor;

    impl ReportExtractor for FlakyExtractor {
        fn name(&self) -> &str {
            "flaky"
        }

        fn extract(&self, report_text: &str) -> ExtractResult<ExtractionRecord> {
            if report_text.contains("CONFIG") {
                Err(ExtractionError::Configuration("client missing".into()))
            } else if report_text.contains("FAIL") {
                Err(RemoteError::Timeout("30s".into()).into())
            } else {
                Ok(LocalHeuristicExtractor::new().extract_record(report_text))
            }
        }
    }

    fn rows() -> Vec<StructuredGroundTruth> {
        vec![
            StructuredGroundTruth::new("P001", "Left breast mass, 12 mm.")
                .with_laterality("left")
                .with_finding("mass")
                .with_size_mm(12.0),
            StructuredGroundTruth::new("P002", "FAIL this one"),
            StructuredGroundTruth::new("P003", "Right breast mass, 20 mm.")
                .with_laterality("left")
                .with_finding("mass")
                .with_size_mm(12.0),
        ]
    }

    #[test]
    fn test_failed_rows_do_not_abort_the_run() {
        let extractor = FlakyExtractor;
        let pipeline = Pipeline::new(&extractor, Comparator::default());

        let mut seen = Vec::new();
        let run = pipeline
            .validate_rows(&rows(), |i, row| seen.push((i, row.patient_id.clone())))
            .unwrap();

        assert_eq!(run.rows.len(), 3);
        assert_eq!(
            seen,
            vec![(0, "P001".to_string()), (1, "P002".to_string()), (2, "P003".to_string())]
        );

        assert!(!run.rows[0].is_failed());
        assert_eq!(run.rows[0].mismatch_count, 0);

        let failed = &run.rows[1];
        assert!(failed.error.as_deref().unwrap().contains("timed out"));
        assert_eq!(failed.extracted_laterality, None);
        assert_eq!(failed.report_text, "FAIL this one");

        assert_eq!(run.rows[2].mismatches, "laterality: left vs right; size_mm: 12.0 vs 20.0");

        assert_eq!(
            run.summary,
            RunSummary {
                rows: 3,
                rows_with_mismatches: 1,
                failed_rows: 1,
                total_mismatches: 2,
            }
        );
        assert!(!run.summary.is_clean());
    }

    #[test]
    fn test_configuration_error_stops_the_run() {
        let extractor = FlakyExtractor;
        let pipeline = Pipeline::new(&extractor, Comparator::default());
        let mut rows = rows();
        rows.insert(1, StructuredGroundTruth::new("P000", "CONFIG"));

        let mut calls = 0;
        let err = pipeline.validate_rows(&rows, |_, _| calls += 1).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_output_row_passthrough() {
        let extractor = LocalHeuristicExtractor::new();
        let pipeline = Pipeline::new(&extractor, Comparator::default());
        let truth = StructuredGroundTruth::new("opaque/ID 7", "Left upper inner quadrant, no calcifications.")
            .with_laterality("left")
            .with_quadrant("upper inner")
            .with_microcalcifications(true);

        let row = pipeline.validate_row(&truth).unwrap();
        assert_eq!(row.patient_id, "opaque/ID 7");
        assert_eq!(row.extracted_quadrant, Some(Quadrant::UpperInner));
        assert_eq!(row.extracted_microcalcifications, Some(false));
        assert_eq!(row.mismatch_count, 1);
        assert_eq!(row.mismatches, "microcalcifications: true vs false");
        assert_eq!(row.report_text, truth.report_text);
        assert_eq!(row.error, None);
    }

    #[test]
    fn test_empty_input() {
        let extractor = LocalHeuristicExtractor::new();
        let run = Pipeline::new(&extractor, Comparator::default())
            .validate_rows(&[], |_, _| {})
            .unwrap();
        assert!(run.rows.is_empty());
        assert!(run.summary.is_clean());
    }
}
