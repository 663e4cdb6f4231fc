//! Report field extraction.
//!
//! Two backends produce the same [`ExtractionRecord`]: the rule-based
//! [`LocalHeuristicExtractor`] and the hosted-model [`RemoteModelExtractor`].
//! Callers pick one at runtime and use it through [`ReportExtractor`].

pub mod remote;
pub mod rules;

pub use remote::{ModelRequest, ModelTransport, RemoteModelExtractor};
pub use rules::LocalHeuristicExtractor;

use crate::error::ExtractionError;
use crate::models::record::ExtractionRecord;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Produces structured fields from free-text reports.
pub trait ReportExtractor {
    /// Short backend name used in logs and summaries.
    fn name(&self) -> &str;

    /// Extract the schema fields from one report.
    fn extract(&self, report_text: &str) -> Result<ExtractionRecord>;
}

impl<E: ReportExtractor + ?Sized> ReportExtractor for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn extract(&self, report_text: &str) -> Result<ExtractionRecord> {
        (**self).extract(report_text)
    }
}
